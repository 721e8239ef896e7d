pub mod fps_counter;
pub mod live_view_controller;
