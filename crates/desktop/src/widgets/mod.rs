pub mod menu_bar;
pub mod video_panel;
