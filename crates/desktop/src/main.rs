mod app;
mod settings;
mod theme;
mod widgets;
mod workers;

use app::App;
use facecam_core::video::infrastructure::nokhwa_camera::request_camera_access;

fn main() -> iced::Result {
    env_logger::init();
    request_camera_access();

    iced::application(App::new, App::update, App::view)
        .title("Face Detection Demo")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(680.0, 660.0),
            ..Default::default()
        })
        .run()
}
