use iced::widget::{container, image};
use iced::{ContentFit, Element, Length};

use facecam_core::shared::frame::Frame;
use facecam_core::video::domain::display_sink::DisplaySink;

/// Panel size; frames are scaled into it keeping their aspect ratio.
const PANEL_WIDTH: f32 = 650.0;
const PANEL_HEIGHT: f32 = 500.0;

/// Image widget state fed by the live view.
pub struct VideoPanel {
    handle: image::Handle,
}

impl VideoPanel {
    pub fn new(initial: &Frame) -> Self {
        Self {
            handle: to_handle(initial),
        }
    }

    pub fn view<'a, Message: 'a>(&self) -> Element<'a, Message> {
        let picture = image(self.handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain);

        container(picture)
            .center_x(PANEL_WIDTH)
            .center_y(PANEL_HEIGHT)
            .padding(10)
            .into()
    }
}

impl DisplaySink for VideoPanel {
    fn show(&mut self, frame: &Frame) {
        self.handle = to_handle(frame);
    }
}

fn to_handle(frame: &Frame) -> image::Handle {
    image::Handle::from_rgba(frame.width(), frame.height(), frame.to_rgba())
}
