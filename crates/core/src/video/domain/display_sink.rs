use crate::shared::frame::Frame;

/// Receives finished frames for presentation.
pub trait DisplaySink {
    fn show(&mut self, frame: &Frame);
}
