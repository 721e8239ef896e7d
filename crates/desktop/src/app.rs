use std::time::Instant;

use crossbeam_channel::Receiver;
use iced::widget::{button, column, container, text};
use iced::{Element, Length, Subscription, Task, Theme};

use facecam_core::annotation::infrastructure::overlay_annotator::OverlayAnnotator;
use facecam_core::pipeline::live_view_controller::{CycleOutcome, LiveViewController, RunState};
use facecam_core::video::infrastructure::nokhwa_camera::NokhwaCamera;

use crate::settings::Settings;
use crate::theme::{self, ThemeState};
use crate::widgets::menu_bar::{self, Menu, MenuItem};
use crate::widgets::video_panel::VideoPanel;
use crate::workers::model_loader::{self, ModelMessage};

#[derive(Debug, Clone)]
pub enum Message {
    Tick(Instant),
    ToggleRun,
    MenuToggled(Menu),
    MenuItemSelected(MenuItem),
    PollSystemTheme,
}

#[derive(Debug, Clone, PartialEq)]
enum ModelStatus {
    Loading { downloaded: u64, total: u64 },
    Ready,
    Failed(String),
}

pub struct App {
    theme: ThemeState,
    controller: LiveViewController,
    video_panel: VideoPanel,
    model_rx: Option<Receiver<ModelMessage>>,
    model_status: ModelStatus,
    camera_error: Option<String>,
    open_menu: Option<Menu>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let controller = LiveViewController::new(
            Box::new(NokhwaCamera::new(settings.camera_index)),
            Box::new(OverlayAnnotator::new(settings.fps_threshold)),
            settings.live_view_config(),
        );
        let video_panel = VideoPanel::new(&controller.placeholder());
        let model_rx = model_loader::spawn(settings.detector_config());

        (
            Self {
                theme: ThemeState::new(settings.appearance),
                controller,
                video_panel,
                model_rx: Some(model_rx),
                model_status: ModelStatus::Loading {
                    downloaded: 0,
                    total: 0,
                },
                camera_error: None,
                open_menu: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(now) => {
                self.poll_model();
                if self.controller.tick(now, &mut self.video_panel) == CycleOutcome::CameraLost {
                    self.camera_error = Some("camera stream was lost".to_string());
                    self.controller.idle_cycle(&mut self.video_panel);
                }
            }
            Message::PollSystemTheme => {
                if self.theme.poll() {
                    log::debug!("System appearance changed");
                }
            }
            Message::ToggleRun => {
                self.open_menu = None;
                match self.controller.toggle() {
                    Ok(RunState::Running) => self.camera_error = None,
                    Ok(RunState::Stopped) => {
                        self.controller.idle_cycle(&mut self.video_panel);
                    }
                    Err(e) => {
                        log::error!("Could not start live view: {e}");
                        self.camera_error = Some(e.to_string());
                    }
                }
            }
            Message::MenuToggled(menu) => {
                self.open_menu = if self.open_menu == Some(menu) {
                    None
                } else {
                    Some(menu)
                };
            }
            Message::MenuItemSelected(item) => {
                self.open_menu = None;
                if item == MenuItem::Exit {
                    self.controller.shutdown();
                    return iced::exit();
                }
            }
        }
        Task::none()
    }

    fn poll_model(&mut self) {
        let Some(rx) = self.model_rx.as_ref() else {
            return;
        };

        let mut finished = false;
        for message in rx.try_iter() {
            match message {
                ModelMessage::DownloadProgress(downloaded, total) => {
                    self.model_status = ModelStatus::Loading { downloaded, total };
                }
                ModelMessage::Ready(detector) => {
                    self.model_status = match self.controller.install_detector(detector) {
                        Ok(()) => {
                            log::info!("Face detector ready");
                            ModelStatus::Ready
                        }
                        Err(e) => ModelStatus::Failed(e.to_string()),
                    };
                    finished = true;
                }
                ModelMessage::Failed(e) => {
                    self.model_status = ModelStatus::Failed(e);
                    finished = true;
                }
            }
        }

        if finished {
            self.model_rx = None;
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let theme = self.theme.current();

        let label = text("Video Stream Preview")
            .size(14)
            .color(theme::muted_color(theme));

        let toggle_label = match self.controller.state() {
            RunState::Stopped => "START",
            RunState::Running => "STOP",
        };
        let toggle = button(text(toggle_label).size(14))
            .on_press_maybe(self.controller.has_detector().then_some(Message::ToggleRun))
            .padding([8, 32])
            .style(button::primary);

        let content = column![
            label,
            self.video_panel.view(),
            container(toggle).center_x(Length::Fill),
            self.status_line(theme),
        ]
        .spacing(8)
        .padding([8, 16]);

        column![menu_bar::view(self.open_menu), content]
            .height(Length::Fill)
            .into()
    }

    fn status_line(&self, theme: &Theme) -> Element<'_, Message> {
        if let Some(error) = &self.camera_error {
            return text(format!("Camera unavailable: {error}"))
                .size(12)
                .color(theme::error_color(theme))
                .into();
        }

        let (message, color) = match &self.model_status {
            ModelStatus::Loading { downloaded, total } if *total > 0 => (
                format!(
                    "Downloading face model... {:.0}%",
                    *downloaded as f64 / *total as f64 * 100.0
                ),
                theme::muted_color(theme),
            ),
            ModelStatus::Loading { .. } => {
                ("Loading face model...".to_string(), theme::muted_color(theme))
            }
            ModelStatus::Ready => (String::new(), theme::muted_color(theme)),
            ModelStatus::Failed(e) => {
                (format!("Face model unavailable: {e}"), theme::error_color(theme))
            }
        };
        text(message).size(12).color(color).into()
    }

    pub fn theme(&self) -> Theme {
        self.theme.current().clone()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let ticks = iced::time::every(self.controller.config().frame_delay).map(Message::Tick);
        match self.theme.poll_interval() {
            Some(interval) => Subscription::batch([
                ticks,
                iced::time::every(interval).map(|_| Message::PollSystemTheme),
            ]),
            None => ticks,
        }
    }
}
