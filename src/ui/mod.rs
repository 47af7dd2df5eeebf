use std::{
    sync::{Arc, atomic::AtomicBool},
    thread,
};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use gpui::{
    AnyElement, App, AppContext, Context, InteractiveElement, IntoElement, ObjectFit,
    ParentElement, Render, RenderImage, SharedString, Styled, StyledImage, TitlebarOptions,
    Window, WindowOptions, div, img, px,
};
use gpui::prelude::FluentBuilder;
use gpui_component::{
    ActiveTheme, Root, StyledExt,
    button::{Button, ButtonVariants},
    h_flex,
    tag::Tag,
    v_flex,
};
use image::{Frame as ImageFrame, ImageBuffer, Rgba};

use crate::{
    config::Config,
    model_download::DownloadEvent,
    overlay::SpriteSet,
    pipeline::{
        self, CameraDevice, CameraStream, DetectorBackend, start_detector, start_frame_compositor,
    },
    types::{CompositedFrame, DetectedFrame, Frame},
};

mod camera_view;
mod download;
mod main_view;
mod render_util;

pub fn launch_ui(
    app: &mut App,
    config: Config,
    sprites: SpriteSet,
    compat_warning: Option<String>,
    frame_tx: Sender<Frame>,
    frame_rx: Receiver<Frame>,
    detector_backend: DetectorBackend,
) -> gpui::Result<()> {
    let window_options = WindowOptions {
        titlebar: Some(TitlebarOptions {
            title: Some("Mukimuki Arms".into()),
            ..Default::default()
        }),
        ..Default::default()
    };

    app.open_window(window_options, move |window, app| {
        let view = app.new(|_| {
            AppView::new(
                config,
                sprites,
                compat_warning,
                frame_tx,
                frame_rx,
                detector_backend,
            )
        });
        app.new(|cx| Root::new(view, window, cx))
    })?;

    Ok(())
}

struct AppView {
    screen: Screen,
    config: Config,
    compat_warning: Option<String>,
    debug_overlay: Arc<AtomicBool>,
    // Pipeline plumbing, consumed when the workers start.
    sprites: Option<SpriteSet>,
    frame_tx: Sender<Frame>,
    frame_rx: Option<Receiver<Frame>>,
    detected_tx: Option<Sender<DetectedFrame>>,
    detected_rx: Option<Receiver<DetectedFrame>>,
    composited_rx: Receiver<CompositedFrame>,
    composited_tx: Option<Sender<CompositedFrame>>,
    detector_backend: DetectorBackend,
    detector_handle: Option<thread::JoinHandle<()>>,
    compositor_handle: Option<thread::JoinHandle<()>>,
    camera_stream: Option<CameraStream>,
    available_cameras: Vec<CameraDevice>,
    selected_camera_idx: Option<usize>,
    camera_error: Option<String>,
    latest_frame_size: Option<(u32, u32)>,
    pose_detected: bool,
    latest_image: Option<Arc<RenderImage>>,
    download_rx: Receiver<DownloadMessage>,
    _download_handle: thread::JoinHandle<()>,
    camera_picker_open: bool,
}

enum Screen {
    Camera(CameraState),
    Download(DownloadState),
    Main,
}

enum CameraState {
    Unavailable {
        message: String,
    },
    Selection {
        options: Vec<CameraDevice>,
        selected: usize,
        start_error: Option<String>,
    },
    Ready,
}

struct DownloadState {
    downloaded: u64,
    total: Option<u64>,
    message: String,
    error: Option<String>,
    finished: bool,
}

impl DownloadState {
    fn new() -> Self {
        Self {
            downloaded: 0,
            total: None,
            message: "Preparing model download...".to_string(),
            error: None,
            finished: false,
        }
    }
}

enum DownloadMessage {
    Event(DownloadEvent),
    Error(String),
}

impl AppView {
    fn new(
        config: Config,
        sprites: SpriteSet,
        compat_warning: Option<String>,
        frame_tx: Sender<Frame>,
        frame_rx: Receiver<Frame>,
        detector_backend: DetectorBackend,
    ) -> Self {
        let (download_tx, download_rx) = unbounded();
        let download_handle =
            download::spawn_model_download(detector_backend.clone(), download_tx);
        let (initial_camera_state, available_cameras) = Self::initial_camera_state();
        let selected_camera_idx = if available_cameras.is_empty() {
            None
        } else {
            Some(0)
        };

        let (detected_tx, detected_rx) = bounded(1);
        let (composited_tx, composited_rx) = bounded(1);
        let debug_overlay = Arc::new(AtomicBool::new(config.visible_debug));

        Self {
            screen: Screen::Camera(initial_camera_state),
            config,
            compat_warning,
            debug_overlay,
            sprites: Some(sprites),
            frame_tx,
            frame_rx: Some(frame_rx),
            detected_tx: Some(detected_tx),
            detected_rx: Some(detected_rx),
            composited_rx,
            composited_tx: Some(composited_tx),
            detector_backend,
            detector_handle: None,
            compositor_handle: None,
            camera_stream: None,
            available_cameras,
            selected_camera_idx,
            camera_error: None,
            latest_frame_size: None,
            pose_detected: false,
            latest_image: None,
            download_rx,
            _download_handle: download_handle,
            camera_picker_open: false,
        }
    }

    fn start_pipeline_if_needed(&mut self) {
        if self.detector_handle.is_some() {
            return;
        }

        let Some(frame_rx) = self.frame_rx.take() else {
            log::warn!("missing frame receiver for detector");
            return;
        };
        let Some(detected_tx) = self.detected_tx.take() else {
            log::warn!("missing detected-frame sender for detector");
            return;
        };
        let Some(detected_rx) = self.detected_rx.take() else {
            log::warn!("missing detected-frame receiver for compositor");
            return;
        };
        let Some(composited_tx) = self.composited_tx.take() else {
            log::warn!("missing composited-frame sender for compositor");
            return;
        };
        let Some(sprites) = self.sprites.take() else {
            log::warn!("sprite assets already consumed");
            return;
        };

        let backend = self.detector_backend.clone();
        self.detector_handle = Some(start_detector(backend, frame_rx, detected_tx));
        self.compositor_handle = Some(start_frame_compositor(
            sprites,
            self.debug_overlay.clone(),
            detected_rx,
            composited_tx,
        ));
    }
}

impl Render for AppView {
    fn render(
        &mut self,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) -> impl gpui::IntoElement {
        cx.defer_in(window, |_, _, cx| {
            cx.notify();
        });

        let mut screen = std::mem::replace(&mut self.screen, Screen::Main);
        let view = match screen {
            Screen::Camera(mut state) => {
                let view = self.render_camera_view(&mut state, cx);
                match state {
                    CameraState::Ready => {
                        screen = Screen::Download(DownloadState::new());
                    }
                    _ => {
                        screen = Screen::Camera(state);
                    }
                }
                view
            }
            Screen::Download(mut state) => {
                self.poll_download_events(&mut state);
                let should_switch = state.finished && state.error.is_none();
                let view = self.render_download_view(&state, cx);
                if should_switch {
                    self.start_pipeline_if_needed();
                    screen = Screen::Main;
                } else {
                    screen = Screen::Download(state);
                }
                view
            }
            Screen::Main => {
                screen = Screen::Main;
                self.render_main(window, cx)
            }
        };
        self.screen = screen;
        view
    }
}
