use std::sync::{Arc, atomic::Ordering};

use super::render_util::composited_to_image;
use super::{
    AnyElement, AppView, Button, ButtonVariants, Context, IntoElement, ObjectFit,
    ParentElement, SharedString, Styled, StyledImage, Window, div, h_flex, img, px, v_flex,
};

impl AppView {
    pub(super) fn render_main(
        &mut self,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) -> AnyElement {
        // Drain the compositor channel, keeping only the newest frame.
        let mut newest = None;
        while let Ok(frame) = self.composited_rx.try_recv() {
            newest = Some(frame);
        }
        if let Some(frame) = newest {
            self.latest_frame_size = Some((frame.width, frame.height));
            self.pose_detected = frame.pose_detected;
            if let Some(image) = composited_to_image(&frame) {
                self.replace_latest_image(image, window, cx);
            }
        }

        let camera_label = self
            .selected_camera_idx
            .and_then(|idx| self.available_cameras.get(idx))
            .map(|c| c.label.clone())
            .unwrap_or_else(|| "No camera selected".to_string());

        let frame_status = self
            .latest_frame_size
            .map(|(w, h)| format!("{camera_label} {w}x{h}"))
            .unwrap_or_else(|| format!("{camera_label}, waiting for frames..."));

        let frame_view: AnyElement = if let Some(image) = &self.latest_image {
            img(image.clone())
                .size_full()
                .object_fit(ObjectFit::Contain)
                .into_any_element()
        } else {
            div()
                .size_full()
                .flex()
                .items_center()
                .justify_center()
                .text_sm()
                .text_color(gpui::rgb(0x8b95a5))
                .child("Waiting for camera...")
                .into_any_element()
        };

        let (pose_icon, pose_text, pose_color) = if self.pose_detected {
            ("●", "Pose detected", gpui::rgb(0x4ade80))
        } else {
            ("○", "No pose", gpui::rgb(0x8b95a5))
        };

        let debug_on = self.debug_overlay.load(Ordering::Relaxed);
        let debug_label = if debug_on {
            "Skeleton: on"
        } else {
            "Skeleton: off"
        };

        let mut control_row = h_flex()
            .gap_3()
            .items_center()
            .px_4()
            .py_2()
            .bg(gpui::rgba(0x0f1419e0))
            .child(
                div()
                    .text_xs()
                    .text_color(pose_color)
                    .child(format!("{pose_icon} {pose_text}")),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(gpui::rgb(0xa0aab8))
                    .overflow_hidden()
                    .text_ellipsis()
                    .whitespace_nowrap()
                    .child(frame_status),
            )
            .child(div().flex_1())
            .child(
                Button::new(SharedString::from("debug-toggle"))
                    .outline()
                    .label(debug_label)
                    .on_click(cx.listener(|this, _, _, cx| {
                        this.debug_overlay.fetch_xor(true, Ordering::Relaxed);
                        cx.notify();
                    })),
            );

        if self.available_cameras.len() > 1 {
            let picker_label = if self.camera_picker_open {
                "◉ Close"
            } else {
                "◉ Switch camera"
            };
            control_row = control_row.child(
                Button::new(SharedString::from("camera-picker-toggle"))
                    .outline()
                    .label(picker_label)
                    .on_click(cx.listener(|this, _, _, cx| {
                        this.camera_picker_open = !this.camera_picker_open;
                        cx.notify();
                    })),
            );
        }

        let mut overlay_panel: Option<AnyElement> = None;
        if self.camera_picker_open && !self.available_cameras.is_empty() {
            overlay_panel = Some(self.render_camera_picker_main(cx));
        } else if let Some(err) = &self.camera_error {
            overlay_panel = Some(
                h_flex()
                    .gap_2()
                    .items_center()
                    .p_3()
                    .rounded_lg()
                    .bg(gpui::rgba(0xef444433))
                    .border_1()
                    .border_color(gpui::rgba(0xef4444ff))
                    .child(div().text_base().child("⚠️"))
                    .child(
                        div()
                            .text_xs()
                            .text_color(gpui::rgb(0xfca5a5))
                            .child(err.clone()),
                    )
                    .into_any_element(),
            );
        }

        let mut stage = div()
            .relative()
            .flex_1()
            .overflow_hidden()
            .bg(gpui::rgb(0x000000))
            .child(frame_view);

        if let Some(warning) = &self.compat_warning {
            let warning = warning.clone();
            stage = stage.child(
                h_flex()
                    .absolute()
                    .top(px(12.0))
                    .left(px(12.0))
                    .right(px(12.0))
                    .gap_2()
                    .items_center()
                    .p_3()
                    .rounded_lg()
                    .bg(gpui::rgba(0x78350fcc))
                    .border_1()
                    .border_color(gpui::rgba(0xf59e0bff))
                    .child(
                        div()
                            .flex_1()
                            .text_xs()
                            .text_color(gpui::rgb(0xfde68a))
                            .child(warning),
                    )
                    .child(
                        Button::new(SharedString::from("compat-dismiss"))
                            .ghost()
                            .label("×")
                            .on_click(cx.listener(|this, _, _, cx| {
                                this.compat_warning = None;
                                cx.notify();
                            })),
                    ),
            );
        }

        if let Some(panel) = overlay_panel {
            stage = stage.child(
                div()
                    .absolute()
                    .top(px(56.0))
                    .left_1_2()
                    .w(px(400.0))
                    .child(div().relative().left(px(-200.0)).child(panel)),
            );
        }

        v_flex()
            .size_full()
            .bg(gpui::rgb(0x1a2332))
            .child(stage)
            .child(control_row)
            .into_any_element()
    }

    fn replace_latest_image(
        &mut self,
        new_image: Arc<super::RenderImage>,
        window: &mut Window,
        cx: &mut Context<'_, Self>,
    ) {
        if let Some(old_image) = self.latest_image.replace(new_image) {
            // Explicitly drop the previous GPU texture; otherwise the sprite atlas keeps
            // every frame and memory will climb rapidly while the camera is running.
            cx.drop_image(old_image, Some(window));
        }
    }
}
