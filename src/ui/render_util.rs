use super::{Arc, ImageBuffer, ImageFrame, RenderImage, Rgba};
use crate::types::CompositedFrame;

/// Wrap a composited frame for GPUI. All overlay drawing already happened in
/// the compositor; this only converts the buffer to the BGRA ordering GPUI
/// expects, in place to avoid the async asset pipeline and flicker.
pub(super) fn composited_to_image(frame: &CompositedFrame) -> Option<Arc<RenderImage>> {
    let mut rgba = frame.rgba.clone();
    for px in rgba.chunks_exact_mut(4) {
        px.swap(0, 2);
    }

    let buffer = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(frame.width, frame.height, rgba)?;
    let image_frame = ImageFrame::new(buffer);

    Some(Arc::new(RenderImage::new(vec![image_frame])))
}
