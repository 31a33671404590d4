// src/ui/frame_view.rs
use image::DynamicImage;
use ratatui::{buffer::Buffer, layout::Rect};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, Resize, StatefulImage};

use crate::log_debug;

/// Renders the most recent feed frame into the video pane. The picker is
/// queried once; each frame swaps in a fresh resize protocol.
pub struct FrameView {
    picker: Picker,
    protocol: Option<StatefulProtocol>,
    frame_dimensions: Option<(u32, u32)>,
}

// Manual Debug implementation since StatefulProtocol doesn't implement Debug
impl std::fmt::Debug for FrameView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameView")
            .field("protocol", &self.protocol.as_ref().map(|_| "<StatefulProtocol>"))
            .field("frame_dimensions", &self.frame_dimensions)
            .finish()
    }
}

impl FrameView {
    pub fn new() -> Self {
        // Terminals that refuse the capability query still get halfblock
        // rendering with an assumed font size.
        let picker = Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((8, 16)));
        Self {
            picker,
            protocol: None,
            frame_dimensions: None,
        }
    }

    pub fn update(&mut self, frame: DynamicImage) {
        self.frame_dimensions = Some((frame.width(), frame.height()));
        self.protocol = Some(self.picker.new_resize_protocol(frame));
    }

    pub fn clear(&mut self) {
        self.protocol = None;
        self.frame_dimensions = None;
    }

    pub fn has_frame(&self) -> bool {
        self.protocol.is_some()
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        use ratatui::widgets::StatefulWidget;

        if let Some(protocol) = self.protocol.as_mut() {
            let image = StatefulImage::default().resize(Resize::Fit(None));
            image.render(area, buf, protocol);

            if let Err(e) = protocol.last_encoding_result().unwrap_or(Ok(())) {
                log_debug!("Frame encoding error: {}", e);
            }
        }
    }
}

impl Default for FrameView {
    fn default() -> Self {
        Self::new()
    }
}
