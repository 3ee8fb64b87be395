use std::path::Path;

use wgpu::RenderPass;
use wgpu_text::glyph_brush::ab_glyph::FontArc;
use wgpu_text::{BrushBuilder, TextBrush};

use crate::control_state::ControlState;
use crate::error::{ViewerError, ViewerResult};
use crate::wgpu::text_state::TextState;
use crate::wgpu::Wgpu;

/// Reads and parses a TrueType font for the overlay.
pub fn load_font(path: &Path) -> ViewerResult<FontArc> {
    let font_error = |reason: String| ViewerError::Font {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|error| font_error(error.to_string()))?;
    FontArc::try_from_vec(bytes).map_err(|error| font_error(error.to_string()))
}

pub struct TextRenderer {
    text_state: TextState,
    brush: TextBrush<FontArc>,
}

impl TextRenderer {
    pub fn new(wgpu: &Wgpu, font: FontArc) -> Self {
        let (width, height) = wgpu.size();
        let brush = BrushBuilder::using_font(font).build(
            &wgpu.device,
            width,
            height,
            wgpu.surface_configuration.format,
        );
        let text_state = TextState::new(width, height);
        TextRenderer { brush, text_state }
    }

    pub fn resize(&mut self, wgpu: &Wgpu) {
        let (width, height) = wgpu.size();
        self.brush
            .resize_view(width as f32, height as f32, &wgpu.queue);
        self.text_state.resize(width, height);
    }

    pub fn update(
        &mut self,
        control_state: &ControlState,
        legend: Vec<&'static str>,
        hover_anchor: Option<[f32; 2]>,
    ) {
        self.text_state.update(control_state, legend);
        self.text_state.set_hover_anchor(hover_anchor);
    }

    pub fn draw<'a>(&'a mut self, render_pass: &mut RenderPass<'a>, wgpu: &Wgpu) {
        if let Err(error) = self
            .brush
            .queue(&wgpu.device, &wgpu.queue, self.text_state.sections())
        {
            log::warn!("Text not queued: {error}");
            return;
        }
        self.brush.draw(render_pass);
    }
}
