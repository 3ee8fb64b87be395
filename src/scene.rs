use wgpu_text::glyph_brush::ab_glyph::FontArc;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::camera::{Camera, START_POSITION};
use crate::control_state::{ControlState, View};
use crate::palette;
use crate::registry::LegType;
use crate::stage::Stage;
use crate::wgpu::shape_renderer::{ShapeBatch, ShapeRenderer};
use crate::wgpu::text_renderer::TextRenderer;
use crate::wgpu::Wgpu;

/// The GPU side: turns stage frames and control state into pixels.
pub struct Scene {
    wgpu: Wgpu,
    camera: Camera,
    shape_renderer: ShapeRenderer,
    text_renderer: Option<TextRenderer>,
}

impl Scene {
    pub fn new(wgpu: Wgpu, font: Option<FontArc>) -> Self {
        let (width, height) = wgpu.size();
        let camera = Camera::new(START_POSITION, width as f32, height as f32);
        let shape_renderer = ShapeRenderer::new(&wgpu);
        let text_renderer = font.map(|font| TextRenderer::new(&wgpu, font));
        Self {
            wgpu,
            camera,
            shape_renderer,
            text_renderer,
        }
    }

    pub fn has_text(&self) -> bool {
        self.text_renderer.is_some()
    }

    pub fn resize(&mut self, (width, height): (u32, u32)) {
        self.wgpu.resize((width, height));
        let (width, height) = self.wgpu.size();
        self.camera.set_size(width as f32, height as f32);
        if let Some(text_renderer) = &mut self.text_renderer {
            text_renderer.resize(&self.wgpu);
        }
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.camera.cursor_moved(position);
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) {
        self.camera.mouse_input(state, button);
    }

    pub fn mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.camera.mouse_wheel(delta);
    }

    /// The leg under the cursor, if any.
    pub fn leg_under_cursor(&self, stage: &Stage) -> Option<LegType> {
        stage.leg_under(&self.camera.pick_ray(self.camera.cursor()))
    }

    /// Window position of the hovered leg's label.
    fn hover_anchor(&self, stage: &Stage, control_state: &ControlState) -> Option<[f32; 2]> {
        let leg_type = control_state.hovered()?;
        self.camera.screen_position(stage.label_anchor(leg_type)?)
    }

    pub fn redraw(&mut self, stage: &Stage, control_state: &ControlState, legend: Vec<&'static str>) {
        let batch = match control_state.view() {
            View::Simulator => ShapeBatch::from_stage(&stage.frame()),
            View::Gallery => ShapeBatch::default(),
        };
        self.shape_renderer.update(&self.wgpu, &batch);
        self.wgpu.update_mvp_matrix(self.camera.mvp_matrix());
        let hover_anchor = self.hover_anchor(stage, control_state);
        if let Some(text_renderer) = &mut self.text_renderer {
            text_renderer.update(control_state, legend, hover_anchor);
        }

        let surface_texture = match self.wgpu.get_surface_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.wgpu.reconfigure();
                return;
            }
            Err(error) => {
                log::warn!("Unable to get surface texture: {error}");
                return;
            }
        };
        let texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = self.wgpu.create_depth_view();
        let mut encoder = self.wgpu.create_encoder();
        let [r, g, b, a] = palette::linear_rgba(palette::BACKGROUND, 1.0).map(f64::from);
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            self.shape_renderer
                .render(&mut render_pass, &self.wgpu.uniform_bind_group);
            if let Some(text_renderer) = &mut self.text_renderer {
                text_renderer.draw(&mut render_pass, &self.wgpu);
            }
        }
        self.wgpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }
}
