use std::path::PathBuf;
use std::sync::Arc;

use instant::Instant;
use wgpu_text::glyph_brush::ab_glyph::FontArc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::control_state::{ControlState, View};
use crate::error::ViewerResult;
use crate::gallery::MODELS;
use crate::keyboard::Keyboard;
use crate::markup;
use crate::registry::{describe, GaitPhase};
use crate::scene::Scene;
use crate::stage::Stage;
use crate::wgpu::text_renderer::load_font;
use crate::wgpu::Wgpu;
use crate::{GaitAction, GaitEvent, Radio};

/// Frames further apart than this are treated as this long, so a stalled
/// window does not skip a whole pulse.
const MAX_FRAME_SECS: f32 = 0.1;

/// Startup choices, usually from the command line.
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub phase: GaitPhase,
    pub view: View,
    pub width: u32,
    pub height: u32,
    pub font: Option<PathBuf>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            phase: GaitPhase::default(),
            view: View::default(),
            width: 1600,
            height: 1000,
            font: None,
        }
    }
}

impl ViewerSettings {
    fn window_attributes(&self) -> WindowAttributes {
        let attributes = Window::default_attributes()
            .with_title("Gait Lab")
            .with_inner_size(PhysicalSize::new(self.width, self.height));
        #[cfg(target_arch = "wasm32")]
        let attributes = {
            use winit::platform::web::WindowAttributesExtWebSys;
            attributes.with_append(true)
        };
        attributes
    }
}

pub struct Application {
    window_attributes: WindowAttributes,
    radio: Radio,
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    font: Option<FontArc>,
    stage: Stage,
    control_state: ControlState,
    keyboard: Keyboard,
    last_frame: Instant,
}

impl Application {
    pub fn new(settings: ViewerSettings, radio: Radio) -> ViewerResult<Application> {
        let font = settings.font.as_deref().map(load_font).transpose()?;
        Ok(Application {
            window_attributes: settings.window_attributes(),
            radio,
            window: None,
            scene: None,
            font,
            stage: Stage::new(settings.phase),
            control_state: ControlState::new(settings.phase, settings.view),
            keyboard: Keyboard::default(),
            last_frame: Instant::now(),
        })
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> ViewerResult<Arc<Window>> {
        let window = event_loop.create_window(self.window_attributes.clone())?;
        Ok(Arc::new(window))
    }

    fn act(&mut self, action: GaitAction, event_loop: &ActiveEventLoop) {
        match action {
            GaitAction::SelectPhase(phase) => {
                if self.control_state.select_phase(phase) {
                    self.phase_changed();
                }
            }
            GaitAction::StepPhase { forward } => {
                if self.control_state.step_phase(forward) {
                    self.phase_changed();
                }
            }
            GaitAction::ToggleView => {
                let view = self.control_state.toggle_view();
                log::info!("View {view}");
                if view == View::Gallery && !self.has_text() {
                    log_gallery();
                }
                self.request_redraw();
            }
            GaitAction::Exit => event_loop.exit(),
        }
    }

    fn phase_changed(&mut self) {
        let phase = self.control_state.phase();
        log::info!("Phase {phase}");
        self.stage.retarget(phase, true);
        if !self.has_text() {
            log_description(phase);
        }
        self.request_redraw();
    }

    fn has_text(&self) -> bool {
        self.scene.as_ref().is_some_and(Scene::has_text)
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn update_hover(&mut self) {
        let hovered = match (&self.scene, self.control_state.view()) {
            (Some(scene), View::Simulator) => scene.leg_under_cursor(&self.stage),
            _ => None,
        };
        if self.control_state.set_hovered(hovered) {
            if let Some(leg_type) = hovered {
                log::debug!("Hovering over {leg_type}");
            }
        }
    }

    pub fn redraw(&mut self) {
        let now = Instant::now();
        let elapsed_secs = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_SECS);
        self.last_frame = now;
        self.stage.tick(elapsed_secs);
        if let Some(scene) = &mut self.scene {
            let legend = self.keyboard.legend(&self.control_state);
            scene.redraw(&self.stage, &self.control_state, legend);
        }
    }
}

impl ApplicationHandler<GaitEvent> for Application {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match self.create_window(event_loop) {
            Ok(window) => {
                self.window = Some(window.clone());
                Wgpu::create_and_send(window, self.radio.clone());
            }
            Err(error) => {
                log::error!("{error}");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: GaitEvent) {
        match event {
            GaitEvent::ContextCreated(wgpu) => {
                let scene = Scene::new(wgpu, self.font.take());
                if !scene.has_text() {
                    log::info!("No font given, descriptions go to the log");
                    log_description(self.control_state.phase());
                }
                self.scene = Some(scene);
                self.last_frame = Instant::now();
                self.request_redraw();
            }
            GaitEvent::ContextFailed(reason) => {
                log::error!("Graphics unavailable: {reason}");
                event_loop.exit();
            }
            GaitEvent::Action(action) => self.act(action, event_loop),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::Resized(size) => {
                if let Some(scene) = &mut self.scene {
                    scene.resize((size.width, size.height));
                }
                self.request_redraw();
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                self.keyboard
                    .handle_key_event(key_event, &self.control_state, &self.radio);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(scene) = &mut self.scene {
                    scene.cursor_moved(position);
                }
                self.update_hover();
                self.request_redraw();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(scene) = &mut self.scene {
                    scene.mouse_input(state, button);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(scene) = &mut self.scene {
                    scene.mouse_wheel(delta);
                }
                self.update_hover();
                self.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.stage.is_settled() {
            self.request_redraw();
        }
    }
}

fn log_description(phase: GaitPhase) {
    let description = describe(phase);
    log::info!("{}", description.title);
    for paragraph in markup::paragraphs(description.body) {
        log::info!("{}", markup::plain_text(&paragraph));
    }
}

fn log_gallery() {
    for model in &MODELS {
        log::info!(
            "{}: {} ({}, {})",
            model.title,
            model.credit(),
            model.model_url(),
            model.author_url()
        );
    }
}
