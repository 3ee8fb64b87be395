use crate::registry::GaitPhase;
use crate::wgpu::Wgpu;

pub mod application;
pub mod camera;
pub mod control_state;
pub mod error;
pub mod forces;
pub mod gallery;
pub mod keyboard;
pub mod leg;
pub mod markup;
pub mod palette;
pub mod presenter;
pub mod registry;
pub mod scene;
pub mod stage;
pub mod wgpu;

/// Something the user asked for, from the keyboard or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitAction {
    SelectPhase(GaitPhase),
    StepPhase { forward: bool },
    ToggleView,
    Exit,
}

impl GaitAction {
    pub fn send(self, radio: &Radio) {
        GaitEvent::Action(self).send(radio);
    }
}

#[derive(Debug)]
pub enum GaitEvent {
    ContextCreated(Wgpu),
    ContextFailed(String),
    Action(GaitAction),
}

pub type Radio = winit::event_loop::EventLoopProxy<GaitEvent>;

impl GaitEvent {
    pub fn send(self, radio: &Radio) {
        if radio.send_event(self).is_err() {
            log::warn!("Event loop closed, event dropped");
        }
    }
}
