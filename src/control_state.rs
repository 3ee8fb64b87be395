use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::registry::{GaitPhase, LegType};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum View {
    #[default]
    #[strum(to_string = "Simulator", serialize = "simulator")]
    Simulator,
    #[strum(to_string = "Gallery", serialize = "gallery")]
    Gallery,
}

impl View {
    pub fn other(self) -> Self {
        match self {
            View::Simulator => View::Gallery,
            View::Gallery => View::Simulator,
        }
    }
}

/// What the viewer is showing. Owned by the application and changed only
/// through these methods, each reporting whether anything changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    phase: GaitPhase,
    view: View,
    hovered: Option<LegType>,
}

impl ControlState {
    pub fn new(phase: GaitPhase, view: View) -> Self {
        Self {
            phase,
            view,
            hovered: None,
        }
    }

    pub fn phase(&self) -> GaitPhase {
        self.phase
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn hovered(&self) -> Option<LegType> {
        self.hovered
    }

    pub fn select_phase(&mut self, phase: GaitPhase) -> bool {
        let changed = self.phase != phase;
        self.phase = phase;
        changed
    }

    pub fn step_phase(&mut self, forward: bool) -> bool {
        let phase = if forward {
            self.phase.next()
        } else {
            self.phase.previous()
        };
        self.select_phase(phase)
    }

    pub fn set_view(&mut self, view: View) -> bool {
        let changed = self.view != view;
        self.view = view;
        if changed && view == View::Gallery {
            self.hovered = None;
        }
        changed
    }

    pub fn toggle_view(&mut self) -> View {
        self.set_view(self.view.other());
        self.view
    }

    pub fn set_hovered(&mut self, hovered: Option<LegType>) -> bool {
        let changed = self.hovered != hovered;
        self.hovered = hovered;
        changed
    }
}
