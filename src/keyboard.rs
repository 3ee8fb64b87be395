use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::control_state::{ControlState, View};
use crate::registry::GaitPhase;
use crate::{GaitAction, Radio};

struct KeyAction {
    code: KeyCode,
    description: &'static str,
    action: GaitAction,
    is_active_in: Box<dyn Fn(&ControlState) -> bool>,
}

pub struct Keyboard {
    actions: Vec<KeyAction>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new().with_actions()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self) -> Self {
        let phase_keys = [
            (KeyCode::Digit1, GaitPhase::StaticStand),
            (KeyCode::Digit2, GaitPhase::HeelStrike),
            (KeyCode::Digit3, GaitPhase::Midstance),
            (KeyCode::Digit4, GaitPhase::ToeOff),
        ];
        for (code, phase) in phase_keys {
            self.add_action(
                code,
                "1-4 choose phase",
                GaitAction::SelectPhase(phase),
                Box::new(|state| state.view() == View::Simulator),
            );
        }
        self.add_action(
            KeyCode::ArrowLeft,
            "\u{2190} \u{2192} step phase",
            GaitAction::StepPhase { forward: false },
            Box::new(|state| state.view() == View::Simulator),
        );
        self.add_action(
            KeyCode::ArrowRight,
            "\u{2190} \u{2192} step phase",
            GaitAction::StepPhase { forward: true },
            Box::new(|state| state.view() == View::Simulator),
        );
        self.add_action(
            KeyCode::Tab,
            "Tab for gallery",
            GaitAction::ToggleView,
            Box::new(|state| state.view() == View::Simulator),
        );
        self.add_action(
            KeyCode::Tab,
            "Tab for simulator",
            GaitAction::ToggleView,
            Box::new(|state| state.view() == View::Gallery),
        );
        self.add_action(KeyCode::Escape, "ESC to quit", GaitAction::Exit, Box::new(|_| true));
        self
    }

    pub fn handle_key_event(&self, key_event: KeyEvent, control_state: &ControlState, radio: &Radio) {
        if !key_event.state.is_pressed() || key_event.repeat {
            return;
        }
        if let PhysicalKey::Code(code) = key_event.physical_key {
            for action in self.actions_for(code, control_state) {
                action.send(radio);
            }
        }
    }

    pub fn actions_for(&self, code: KeyCode, control_state: &ControlState) -> Vec<GaitAction> {
        self.actions
            .iter()
            .filter(|action| action.code == code && (action.is_active_in)(control_state))
            .map(|action| action.action)
            .collect()
    }

    pub fn legend(&self, control_state: &ControlState) -> Vec<&'static str> {
        let mut legend: Vec<&'static str> = self
            .actions
            .iter()
            .filter(|action| (action.is_active_in)(control_state))
            .map(|action| action.description)
            .collect();
        legend.dedup();
        legend
    }

    fn add_action(
        &mut self,
        code: KeyCode,
        description: &'static str,
        action: GaitAction,
        is_active_in: Box<dyn Fn(&ControlState) -> bool>,
    ) {
        self.actions.push(KeyAction {
            code,
            description,
            action,
            is_active_in,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_phases_in_the_simulator() {
        let keyboard = Keyboard::default();
        let state = ControlState::default();
        assert_eq!(
            keyboard.actions_for(KeyCode::Digit3, &state),
            vec![GaitAction::SelectPhase(GaitPhase::Midstance)]
        );
        assert_eq!(
            keyboard.actions_for(KeyCode::ArrowLeft, &state),
            vec![GaitAction::StepPhase { forward: false }]
        );
        assert!(keyboard.actions_for(KeyCode::KeyQ, &state).is_empty());
    }

    #[test]
    fn gallery_ignores_phase_keys() {
        let keyboard = Keyboard::default();
        let state = ControlState::new(GaitPhase::StaticStand, View::Gallery);
        assert!(keyboard.actions_for(KeyCode::Digit1, &state).is_empty());
        assert_eq!(
            keyboard.actions_for(KeyCode::Tab, &state),
            vec![GaitAction::ToggleView]
        );
    }

    #[test]
    fn legend_follows_the_view() {
        let keyboard = Keyboard::default();
        let simulator = keyboard.legend(&ControlState::default());
        assert_eq!(
            simulator,
            vec![
                "1-4 choose phase",
                "\u{2190} \u{2192} step phase",
                "Tab for gallery",
                "ESC to quit"
            ]
        );
        let gallery = keyboard.legend(&ControlState::new(GaitPhase::Midstance, View::Gallery));
        assert_eq!(gallery, vec!["Tab for simulator", "ESC to quit"]);
    }
}
