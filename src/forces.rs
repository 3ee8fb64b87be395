use glam::Vec3;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::registry::{self, GaitPhase, LegType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
pub enum ForceSlot {
    #[strum(to_string = "Ground Reaction")]
    GroundReaction,
    Compression,
    #[strum(to_string = "Muscle 1")]
    Muscle1,
    #[strum(to_string = "Muscle 2")]
    Muscle2,
}

/// A force drawn as an arrow. A `None` direction stands for a zero-length
/// input vector and is drawn pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceVector {
    pub origin: Vec3,
    pub direction: Option<Vec3>,
    pub magnitude: f32,
    pub label: Option<&'static str>,
}

impl ForceVector {
    pub fn new(origin: Vec3, direction: Vec3, magnitude: f32) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(),
            magnitude: magnitude.max(0.0),
            label: None,
        }
    }

    pub fn inactive() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: None,
            magnitude: 0.0,
            label: None,
        }
    }

    pub fn labeled(self, label: &'static str) -> Self {
        Self {
            label: Some(label),
            ..self
        }
    }

    pub fn is_active(&self) -> bool {
        self.magnitude > 0.0
    }
}

/// Compression along the bone or pylon, drawn as a line rather than an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompressionSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub visible: bool,
}

impl CompressionSegment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            visible: true,
        }
    }
}

/// What one slot holds: an arrow or the compression line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ForceSpec {
    Vector(ForceVector),
    Segment(CompressionSegment),
}

impl ForceSpec {
    pub fn is_active(&self) -> bool {
        match self {
            ForceSpec::Vector(vector) => vector.is_active(),
            ForceSpec::Segment(segment) => segment.visible,
        }
    }
}

/// One entry per slot, inactive entries included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceSet {
    pub ground_reaction: ForceVector,
    pub compression: CompressionSegment,
    pub muscle1: ForceVector,
    pub muscle2: ForceVector,
}

impl ForceSet {
    pub fn get(&self, slot: ForceSlot) -> ForceSpec {
        match slot {
            ForceSlot::GroundReaction => ForceSpec::Vector(self.ground_reaction),
            ForceSlot::Compression => ForceSpec::Segment(self.compression),
            ForceSlot::Muscle1 => ForceSpec::Vector(self.muscle1),
            ForceSlot::Muscle2 => ForceSpec::Vector(self.muscle2),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ForceSlot, ForceSpec)> + '_ {
        ForceSlot::iter().map(move |slot| (slot, self.get(slot)))
    }

    pub fn muscles(&self) -> [ForceVector; 2] {
        [self.muscle1, self.muscle2]
    }
}

/// The forces to show for a phase on a leg, straight from the registry.
pub fn derive_active_forces(phase: GaitPhase, leg_type: LegType) -> ForceSet {
    registry::forces(phase, leg_type)
}

/// Every phase on every leg, in enum order, for dumping.
pub fn force_table() -> Vec<(GaitPhase, LegType, ForceSet)> {
    GaitPhase::iter()
        .flat_map(|phase| {
            LegType::iter().map(move |leg_type| (phase, leg_type, derive_active_forces(phase, leg_type)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BODY_WEIGHT_FORCE;
    use approx::assert_relative_eq;

    #[test]
    fn every_slot_is_present_for_every_phase_and_leg() {
        for (_, _, set) in force_table() {
            let slots: Vec<ForceSlot> = set.iter().map(|(slot, _)| slot).collect();
            assert_eq!(slots, ForceSlot::iter().collect::<Vec<_>>());
        }
        assert_eq!(force_table().len(), 8);
    }

    #[test]
    fn prosthesis_never_has_muscle_forces() {
        for phase in GaitPhase::iter() {
            let set = derive_active_forces(phase, LegType::Prosthetic);
            for muscle in set.muscles() {
                assert_eq!(muscle.magnitude, 0.0);
                assert!(!muscle.is_active());
            }
        }
    }

    #[test]
    fn derivation_is_repeatable() {
        for (phase, leg_type, set) in force_table() {
            assert_eq!(derive_active_forces(phase, leg_type), set);
        }
    }

    #[test]
    fn human_midstance() {
        let set = derive_active_forces(GaitPhase::Midstance, LegType::Human);
        assert_relative_eq!(set.ground_reaction.magnitude, BODY_WEIGHT_FORCE * 1.2);
        assert!(set.compression.visible);
        assert_eq!(set.muscle1.label, Some("Gastrocnemius"));
        assert_relative_eq!(set.muscle1.magnitude, 1.2);
        assert!(!set.muscle2.is_active());
        let active: Vec<ForceSlot> = set
            .iter()
            .filter(|(_, spec)| spec.is_active())
            .map(|(slot, _)| slot)
            .collect();
        assert_eq!(
            active,
            vec![ForceSlot::GroundReaction, ForceSlot::Compression, ForceSlot::Muscle1]
        );
    }

    #[test]
    fn prosthetic_heel_strike() {
        let set = derive_active_forces(GaitPhase::HeelStrike, LegType::Prosthetic);
        let grf = set.ground_reaction;
        assert_relative_eq!(grf.magnitude, BODY_WEIGHT_FORCE * 0.2);
        let minimum = GaitPhase::iter()
            .map(|phase| derive_active_forces(phase, LegType::Prosthetic).ground_reaction.magnitude)
            .fold(f32::INFINITY, f32::min);
        assert_relative_eq!(grf.magnitude, minimum);
        let direction = grf.direction.unwrap();
        assert!(direction.z < 0.0);
        assert_relative_eq!(direction.length(), 1.0, epsilon = 1e-6);
        assert_eq!(set.compression.start, grf.origin);
        assert!(set.compression.end.y > -2.0 + 0.5);
    }

    #[test]
    fn zero_direction_becomes_undefined() {
        let force = ForceVector::new(Vec3::ONE, Vec3::ZERO, 1.0);
        assert_eq!(force.direction, None);
        assert!(force.is_active());
        assert!(!ForceVector::new(Vec3::ONE, Vec3::Y, -3.0).is_active());
    }
}
