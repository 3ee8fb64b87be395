//! The fixed table of gait phases: what each phase is called, how it is
//! described, and which forces act on each kind of leg while it lasts.
//!
//! Values are illustrative constants, not measurements. Coordinates are
//! leg-local: the foot sole sits at `y = -2`, `+y` is up and `+z` points
//! toward the heel.

use glam::Vec3;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::forces::{CompressionSegment, ForceSet, ForceVector};

/// Scene units of force corresponding to standing body weight.
pub const BODY_WEIGHT_FORCE: f32 = 2.0;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr, Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum GaitPhase {
    #[default]
    #[strum(to_string = "Static Stand", serialize = "static-stand")]
    StaticStand,
    #[strum(to_string = "Heel Strike", serialize = "heel-strike")]
    HeelStrike,
    #[strum(to_string = "Midstance", serialize = "midstance")]
    Midstance,
    #[strum(to_string = "Toe Off", serialize = "toe-off")]
    ToeOff,
}

impl GaitPhase {
    /// Next phase in gait order, wrapping from toe off back to standing.
    pub fn next(self) -> Self {
        use GaitPhase::*;
        match self {
            StaticStand => HeelStrike,
            HeelStrike => Midstance,
            Midstance => ToeOff,
            ToeOff => StaticStand,
        }
    }

    pub fn previous(self) -> Self {
        use GaitPhase::*;
        match self {
            StaticStand => ToeOff,
            HeelStrike => StaticStand,
            Midstance => HeelStrike,
            ToeOff => Midstance,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr, Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum LegType {
    #[strum(to_string = "Human Leg", serialize = "human")]
    Human,
    #[strum(to_string = "Trans-tibial Prosthesis", serialize = "prosthetic")]
    Prosthetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDescription {
    pub title: &'static str,
    pub body: &'static str,
}

pub fn describe(phase: GaitPhase) -> PhaseDescription {
    use GaitPhase::*;
    match phase {
        StaticStand => PhaseDescription {
            title: "Static Stand",
            body: "Body weight is distributed vertically. The Ground Reaction Force (GRF, in red) \
                   is equal and opposite to body weight.\n\n\
                   **Tibia:** The compressive load (blue) is carried directly by the bone, with \
                   minimal muscle activity (green) to keep balance.\n\n\
                   **Prosthesis:** The load travels through the pylon into the socket and the \
                   residual limb. Correct alignment is crucial so that forces are distributed \
                   much as they are in the biological leg.",
        },
        HeelStrike => PhaseDescription {
            title: "Heel Strike",
            body: "Stance begins. The GRF is applied at the heel.\n\n\
                   **Tibia:** The bone absorbs the initial impact. The tibialis anterior \
                   activates to control the lowering of the foot and keep it from slapping \
                   the ground.\n\n\
                   **Prosthesis:** The heel of the prosthetic foot, often made of a shock \
                   absorbing material, mimics the fat pad of the heel. The prosthesis has no \
                   active muscle control; its mechanical design governs the rollover.",
        },
        Midstance => PhaseDescription {
            title: "Midstance",
            body: "The body passes over the foot. The GRF reaches its peak, and so do the \
                   internal compressive forces.\n\n\
                   **Tibia:** Carries the highest compression of the whole cycle. The calf \
                   muscles activate to stabilize the ankle and control how the tibia advances \
                   over the foot.\n\n\
                   **Prosthesis:** Peak compressive forces travel through the pylon. The keel \
                   of the prosthetic foot provides a stable base and a controlled rollover, \
                   standing in for the ankle.",
        },
        ToeOff => PhaseDescription {
            title: "Toe Off",
            body: "Stance ends. The GRF moves toward the tip of the foot to generate \
                   propulsion.\n\n\
                   **Tibia:** The calf muscles contract powerfully to push the body forward \
                   (plantar flexion), using the tibia as a lever.\n\n\
                   **Prosthesis:** Modern prosthetic feet (carbon fibre ones in particular) \
                   store energy during midstance and release it at toe off. This produces \
                   propulsion and aims at functional equivalence with the muscular push.",
        },
    }
}

const TIBIALIS_ANTERIOR: &str = "Tibialis anterior";
const GASTROCNEMIUS: &str = "Gastrocnemius";

/// The force table. Both leg types share ground reaction and compression;
/// a prosthesis has no muscles to drive it, so its muscle slots are inactive
/// in every phase.
pub fn forces(phase: GaitPhase, leg_type: LegType) -> ForceSet {
    use GaitPhase::*;
    let (ground_reaction, compression, muscles) = match phase {
        StaticStand => (
            ForceVector::new(Vec3::new(0.0, -2.0, 0.0), Vec3::Y, BODY_WEIGHT_FORCE * 1.0),
            CompressionSegment::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, 1.5, 0.0)),
            [
                ForceVector::new(Vec3::new(0.1, -0.5, 0.2), Vec3::NEG_Y, 0.2)
                    .labeled(TIBIALIS_ANTERIOR),
                ForceVector::new(Vec3::new(-0.1, 0.5, -0.2), Vec3::Y, 0.2).labeled(GASTROCNEMIUS),
            ],
        ),
        HeelStrike => (
            ForceVector::new(
                Vec3::new(0.0, -2.0, 0.4),
                Vec3::new(0.0, 1.0, -0.2),
                BODY_WEIGHT_FORCE * 0.2,
            ),
            CompressionSegment::new(Vec3::new(0.0, -2.0, 0.4), Vec3::new(0.0, 1.0, 0.0)),
            [
                ForceVector::new(Vec3::new(0.1, -0.1, 0.2), Vec3::Y, 0.8)
                    .labeled(TIBIALIS_ANTERIOR),
                ForceVector::inactive(),
            ],
        ),
        Midstance => (
            ForceVector::new(Vec3::new(0.0, -2.0, 0.0), Vec3::Y, BODY_WEIGHT_FORCE * 1.2),
            CompressionSegment::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, 1.5, 0.0)),
            [
                ForceVector::new(Vec3::new(-0.1, 1.0, -0.2), Vec3::NEG_Y, 1.2)
                    .labeled(GASTROCNEMIUS),
                ForceVector::inactive(),
            ],
        ),
        ToeOff => (
            ForceVector::new(
                Vec3::new(0.0, -2.0, -0.4),
                Vec3::new(0.0, 1.0, 0.2),
                BODY_WEIGHT_FORCE * 0.8,
            ),
            CompressionSegment::new(Vec3::new(0.0, -2.0, -0.4), Vec3::new(0.0, 1.5, 0.0)),
            [
                ForceVector::new(Vec3::new(-0.1, 1.0, -0.2), Vec3::NEG_Y, 1.5)
                    .labeled(GASTROCNEMIUS),
                ForceVector::inactive(),
            ],
        ),
    };
    let [muscle1, muscle2] = match leg_type {
        LegType::Human => muscles,
        LegType::Prosthetic => [ForceVector::inactive(), ForceVector::inactive()],
    };
    ForceSet {
        ground_reaction,
        compression,
        muscle1,
        muscle2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn phases_parse_from_names_and_identifiers() {
        assert_eq!(GaitPhase::from_str("toe-off"), Ok(GaitPhase::ToeOff));
        assert_eq!(GaitPhase::from_str("Heel Strike"), Ok(GaitPhase::HeelStrike));
        assert_eq!(GaitPhase::from_str("MIDSTANCE"), Ok(GaitPhase::Midstance));
        assert!(GaitPhase::from_str("swing").is_err());
        assert_eq!(GaitPhase::default(), GaitPhase::StaticStand);
    }

    #[test]
    fn next_and_previous_cycle_through_all_phases() {
        for phase in GaitPhase::iter() {
            assert_eq!(phase.next().previous(), phase);
        }
        let mut phase = GaitPhase::StaticStand;
        let visited: Vec<_> = (0..4)
            .map(|_| {
                phase = phase.next();
                phase
            })
            .collect();
        assert_eq!(visited.last(), Some(&GaitPhase::StaticStand));
        assert_eq!(visited.len(), GaitPhase::iter().count());
    }

    #[test]
    fn every_phase_has_a_titled_description() {
        for phase in GaitPhase::iter() {
            let description = describe(phase);
            assert_eq!(description.title, phase.to_string());
            assert!(description.body.contains("**Tibia:**"));
            assert!(description.body.contains("**Prosthesis:**"));
        }
    }

    #[test]
    fn ground_reaction_peaks_at_midstance() {
        for leg_type in LegType::iter() {
            let peak = GaitPhase::iter()
                .max_by(|a, b| {
                    let a = forces(*a, leg_type).ground_reaction.magnitude;
                    let b = forces(*b, leg_type).ground_reaction.magnitude;
                    a.total_cmp(&b)
                })
                .unwrap();
            assert_eq!(peak, GaitPhase::Midstance);
        }
    }

    #[test]
    fn ground_reaction_shifts_forward_at_toe_off() {
        let heel = forces(GaitPhase::HeelStrike, LegType::Human).ground_reaction;
        let toe = forces(GaitPhase::ToeOff, LegType::Human).ground_reaction;
        assert!(heel.origin.z > 0.0);
        assert!(toe.origin.z < 0.0);
        assert!(toe.direction.unwrap().z > 0.0);
    }

    #[test]
    fn compression_is_visible_in_every_phase() {
        for phase in GaitPhase::iter() {
            for leg_type in LegType::iter() {
                assert!(forces(phase, leg_type).compression.visible);
            }
        }
    }
}
