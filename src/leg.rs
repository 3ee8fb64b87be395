use glam::Vec3;

use crate::forces::{derive_active_forces, ForceSlot, ForceSpec};
use crate::palette;
use crate::presenter::{ArrowFrame, ArrowPresenter, SegmentFrame, SegmentPresenter};
use crate::registry::{GaitPhase, LegType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Vertical, centered on the part's center.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Cuboid { size: Vec3 },
}

impl Shape {
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let radius = radius_top.max(radius_bottom);
                Vec3::new(radius, height / 2.0, radius)
            }
            Shape::Cuboid { size } => size / 2.0,
        }
    }
}

/// A fixed piece of a leg model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub name: &'static str,
    pub shape: Shape,
    pub center: Vec3,
    pub color: u32,
    pub opacity: f32,
    pub metallic: bool,
}

const fn part(name: &'static str, shape: Shape, center: Vec3, color: u32) -> Part {
    Part {
        name,
        shape,
        center,
        color,
        opacity: 1.0,
        metallic: false,
    }
}

const THIGH: Part = part(
    "thigh",
    Shape::Cylinder {
        radius_top: 0.3,
        radius_bottom: 0.25,
        height: 2.0,
    },
    Vec3::new(0.0, 1.0, 0.0),
    palette::SKIN,
);

const FOOT: Shape = Shape::Cuboid {
    size: Vec3::new(0.5, 0.2, 1.0),
};

pub const HUMAN_PARTS: [Part; 5] = [
    THIGH,
    part(
        "shank",
        Shape::Cylinder {
            radius_top: 0.25,
            radius_bottom: 0.2,
            height: 2.0,
        },
        Vec3::new(0.0, -1.0, 0.0),
        palette::SKIN,
    ),
    Part {
        opacity: 0.6,
        ..part(
            "tibialis anterior",
            Shape::Cuboid {
                size: Vec3::new(0.2, 0.8, 0.2),
            },
            Vec3::new(0.1, -0.5, 0.2),
            palette::MUSCLE_ANTERIOR,
        )
    },
    Part {
        opacity: 0.6,
        ..part(
            "gastrocnemius",
            Shape::Cuboid {
                size: Vec3::new(0.3, 1.0, 0.3),
            },
            Vec3::new(-0.1, 0.5, -0.2),
            palette::MUSCLE_POSTERIOR,
        )
    },
    part("foot", FOOT, Vec3::new(0.0, -2.0, 0.0), palette::SKIN),
];

pub const PROSTHETIC_PARTS: [Part; 4] = [
    THIGH,
    part(
        "socket",
        Shape::Cylinder {
            radius_top: 0.25,
            radius_bottom: 0.22,
            height: 0.8,
        },
        Vec3::new(0.0, -0.4, 0.0),
        palette::PROSTHESIS_SOCKET,
    ),
    Part {
        metallic: true,
        ..part(
            "pylon",
            Shape::Cylinder {
                radius_top: 0.05,
                radius_bottom: 0.05,
                height: 1.2,
            },
            Vec3::new(0.0, -1.4, 0.0),
            palette::PROSTHESIS_PYLON,
        )
    },
    part("foot", FOOT, Vec3::new(0.0, -2.0, 0.0), palette::PROSTHESIS_FOOT),
];

pub fn parts(leg_type: LegType) -> &'static [Part] {
    match leg_type {
        LegType::Human => &HUMAN_PARTS,
        LegType::Prosthetic => &PROSTHETIC_PARTS,
    }
}

/// A leg model placed in the scene with one presenter per force slot.
#[derive(Debug, Clone)]
pub struct LegAssembly {
    leg_type: LegType,
    offset: Vec3,
    ground_reaction: ArrowPresenter,
    compression: SegmentPresenter,
    muscles: [ArrowPresenter; 2],
}

impl LegAssembly {
    pub fn new(leg_type: LegType, offset: Vec3, phase: GaitPhase) -> Self {
        let forces = derive_active_forces(phase, leg_type);
        Self {
            leg_type,
            offset,
            ground_reaction: ArrowPresenter::new(&forces.ground_reaction),
            compression: SegmentPresenter::new(&forces.compression),
            muscles: forces.muscles().map(|muscle| ArrowPresenter::new(&muscle)),
        }
    }

    pub fn leg_type(&self) -> LegType {
        self.leg_type
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn parts(&self) -> &'static [Part] {
        parts(self.leg_type)
    }

    /// Points every presenter at the forces of `phase`.
    pub fn retarget(&mut self, phase: GaitPhase, phase_changed: bool) {
        for (slot, spec) in derive_active_forces(phase, self.leg_type).iter() {
            match spec {
                ForceSpec::Vector(force) => {
                    if let Some(presenter) = self.arrow_mut(slot) {
                        presenter.retarget(&force, phase_changed);
                    }
                }
                ForceSpec::Segment(segment) => self.compression.retarget(&segment),
            }
        }
    }

    pub fn tick(&mut self, elapsed_secs: f32) {
        self.ground_reaction.tick(elapsed_secs);
        self.compression.tick();
        for muscle in &mut self.muscles {
            muscle.tick(elapsed_secs);
        }
    }

    pub fn arrow(&self, slot: ForceSlot) -> Option<&ArrowPresenter> {
        match slot {
            ForceSlot::GroundReaction => Some(&self.ground_reaction),
            ForceSlot::Compression => None,
            ForceSlot::Muscle1 => Some(&self.muscles[0]),
            ForceSlot::Muscle2 => Some(&self.muscles[1]),
        }
    }

    fn arrow_mut(&mut self, slot: ForceSlot) -> Option<&mut ArrowPresenter> {
        match slot {
            ForceSlot::GroundReaction => Some(&mut self.ground_reaction),
            ForceSlot::Compression => None,
            ForceSlot::Muscle1 => Some(&mut self.muscles[0]),
            ForceSlot::Muscle2 => Some(&mut self.muscles[1]),
        }
    }

    pub fn compression(&self) -> &SegmentPresenter {
        &self.compression
    }

    pub fn is_converged(&self) -> bool {
        self.compression.is_converged()
            && self.ground_reaction.is_converged()
            && self.muscles.iter().all(ArrowPresenter::is_converged)
    }

    /// World-space box around the static parts.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let (min, max) = self.parts().iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), part| {
                let half = part.shape.half_extents();
                (min.min(part.center - half), max.max(part.center + half))
            },
        );
        (min + self.offset, max + self.offset)
    }

    pub fn frame(&self) -> LegFrame {
        LegFrame {
            leg_type: self.leg_type,
            offset: self.offset,
            parts: self.parts(),
            ground_reaction: self.ground_reaction.frame(),
            compression: self.compression.frame(),
            muscles: [self.muscles[0].frame(), self.muscles[1].frame()],
        }
    }
}

/// One leg as it should be drawn this frame, in leg-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LegFrame {
    pub leg_type: LegType,
    pub offset: Vec3,
    pub parts: &'static [Part],
    pub ground_reaction: ArrowFrame,
    pub compression: SegmentFrame,
    pub muscles: [ArrowFrame; 2],
}

impl LegFrame {
    pub fn arrows(&self) -> impl Iterator<Item = (ForceSlot, &ArrowFrame)> + '_ {
        [
            (ForceSlot::GroundReaction, &self.ground_reaction),
            (ForceSlot::Muscle1, &self.muscles[0]),
            (ForceSlot::Muscle2, &self.muscles[1]),
        ]
        .into_iter()
    }
}
