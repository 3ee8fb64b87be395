use glam::Vec3;
use strum::IntoEnumIterator;

use crate::camera::Ray;
use crate::leg::{LegAssembly, LegFrame};
use crate::registry::{GaitPhase, LegType};

pub const HUMAN_OFFSET: Vec3 = Vec3::new(-1.5, 1.0, 0.0);
pub const PROSTHETIC_OFFSET: Vec3 = Vec3::new(1.5, 1.0, 0.0);
pub const GROUND_LEVEL: f32 = -2.1;
pub const GROUND_SIZE: f32 = 20.0;

pub fn offset(leg_type: LegType) -> Vec3 {
    match leg_type {
        LegType::Human => HUMAN_OFFSET,
        LegType::Prosthetic => PROSTHETIC_OFFSET,
    }
}

/// Both legs side by side, driven by one phase.
#[derive(Debug, Clone)]
pub struct Stage {
    legs: Vec<LegAssembly>,
}

impl Stage {
    pub fn new(phase: GaitPhase) -> Self {
        let legs = LegType::iter()
            .map(|leg_type| LegAssembly::new(leg_type, offset(leg_type), phase))
            .collect();
        Self { legs }
    }

    pub fn retarget(&mut self, phase: GaitPhase, phase_changed: bool) {
        for leg in &mut self.legs {
            leg.retarget(phase, phase_changed);
        }
    }

    pub fn tick(&mut self, elapsed_secs: f32) {
        for leg in &mut self.legs {
            leg.tick(elapsed_secs);
        }
    }

    /// Nothing left to animate, so redraws can stop.
    pub fn is_settled(&self) -> bool {
        self.legs.iter().all(LegAssembly::is_converged)
    }

    pub fn legs(&self) -> &[LegAssembly] {
        &self.legs
    }

    pub fn leg(&self, leg_type: LegType) -> Option<&LegAssembly> {
        self.legs.iter().find(|leg| leg.leg_type() == leg_type)
    }

    /// The nearest leg whose bounds the ray passes through.
    pub fn leg_under(&self, ray: &Ray) -> Option<LegType> {
        self.legs
            .iter()
            .filter_map(|leg| {
                let (min, max) = leg.bounds();
                ray.hit_box(min, max).map(|distance| (distance, leg.leg_type()))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, leg_type)| leg_type)
    }

    /// World point the hover label hangs from: the top of the leg's bounds.
    pub fn label_anchor(&self, leg_type: LegType) -> Option<Vec3> {
        self.leg(leg_type).map(|leg| {
            let (min, max) = leg.bounds();
            Vec3::new((min.x + max.x) / 2.0, max.y, (min.z + max.z) / 2.0)
        })
    }

        pub fn frame(&self) -> StageFrame {
        StageFrame {
            legs: self.legs.iter().map(LegAssembly::frame).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageFrame {
    pub legs: Vec<LegFrame>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(stage: &mut Stage) -> usize {
        let mut ticks = 0;
        while !stage.is_settled() {
            stage.tick(1.0 / 60.0);
            ticks += 1;
            assert!(ticks < 1000, "never settled");
        }
        ticks
    }

    #[test]
    fn legs_sit_either_side_of_center() {
        let stage = Stage::new(GaitPhase::StaticStand);
        let frame = stage.frame();
        assert_eq!(frame.legs.len(), 2);
        assert_eq!(frame.legs[0].leg_type, LegType::Human);
        assert_eq!(frame.legs[0].offset, HUMAN_OFFSET);
        assert_eq!(frame.legs[1].leg_type, LegType::Prosthetic);
        assert_eq!(frame.legs[1].offset, PROSTHETIC_OFFSET);
    }

    #[test]
    fn feet_rest_on_the_ground() {
        let stage = Stage::new(GaitPhase::StaticStand);
        for leg in stage.legs() {
            let (min, _) = leg.bounds();
            assert!((min.y - (GROUND_LEVEL + 1.0)).abs() < 1e-5);
        }
    }

    #[test]
    fn settles_after_retarget() {
        let mut stage = Stage::new(GaitPhase::StaticStand);
        settle(&mut stage);
        stage.retarget(GaitPhase::Midstance, true);
        assert!(!stage.is_settled());
        assert!(settle(&mut stage) > 1);
        let human = stage.leg(LegType::Human).map(LegAssembly::frame);
        let ground_reaction = human.map(|leg| leg.ground_reaction.axial_scale);
        assert!(ground_reaction.is_some_and(|scale| scale > 0.0));
    }

    #[test]
    fn ray_picks_the_leg_it_crosses() {
        let stage = Stage::new(GaitPhase::StaticStand);
        let toward = |x: f32| Ray {
            origin: Vec3::new(x, 1.0, 10.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(stage.leg_under(&toward(-1.5)), Some(LegType::Human));
        assert_eq!(stage.leg_under(&toward(1.5)), Some(LegType::Prosthetic));
        assert_eq!(stage.leg_under(&toward(0.0)), None);
    }

    #[test]
    fn labels_hang_above_each_leg() {
        let stage = Stage::new(GaitPhase::StaticStand);
        for leg in stage.legs() {
            let anchor = stage.label_anchor(leg.leg_type()).expect("anchor");
            let (_, max) = leg.bounds();
            assert!((anchor.x - leg.offset().x).abs() < 1e-5);
            assert!((anchor.y - max.y).abs() < 1e-5);
        }
        assert!((stage.label_anchor(LegType::Human).map_or(0.0, |anchor| anchor.y) - 3.0).abs() < 1e-5);
    }
}
