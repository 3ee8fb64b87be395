//! Smooths the per-phase force targets into continuous motion.
//!
//! Every frame each presenter moves its pose a fixed fraction of the way to
//! its target, so convergence is exponential in frame count rather than a
//! fixed-length tween. A phase change also starts a short emphasis pulse on
//! every arrow that is visible in the new phase.

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::forces::{CompressionSegment, ForceVector};
use crate::registry::BODY_WEIGHT_FORCE;

pub const STEP_FRACTION: f32 = 0.1;
/// Magnitudes at or below this are drawn as absent.
pub const VISIBILITY_THRESHOLD: f32 = 0.01;
pub const PULSE_START: f32 = 1.0;
/// Pulse units per second; with `PULSE_START` a pulse lasts half a second.
pub const PULSE_DECAY_RATE: f32 = 2.0;
pub const BASE_EMPHASIS: f32 = 0.5;
pub const PULSE_GAIN: f32 = 2.0;
pub const MIN_THICKNESS: f32 = 0.04;
pub const MAX_THICKNESS: f32 = 0.09;
pub const REFERENCE_MAGNITUDE: f32 = BODY_WEIGHT_FORCE * 1.2;
pub const HEAD_LENGTH_FACTOR: f32 = 4.0;
pub const HEAD_WIDTH_FACTOR: f32 = 2.5;
pub const CONVERGENCE_EPSILON: f32 = 1e-3;

fn lerp(from: f32, to: f32, fraction: f32) -> f32 {
    from + (to - from) * fraction
}

/// Arrow shaft radius for a magnitude.
pub fn thickness(magnitude: f32) -> f32 {
    lerp(
        MIN_THICKNESS,
        MAX_THICKNESS,
        (magnitude / REFERENCE_MAGNITUDE).clamp(0.0, 1.0),
    )
}

/// Smallest rotation taking `+y` onto the direction, `+y` itself when the
/// direction is undefined.
pub fn orientation(direction: Option<Vec3>) -> Quat {
    let direction = direction
        .and_then(|direction| direction.try_normalize())
        .unwrap_or(Vec3::Y);
    Quat::from_rotation_arc(Vec3::Y, direction)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPose {
    pub position: Vec3,
    pub orientation: Quat,
    pub axial_scale: f32,
    pub opacity: f32,
}

impl ArrowPose {
    pub fn approx_eq(&self, other: &ArrowPose, epsilon: f32) -> bool {
        self.position.distance(other.position) <= epsilon
            && (self.axial_scale - other.axial_scale).abs() <= epsilon
            && (self.opacity - other.opacity).abs() <= epsilon
            && self.orientation.dot(other.orientation).abs() >= 1.0 - epsilon * epsilon
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowTarget {
    pub pose: ArrowPose,
    pub thickness: f32,
    pub magnitude: f32,
}

impl ArrowTarget {
    pub fn from_force(force: &ForceVector) -> Self {
        let visible = force.magnitude > VISIBILITY_THRESHOLD;
        Self {
            pose: ArrowPose {
                position: force.origin,
                orientation: orientation(force.direction),
                axial_scale: if visible { force.magnitude } else { 0.0 },
                opacity: if visible { 1.0 } else { 0.0 },
            },
            thickness: thickness(force.magnitude),
            magnitude: force.magnitude,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.magnitude > VISIBILITY_THRESHOLD
    }
}

/// One interpolation step. Position, scale and opacity move linearly,
/// orientation along the shorter great arc.
pub fn step_pose(current: &ArrowPose, target: &ArrowPose, fraction: f32) -> ArrowPose {
    ArrowPose {
        position: current.position.lerp(target.position, fraction),
        orientation: current.orientation.slerp(target.orientation, fraction).normalize(),
        axial_scale: lerp(current.axial_scale, target.axial_scale, fraction).max(0.0),
        opacity: lerp(current.opacity, target.opacity, fraction).clamp(0.0, 1.0),
    }
}

/// Countdown behind the emphasis flash.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pulse {
    remaining: f32,
}

impl Pulse {
    pub fn trigger(&mut self) {
        self.remaining = PULSE_START;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Emphasis for this frame, or `None` once the pulse has run out.
    /// Rises from the base and falls back along half a sine wave.
    pub fn advance(&mut self, elapsed_secs: f32) -> Option<f32> {
        if !self.is_active() {
            return None;
        }
        let progress = 1.0 - self.remaining / PULSE_START;
        self.remaining = (self.remaining - elapsed_secs * PULSE_DECAY_RATE).max(0.0);
        Some(BASE_EMPHASIS + (progress * PI).sin() * PULSE_GAIN)
    }
}

/// What a renderer needs to draw one arrow this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowFrame {
    pub position: Vec3,
    pub orientation: Quat,
    pub axial_scale: f32,
    pub thickness: f32,
    pub head_length: f32,
    pub head_width: f32,
    pub opacity: f32,
    pub emphasis: f32,
}

impl ArrowFrame {
    pub fn direction(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    pub fn tip(&self) -> Vec3 {
        self.position + self.direction() * self.axial_scale
    }
}

#[derive(Debug, Clone)]
pub struct ArrowPresenter {
    pose: ArrowPose,
    emphasis: f32,
    pulse: Pulse,
    target: ArrowTarget,
}

impl ArrowPresenter {
    /// Starts collapsed and transparent at the target, so the first frames
    /// grow the arrow in place.
    pub fn new(force: &ForceVector) -> Self {
        let target = ArrowTarget::from_force(force);
        Self {
            pose: ArrowPose {
                axial_scale: 0.0,
                opacity: 0.0,
                ..target.pose
            },
            emphasis: BASE_EMPHASIS,
            pulse: Pulse::default(),
            target,
        }
    }

    /// Aims at a new force. The pose is left alone; only the next ticks move it.
    pub fn retarget(&mut self, force: &ForceVector, phase_changed: bool) {
        self.target = ArrowTarget::from_force(force);
        if phase_changed && self.target.is_visible() {
            self.pulse.trigger();
        }
    }

    pub fn tick(&mut self, elapsed_secs: f32) {
        self.pose = step_pose(&self.pose, &self.target.pose, STEP_FRACTION);
        self.emphasis = match self.pulse.advance(elapsed_secs) {
            Some(emphasis) => emphasis,
            None => lerp(self.emphasis, BASE_EMPHASIS, STEP_FRACTION),
        };
    }

    pub fn pose(&self) -> &ArrowPose {
        &self.pose
    }

    pub fn target(&self) -> &ArrowTarget {
        &self.target
    }

    pub fn emphasis(&self) -> f32 {
        self.emphasis
    }

    pub fn pulse_remaining(&self) -> f32 {
        self.pulse.remaining()
    }

    pub fn is_converged(&self) -> bool {
        !self.pulse.is_active()
            && (self.emphasis - BASE_EMPHASIS).abs() <= CONVERGENCE_EPSILON
            && self.pose.approx_eq(&self.target.pose, CONVERGENCE_EPSILON)
    }

    pub fn frame(&self) -> ArrowFrame {
        let thickness = self.target.thickness;
        ArrowFrame {
            position: self.pose.position,
            orientation: self.pose.orientation,
            axial_scale: self.pose.axial_scale,
            thickness,
            head_length: thickness * HEAD_LENGTH_FACTOR,
            head_width: thickness * HEAD_WIDTH_FACTOR,
            opacity: self.pose.opacity,
            emphasis: self.emphasis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFrame {
    pub start: Vec3,
    pub end: Vec3,
    pub opacity: f32,
}

/// Compression lines slide their endpoints and fade; they do not pulse.
#[derive(Debug, Clone)]
pub struct SegmentPresenter {
    current: SegmentFrame,
    target: SegmentFrame,
}

impl SegmentPresenter {
    pub fn new(segment: &CompressionSegment) -> Self {
        let target = Self::target_of(segment);
        Self {
            current: SegmentFrame {
                opacity: 0.0,
                ..target
            },
            target,
        }
    }

    fn target_of(segment: &CompressionSegment) -> SegmentFrame {
        SegmentFrame {
            start: segment.start,
            end: segment.end,
            opacity: if segment.visible { 1.0 } else { 0.0 },
        }
    }

    pub fn retarget(&mut self, segment: &CompressionSegment) {
        self.target = Self::target_of(segment);
    }

    pub fn tick(&mut self) {
        let SegmentFrame { start, end, opacity } = self.current;
        self.current = SegmentFrame {
            start: start.lerp(self.target.start, STEP_FRACTION),
            end: end.lerp(self.target.end, STEP_FRACTION),
            opacity: lerp(opacity, self.target.opacity, STEP_FRACTION).clamp(0.0, 1.0),
        };
    }

    pub fn is_converged(&self) -> bool {
        self.current.start.distance(self.target.start) <= CONVERGENCE_EPSILON
            && self.current.end.distance(self.target.end) <= CONVERGENCE_EPSILON
            && (self.current.opacity - self.target.opacity).abs() <= CONVERGENCE_EPSILON
    }

    pub fn frame(&self) -> SegmentFrame {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FRAME: f32 = 1.0 / 60.0;

    fn settle(presenter: &mut ArrowPresenter, frames: usize) {
        for _ in 0..frames {
            presenter.tick(FRAME);
        }
    }

    #[test]
    fn thickness_spans_its_bounds() {
        assert_relative_eq!(thickness(0.0), MIN_THICKNESS, epsilon = 1e-6);
        assert_relative_eq!(thickness(REFERENCE_MAGNITUDE), MAX_THICKNESS, epsilon = 1e-6);
        assert_relative_eq!(thickness(REFERENCE_MAGNITUDE * 3.0), MAX_THICKNESS, epsilon = 1e-6);
        assert_relative_eq!(thickness(REFERENCE_MAGNITUDE / 2.0), 0.065, epsilon = 1e-6);
    }

    #[test]
    fn undefined_direction_points_up() {
        assert_eq!(orientation(None), Quat::IDENTITY);
        assert_eq!(orientation(Some(Vec3::ZERO)), Quat::IDENTITY);
        let down = orientation(Some(Vec3::NEG_Y)) * Vec3::Y;
        assert_relative_eq!(down.y, -1.0, epsilon = 1e-5);
        let tilted = Vec3::new(0.0, 1.0, -0.2).normalize();
        let rotated = orientation(Some(Vec3::new(0.0, 1.0, -0.2))) * Vec3::Y;
        assert!(rotated.distance(tilted) < 1e-5);
    }

    #[test]
    fn converges_from_any_pose() {
        let force = ForceVector::new(Vec3::new(0.0, -2.0, 0.4), Vec3::new(0.0, 1.0, -0.2), 1.7);
        let mut presenter = ArrowPresenter::new(&ForceVector::new(Vec3::new(5.0, 9.0, -3.0), Vec3::NEG_X, 0.3));
        settle(&mut presenter, 10);
        presenter.retarget(&force, true);
        let mut frames = 0;
        while !presenter.is_converged() {
            presenter.tick(FRAME);
            frames += 1;
            assert!(frames < 500, "no convergence after {frames} frames");
        }
        assert!(presenter.pose().approx_eq(&ArrowTarget::from_force(&force).pose, CONVERGENCE_EPSILON));
    }

    #[test]
    fn fade_out_is_monotonic_and_never_negative() {
        let mut presenter = ArrowPresenter::new(&ForceVector::new(Vec3::ZERO, Vec3::Y, 1.2));
        settle(&mut presenter, 200);
        presenter.retarget(&ForceVector::inactive(), true);
        let mut previous = *presenter.pose();
        for _ in 0..300 {
            presenter.tick(FRAME);
            let pose = *presenter.pose();
            assert!(pose.opacity <= previous.opacity && pose.opacity >= 0.0);
            assert!(pose.axial_scale <= previous.axial_scale && pose.axial_scale >= 0.0);
            previous = pose;
        }
        assert!(previous.opacity < CONVERGENCE_EPSILON);
        assert!(previous.axial_scale < CONVERGENCE_EPSILON);
    }

    #[test]
    fn omitted_and_zero_forces_fade_alike() {
        let visible = ForceVector::new(Vec3::ZERO, Vec3::Y, 0.8);
        let mut omitted = ArrowPresenter::new(&visible);
        let mut zeroed = ArrowPresenter::new(&visible);
        settle(&mut omitted, 100);
        settle(&mut zeroed, 100);
        omitted.retarget(&ForceVector::inactive(), false);
        zeroed.retarget(&ForceVector::new(Vec3::ZERO, Vec3::Y, 0.0), false);
        for _ in 0..30 {
            omitted.tick(FRAME);
            zeroed.tick(FRAME);
            assert_relative_eq!(omitted.pose().opacity, zeroed.pose().opacity);
            assert_relative_eq!(omitted.pose().axial_scale, zeroed.pose().axial_scale);
        }
    }

    #[test]
    fn pulse_only_on_phase_change_of_a_visible_force() {
        let visible = ForceVector::new(Vec3::ZERO, Vec3::Y, 0.8);
        let mut presenter = ArrowPresenter::new(&visible);
        presenter.retarget(&visible, false);
        assert_eq!(presenter.pulse_remaining(), 0.0);
        presenter.retarget(&visible, true);
        assert_eq!(presenter.pulse_remaining(), PULSE_START);

        let mut hidden = ArrowPresenter::new(&ForceVector::inactive());
        hidden.retarget(&ForceVector::inactive(), true);
        assert_eq!(hidden.pulse_remaining(), 0.0);
        hidden.retarget(&ForceVector::new(Vec3::ZERO, Vec3::Y, VISIBILITY_THRESHOLD), true);
        assert_eq!(hidden.pulse_remaining(), 0.0);
    }

    #[test]
    fn pulse_rises_then_falls_and_lasts_half_a_second() {
        let visible = ForceVector::new(Vec3::ZERO, Vec3::Y, 0.8);
        let mut presenter = ArrowPresenter::new(&visible);
        presenter.retarget(&visible, true);
        let mut emphases = Vec::new();
        let mut elapsed = 0.0;
        while presenter.pulse_remaining() > 0.0 {
            presenter.tick(0.0625);
            elapsed += 0.0625;
            emphases.push(presenter.emphasis());
        }
        assert_relative_eq!(elapsed, 0.5);
        let peak = emphases.iter().cloned().fold(f32::MIN, f32::max);
        assert!(peak > BASE_EMPHASIS + PULSE_GAIN * 0.9);
        assert_relative_eq!(emphases[0], BASE_EMPHASIS);
        assert!(emphases.last().unwrap() < &peak);
        settle(&mut presenter, 200);
        assert_relative_eq!(presenter.emphasis(), BASE_EMPHASIS, epsilon = 1e-3);
    }

    #[test]
    fn head_follows_thickness() {
        let presenter = ArrowPresenter::new(&ForceVector::new(Vec3::ZERO, Vec3::Y, REFERENCE_MAGNITUDE));
        let frame = presenter.frame();
        assert_relative_eq!(frame.thickness, MAX_THICKNESS, epsilon = 1e-6);
        assert_relative_eq!(frame.head_length, frame.thickness * HEAD_LENGTH_FACTOR);
        assert_relative_eq!(frame.head_width, frame.thickness * HEAD_WIDTH_FACTOR);
        assert_eq!(frame.axial_scale, 0.0);
    }

    #[test]
    fn segment_fades_in_and_slides() {
        let mut segment = SegmentPresenter::new(&CompressionSegment::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, 1.5, 0.0)));
        assert_eq!(segment.frame().opacity, 0.0);
        segment.retarget(&CompressionSegment::new(Vec3::new(0.0, -2.0, 0.4), Vec3::new(0.0, 1.0, 0.0)));
        for _ in 0..200 {
            segment.tick();
        }
        assert!(segment.is_converged());
        assert_relative_eq!(segment.frame().opacity, 1.0, epsilon = 1e-3);
        segment.retarget(&CompressionSegment {
            visible: false,
            ..CompressionSegment::new(Vec3::ZERO, Vec3::ZERO)
        });
        let mut previous = segment.frame().opacity;
        for _ in 0..200 {
            segment.tick();
            assert!(segment.frame().opacity <= previous);
            previous = segment.frame().opacity;
        }
        assert!(previous < CONVERGENCE_EPSILON);
    }
}
