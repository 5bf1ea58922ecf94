use std::time::Duration;

use crate::duration::SpinDuration;
use crate::easing::Easing;

/// Surface that actually turns the wheel. The engine asks it to rotate and
/// is told (by whoever drives the frame loop) when the rotation is done.
pub trait RotationHost {
    fn animate_rotation_to(&mut self, angle_degrees: f64, duration: SpinDuration, easing: Easing);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Idle,
    Running,
    /// Reported exactly once, on the frame the rotation reaches its target
    Completed,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f64,
    to: f64,
    duration: Duration,
    easing: Easing,
    started_at: Option<Duration>,
}

/// Frame-driven rotation host used by the terminal UI. Tracks the angle the
/// wheel is currently drawn at.
#[derive(Debug, Clone, Default)]
pub struct WheelAnimator {
    displayed: f64,
    transition: Option<Transition>,
}

impl WheelAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Angle the wheel should be drawn at, in degrees
    pub fn displayed_angle(&self) -> f64 {
        self.displayed
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Move the animation to `now`. The first frame after a request marks
    /// the start of the transition.
    pub fn advance(&mut self, now: Duration) -> AnimationStatus {
        let Some(tr) = self.transition.as_mut() else {
            return AnimationStatus::Idle;
        };
        let started_at = *tr.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(started_at).as_secs_f64();
        let total = tr.duration.as_secs_f64();
        let progress = if total > 0.0 { elapsed / total } else { 1.0 };

        if progress >= 1.0 {
            self.displayed = tr.to;
            self.transition = None;
            return AnimationStatus::Completed;
        }

        self.displayed = tr.from + (tr.to - tr.from) * tr.easing.apply(progress);
        AnimationStatus::Running
    }
}

impl RotationHost for WheelAnimator {
    fn animate_rotation_to(&mut self, angle_degrees: f64, duration: SpinDuration, easing: Easing) {
        self.transition = Some(Transition {
            from: self.displayed,
            to: angle_degrees,
            duration: duration.as_duration(),
            easing,
            started_at: None,
        });
    }
}
