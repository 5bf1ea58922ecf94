use std::time::Duration;

use tracing::{debug, info, warn};

use crate::animator::RotationHost;
use crate::duration::SpinDuration;
use crate::easing::Easing;
use crate::error::WheelError;
use crate::rng::UniformSource;
use crate::wheel::{Category, RESULT_SET, SEGMENT_ANGLE, SEGMENT_COUNT};

/// Fewest full turns a spin makes before landing
pub const MIN_EXTRA_TURNS: u32 = 3;
/// Most full turns a spin makes before landing
pub const MAX_EXTRA_TURNS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinState {
    Idle,
    Spinning,
}

/// Receives the progress of a spin
pub trait SpinObserver {
    /// A number flashing by while the wheel turns
    fn on_intermediate_number(&mut self, value: u8);
    /// The final result. Fires exactly once per accepted spin.
    fn on_landed(&mut self, value: u8);
}

/// Invoked with the landed value once the spin that registered it finishes
pub type LandedCallback = Box<dyn FnOnce(u8)>;

/// Everything decided up front for one spin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub target_index: usize,
    pub extra_turns: u32,
    pub duration: SpinDuration,
    pub start_rotation: f64,
    pub final_rotation: f64,
}

impl SpinPlan {
    fn new(
        target_index: usize,
        extra_turns: u32,
        duration: SpinDuration,
        start_rotation: f64,
    ) -> Self {
        let travel = extra_turns as f64 * 360.0
            + target_index as f64 * SEGMENT_ANGLE
            + SEGMENT_ANGLE / 2.0;
        Self {
            target_index,
            extra_turns,
            duration,
            start_rotation,
            final_rotation: start_rotation - travel,
        }
    }

    pub fn result(&self) -> u8 {
        RESULT_SET[self.target_index]
    }

    /// Total degrees the wheel turns during this spin
    pub fn travel(&self) -> f64 {
        self.start_rotation - self.final_rotation
    }

    /// Number shown in the envelope at progress `t`. Interpolates its own
    /// virtual angle instead of reading the drawn one, so it only roughly
    /// tracks the wheel.
    pub fn virtual_index(&self, t: f64) -> usize {
        let virtual_angle = -(self.extra_turns as f64 * 360.0 * t
            + t * (self.target_index as f64 * SEGMENT_ANGLE));
        // `%` keeps the sign of the dividend; round half toward +inf
        let steps = ((virtual_angle % 360.0) / SEGMENT_ANGLE + 0.5).floor();
        (steps.abs() as usize) % SEGMENT_COUNT
    }
}

/// Result of a spin request that did not fail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinRequest {
    Accepted(SpinPlan),
    /// A spin was already in flight; nothing changed
    Ignored,
}

struct InFlight {
    plan: SpinPlan,
    started_at: Duration,
    last_frame: Duration,
    on_landed: Option<LandedCallback>,
}

/// Owns the spin state and the wheel's cumulative rotation. One per wheel.
pub struct SpinEngine<R: UniformSource> {
    rng: R,
    state: SpinState,
    cumulative: f64,
    category: Option<Category>,
    in_flight: Option<InFlight>,
}

impl<R: UniformSource> SpinEngine<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            state: SpinState::Idle,
            cumulative: 0.0,
            category: None,
            in_flight: None,
        }
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        self.state == SpinState::Spinning
    }

    pub fn cumulative_rotation(&self) -> f64 {
        self.cumulative
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn current_plan(&self) -> Option<&SpinPlan> {
        self.in_flight.as_ref().map(|f| &f.plan)
    }

    pub fn on_category_selected(&mut self, category: Category) {
        debug!(%category, "level selected");
        self.category = Some(category);
    }

    /// Decide the outcome of a new spin and ask `host` to animate toward it.
    pub fn request_spin<H: RotationHost>(
        &mut self,
        now: Duration,
        duration: SpinDuration,
        host: &mut H,
        on_landed: Option<LandedCallback>,
    ) -> Result<SpinRequest, WheelError> {
        if self.state == SpinState::Spinning {
            debug!("spin already in flight, ignoring request");
            return Ok(SpinRequest::Ignored);
        }
        if self.category.is_none() {
            return Err(WheelError::NoCategorySelected);
        }

        let target_index = self.rng.below(SEGMENT_COUNT as u32) as usize;
        let extra_turns = self.rng.between_inclusive(MIN_EXTRA_TURNS, MAX_EXTRA_TURNS);
        let plan = SpinPlan::new(target_index, extra_turns, duration, self.cumulative);

        debug!(
            target = plan.result(),
            extra_turns,
            duration_secs = duration.as_secs_f64(),
            from = plan.start_rotation,
            to = plan.final_rotation,
            "spin planned"
        );

        self.state = SpinState::Spinning;
        self.cumulative = plan.final_rotation;
        self.in_flight = Some(InFlight {
            plan,
            started_at: now,
            last_frame: now,
            on_landed,
        });
        host.animate_rotation_to(self.cumulative, duration, Easing::SPIN);

        Ok(SpinRequest::Accepted(plan))
    }

    /// Per-frame hook. Emits the number flashing by at `now`, if the spin is
    /// still within its duration.
    pub fn on_frame<O: SpinObserver>(&mut self, now: Duration, observer: &mut O) -> Option<u8> {
        let flight = self.in_flight.as_mut()?;
        let now = now.max(flight.last_frame);
        flight.last_frame = now;

        let elapsed = now.saturating_sub(flight.started_at).as_secs_f64();
        let t = elapsed / flight.plan.duration.as_secs_f64();
        if t >= 1.0 {
            return None;
        }

        let value = RESULT_SET[flight.plan.virtual_index(t)];
        observer.on_intermediate_number(value);
        Some(value)
    }

    /// The host finished rotating. Lands the spin in flight.
    pub fn on_animation_complete<O: SpinObserver>(&mut self, observer: &mut O) -> Option<u8> {
        let Some(flight) = self.in_flight.take() else {
            warn!("animation completed with no spin in flight");
            return None;
        };

        let value = flight.plan.result();
        self.state = SpinState::Idle;
        info!(result = value, rotation = self.cumulative, "wheel landed");

        observer.on_landed(value);
        if let Some(callback) = flight.on_landed {
            callback(value);
        }
        Some(value)
    }
}
