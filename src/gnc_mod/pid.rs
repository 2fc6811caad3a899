use std::fmt;

use log::warn;

use super::angle::{angle_diff, finite_or_zero, wrap_360};
use super::bank::Role;
use super::gains::ControllerGains;

/// Smallest allowed error divisor.
pub const MIN_SCALAR: f64 = 0.01;
/// Ramp constant for setpoint easing (per tick: `increment += easing * dt * EASING_RATE`).
pub const EASING_RATE: f64 = 0.01;
/// Default weight of the previous derivative sample.
pub const DEFAULT_ROLLING_FACTOR: f64 = 0.5;

// ---------------------------------------------------------------------------
// Identity and strategy
// ---------------------------------------------------------------------------

/// Control channel of the stability augmentation controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Pitch,
    Roll,
    Yaw,
}

/// Which controller this is. Used for logging and diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerId {
    Bank(Role),
    Sas(Channel),
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerId::Bank(role) => write!(f, "{:?}", role),
            ControllerId::Sas(channel) => write!(f, "Sas{:?}", channel),
        }
    }
}

/// Where the derivative term gets its rate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerivativeSource {
    /// Difference of successive inputs over `dt`.
    #[default]
    FiniteDifference,
    /// A rate supplied by the caller (e.g. a gyro reading). Falls back to
    /// finite differences when no rate is passed.
    DirectRate,
}

// ---------------------------------------------------------------------------
// AxisController: one PID stage over a scalar channel
// ---------------------------------------------------------------------------

/// Single-axis PID controller.
///
/// Every value it stores is kept inside its configured range: the integral
/// sum stays in `[i_min, i_max]`, the last output in `[out_min, out_max]`,
/// and the scalar never drops below [`MIN_SCALAR`].
#[derive(Debug, Clone)]
pub struct AxisController {
    id: ControllerId,

    kp: f64,
    ki: f64,
    kd: f64,
    scalar: f64,
    easing: f64,
    out_min: f64,
    out_max: f64,
    i_min: f64,
    i_max: f64,
    in_min: f64,
    in_max: f64,
    rolling_factor: f64,
    derivative: DerivativeSource,

    heading: bool,
    invert_input: bool,
    invert_output: bool,
    skip_derivative: bool,
    active: bool,

    sum: f64,
    previous: f64,
    rolling_diff: f64,
    last_output: f64,
    target_setpoint: f64,
    active_setpoint: f64,
    increment: f64,
}

impl AxisController {
    pub fn new(id: ControllerId, gains: ControllerGains) -> Self {
        let mut c = Self {
            id,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            scalar: 1.0,
            easing: 1.0,
            out_min: -1.0,
            out_max: 1.0,
            i_min: -1.0,
            i_max: 1.0,
            in_min: f64::NEG_INFINITY,
            in_max: f64::INFINITY,
            rolling_factor: DEFAULT_ROLLING_FACTOR,
            derivative: DerivativeSource::FiniteDifference,
            heading: false,
            invert_input: false,
            invert_output: false,
            skip_derivative: false,
            active: false,
            sum: 0.0,
            previous: 0.0,
            rolling_diff: 0.0,
            last_output: 0.0,
            target_setpoint: 0.0,
            active_setpoint: 0.0,
            increment: 0.0,
        };
        c.set_gains(gains);
        c
    }

    /// Treat input and setpoint as compass headings (0–360 wraparound).
    pub fn with_heading(mut self) -> Self {
        self.heading = true;
        self
    }

    pub fn with_inverted_output(mut self, invert: bool) -> Self {
        self.invert_output = invert;
        self
    }

    pub fn with_inverted_input(mut self, invert: bool) -> Self {
        self.invert_input = invert;
        self
    }

    pub fn with_derivative(mut self, source: DerivativeSource) -> Self {
        self.derivative = source;
        self
    }

    // -----------------------------------------------------------------------
    // Per-tick evaluation
    // -----------------------------------------------------------------------

    /// Compute the bounded response for `input`. The derivative is taken from
    /// successive inputs.
    pub fn response(&mut self, input: f64, use_integral: bool, dt: f64) -> f64 {
        self.respond(input, None, use_integral, dt)
    }

    /// Compute the response using a directly measured rate for the
    /// derivative term (only honoured by `DerivativeSource::DirectRate`).
    pub fn response_with_rate(&mut self, input: f64, rate: f64, use_integral: bool, dt: f64) -> f64 {
        self.respond(input, Some(rate), use_integral, dt)
    }

    fn respond(&mut self, input: f64, rate: Option<f64>, use_integral: bool, dt: f64) -> f64 {
        let dt = finite_or_zero(dt).max(0.0);
        self.ease_setpoint(dt);

        let mut input = finite_or_zero(input).clamp(self.in_min, self.in_max);
        let mut rate = rate.map(finite_or_zero);
        if self.invert_input {
            input = -input;
            rate = rate.map(|r| -r);
        }

        let error = self.error(input);
        let p = self.proportional(error);
        let i = self.integral(error, use_integral, dt);
        let d = self.derivative(input, rate, dt);

        let mut out = p + i + d;
        if self.invert_output {
            out = -out;
        }
        self.last_output = finite_or_zero(out).clamp(self.out_min, self.out_max);
        self.last_output
    }

    fn error(&self, input: f64) -> f64 {
        if self.heading {
            angle_diff(self.active_setpoint, input)
        } else {
            input - self.active_setpoint
        }
    }

    fn proportional(&self, error: f64) -> f64 {
        if self.kp == 0.0 {
            return 0.0;
        }
        self.kp * error / self.scalar
    }

    fn integral(&mut self, error: f64, use_integral: bool, dt: f64) -> f64 {
        if self.ki == 0.0 || !use_integral {
            self.sum = 0.0;
            return 0.0;
        }
        self.sum += error * dt * self.ki / self.scalar;
        self.sum = self.sum.clamp(self.i_min, self.i_max);
        self.sum
    }

    fn derivative(&mut self, input: f64, rate: Option<f64>, dt: f64) -> f64 {
        if self.skip_derivative {
            self.skip_derivative = false;
            self.previous = input;
            return 0.0;
        }
        let difference = match (self.derivative, rate) {
            (DerivativeSource::DirectRate, Some(rate)) => rate,
            _ if dt > 0.0 => {
                let delta = if self.heading {
                    angle_diff(self.previous, input)
                } else {
                    input - self.previous
                };
                delta / dt
            }
            _ => 0.0,
        };
        self.rolling_diff =
            self.rolling_diff * self.rolling_factor + difference * (1.0 - self.rolling_factor);
        self.previous = input;
        self.rolling_diff * self.kd / self.scalar
    }

    /// Move the active setpoint toward the target by at most `increment`,
    /// where `increment` grows every tick the two differ.
    fn ease_setpoint(&mut self, dt: f64) {
        if self.active_setpoint == self.target_setpoint {
            return;
        }
        if self.easing <= 0.0 {
            self.active_setpoint = self.target_setpoint;
            return;
        }
        self.increment += self.easing * dt * EASING_RATE;
        let remaining = if self.heading {
            angle_diff(self.active_setpoint, self.target_setpoint)
        } else {
            self.target_setpoint - self.active_setpoint
        };
        if remaining.abs() <= self.increment {
            self.active_setpoint = self.target_setpoint;
            // next target change starts slow again
            self.increment = 0.0;
        } else {
            let next = self.active_setpoint + remaining.signum() * self.increment;
            self.active_setpoint = if self.heading { wrap_360(next) } else { next };
        }
    }

    // -----------------------------------------------------------------------
    // Integral management
    // -----------------------------------------------------------------------

    /// Drop the accumulated integral.
    pub fn clear(&mut self) {
        self.sum = 0.0;
    }

    /// Seed the integral from the last output so the next response
    /// continues from where this controller left off.
    pub fn preset(&mut self, invert: bool) {
        self.preset_to(self.last_output, invert);
    }

    /// Seed the integral from an explicit value.
    pub fn preset_to(&mut self, target: f64, invert: bool) {
        let sign = if invert { 1.0 } else { -1.0 };
        self.sum = (finite_or_zero(target) * sign).clamp(self.i_min, self.i_max);
    }

    /// Skip the derivative term on the next response only.
    pub fn skip_derivative(&mut self) {
        self.skip_derivative = true;
    }

    // -----------------------------------------------------------------------
    // Setpoints
    // -----------------------------------------------------------------------

    /// Commit a new target. With `smooth`, the active setpoint restarts at
    /// `smooth_start` and eases toward the target; otherwise it jumps.
    pub fn update_setpoint(&mut self, setpoint: f64, smooth: bool, smooth_start: f64) {
        self.target_setpoint = self.limit_setpoint(setpoint);
        self.active_setpoint = if smooth {
            self.limit_setpoint(smooth_start)
        } else {
            self.target_setpoint
        };
        self.increment = 0.0;
    }

    /// Shift the target by `delta`; the active setpoint eases after it.
    pub fn increase_setpoint(&mut self, delta: f64) {
        self.target_setpoint = self.limit_setpoint(self.target_setpoint + finite_or_zero(delta));
    }

    fn limit_setpoint(&self, value: f64) -> f64 {
        let value = finite_or_zero(value).clamp(self.in_min, self.in_max);
        if self.heading { wrap_360(value) } else { value }
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub fn gains(&self) -> ControllerGains {
        ControllerGains {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            out_min: self.out_min,
            out_max: self.out_max,
            i_min: self.i_min,
            i_max: self.i_max,
            scalar: self.scalar,
            easing: self.easing,
        }
    }

    /// Apply a full gain set. Reversed limit pairs are swapped and the
    /// scalar is floored rather than rejected.
    pub fn set_gains(&mut self, gains: ControllerGains) {
        self.kp = finite_or_zero(gains.kp);
        self.ki = finite_or_zero(gains.ki);
        self.kd = finite_or_zero(gains.kd);
        self.set_scalar(gains.scalar);
        self.set_easing(gains.easing);
        self.set_output_limits(gains.out_min, gains.out_max);
        self.set_integral_limits(gains.i_min, gains.i_max);
    }

    pub fn set_kp(&mut self, kp: f64) {
        self.kp = finite_or_zero(kp);
    }

    pub fn set_ki(&mut self, ki: f64) {
        self.ki = finite_or_zero(ki);
    }

    pub fn set_kd(&mut self, kd: f64) {
        self.kd = finite_or_zero(kd);
    }

    pub fn set_scalar(&mut self, scalar: f64) {
        // NaN.max() yields the other operand, so NaN floors too
        let floored = scalar.max(MIN_SCALAR);
        if floored != scalar {
            warn!("{}: scalar {} floored to {}", self.id, scalar, floored);
        }
        self.scalar = floored;
    }

    pub fn set_easing(&mut self, easing: f64) {
        self.easing = finite_or_zero(easing).max(0.0);
    }

    pub fn set_output_limits(&mut self, min: f64, max: f64) {
        let (min, max) = self.ordered("output", min, max);
        self.out_min = min;
        self.out_max = max;
        self.last_output = self.last_output.clamp(min, max);
    }

    pub fn set_integral_limits(&mut self, min: f64, max: f64) {
        let (min, max) = self.ordered("integral", min, max);
        self.i_min = min;
        self.i_max = max;
        self.sum = self.sum.clamp(min, max);
    }

    /// Bound the raw input (and any setpoint). Defaults to unbounded.
    pub fn set_input_limits(&mut self, min: f64, max: f64) {
        let min = if min.is_nan() { f64::NEG_INFINITY } else { min };
        let max = if max.is_nan() { f64::INFINITY } else { max };
        let (min, max) = self.ordered("input", min, max);
        self.in_min = min;
        self.in_max = max;
        self.target_setpoint = self.target_setpoint.clamp(min, max);
        self.active_setpoint = self.active_setpoint.clamp(min, max);
    }

    /// Weight of the previous derivative sample, clamped to `[0, 1]`.
    pub fn set_rolling_factor(&mut self, factor: f64) {
        self.rolling_factor = finite_or_zero(factor).clamp(0.0, 1.0);
    }

    pub fn set_invert_input(&mut self, invert: bool) {
        self.invert_input = invert;
    }

    pub fn set_invert_output(&mut self, invert: bool) {
        self.invert_output = invert;
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn ordered(&self, what: &str, a: f64, b: f64) -> (f64, f64) {
        let a = if a.is_nan() { 0.0 } else { a };
        let b = if b.is_nan() { 0.0 } else { b };
        if a > b {
            warn!("{}: {} limits reversed ({} > {}), swapping", self.id, what, a, b);
            (b, a)
        } else {
            (a, b)
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    pub fn previous(&self) -> f64 {
        self.previous
    }

    pub fn rolling_diff(&self) -> f64 {
        self.rolling_diff
    }

    pub fn target_setpoint(&self) -> f64 {
        self.target_setpoint
    }

    pub fn active_setpoint(&self) -> f64 {
        self.active_setpoint
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn scalar(&self) -> f64 {
        self.scalar
    }

    pub fn easing(&self) -> f64 {
        self.easing
    }

    pub fn input_limits(&self) -> (f64, f64) {
        (self.in_min, self.in_max)
    }

    pub fn rolling_factor(&self) -> f64 {
        self.rolling_factor
    }

    pub fn derivative_source(&self) -> DerivativeSource {
        self.derivative
    }

    pub fn is_heading(&self) -> bool {
        self.heading
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn inverts_input(&self) -> bool {
        self.invert_input
    }

    pub fn inverts_output(&self) -> bool {
        self.invert_output
    }

    pub fn skips_derivative(&self) -> bool {
        self.skip_derivative
    }
}
