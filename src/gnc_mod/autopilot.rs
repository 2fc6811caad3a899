use log::{debug, info};

use crate::dynamics::state::{ControlState, FlightControls, VesselState};
use super::angle::{finite_or_zero, wrap_360};
use super::bank::{ControllerBank, Role, Stage};
use super::controller::Controller;
use super::fade::Fade;
use super::gains::BankGains;
use super::modes::{Axis, HrztMode, Mode, ModeChange, ModeSwitcher, SpeedRef, ThrottleMode, Transition, VertMode};
use super::pid::EASING_RATE;
use super::shaper::HeadingShift;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutopilotConfig {
    /// Seconds for a released surface to ramp to zero, and for outputs to
    /// ramp back in after a pause.
    pub fade_time: f64,
    /// Heading shift ramp constant (`increment += easing * dt * shift_rate`).
    pub shift_rate: f64,
    /// Heading shift snaps to its target inside this many degrees.
    pub shift_epsilon: f64,
    pub speed_reference: SpeedRef,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            fade_time: 1.0,
            shift_rate: EASING_RATE,
            shift_epsilon: 0.01,
            speed_reference: SpeedRef::True,
        }
    }
}

/// Which channels the autopilot currently owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputLocks {
    pub horizontal: bool,
    pub vertical: bool,
    pub throttle: bool,
}

// ---------------------------------------------------------------------------
// Autopilot
// ---------------------------------------------------------------------------

/// The full autopilot: controller bank, mode switcher, heading shift and
/// output fades, advanced once per physics tick by [`Autopilot::tick`].
#[derive(Debug, Clone)]
pub struct Autopilot {
    bank: ControllerBank,
    modes: ModeSwitcher,
    shift: HeadingShift,
    roll_fade: Fade,
    yaw_fade: Fade,
    pitch_fade: Fade,
    resume: Fade,
    paused: bool,
    config: AutopilotConfig,
    /// Surfaces commanded by the active cascades on the last tick.
    commanded: ControlState,
    /// Last snapshot seen by `tick`, used for captures between ticks.
    vessel: VesselState,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Self {
        Self::with_gains(config, &BankGains::default())
    }

    pub fn with_gains(config: AutopilotConfig, gains: &BankGains) -> Self {
        Self {
            bank: ControllerBank::with_gains(gains),
            modes: ModeSwitcher::new(config.speed_reference),
            shift: HeadingShift::new(config.shift_rate, config.shift_epsilon),
            roll_fade: Fade::new(),
            yaw_fade: Fade::new(),
            pitch_fade: Fade::new(),
            resume: Fade::new(),
            paused: false,
            config,
            commanded: ControlState::default(),
            vessel: VesselState::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Per-tick evaluation
    // -----------------------------------------------------------------------

    /// Advance the heading shift and fades, then run every active cascade
    /// upstream first. Surfaces are clamped to `[-1, 1]`, throttle to `[0, 1]`.
    pub fn tick(&mut self, vessel: &VesselState, dt: f64) -> FlightControls {
        let v = vessel.sanitized();
        let dt = finite_or_zero(dt).max(0.0);
        self.vessel = v.clone();

        if self.paused {
            return FlightControls::default();
        }

        let fade_time = self.config.fade_time;
        let gain = self.resume.poll_in(dt, fade_time);
        let ui = v.use_integral;
        let mut out = FlightControls::default();

        // --- Horizontal: roll and coordinated yaw ---
        if self.modes.is_active(Axis::Horizontal) {
            let mode = self.modes.horizontal().mode();
            if mode == HrztMode::Heading {
                let easing = self.bank[Role::HdgBank].easing();
                if let Some(heading) = self.shift.poll(easing, dt) {
                    self.bank[Role::HdgBank].update_setpoint(heading, false, 0.0);
                }
            }
            let roll = match mode {
                HrztMode::Bank => self.bank.cascade(&[Stage::new(Role::Aileron, v.bank)], ui, dt),
                HrztMode::Heading | HrztMode::HeadingNum => self.bank.cascade(
                    &[Stage::new(Role::HdgBank, v.heading), Stage::new(Role::Aileron, v.bank)],
                    ui,
                    dt,
                ),
            };
            let yaw = self.bank.cascade(
                &[Stage::new(Role::BankToYaw, v.bank), Stage::new(Role::Rudder, v.sideslip)],
                ui,
                dt,
            );
            self.commanded.roll = roll.clamp(-1.0, 1.0);
            self.commanded.yaw = yaw.clamp(-1.0, 1.0);
            out.roll = Some(self.commanded.roll * gain);
            out.yaw = Some(self.commanded.yaw * gain);
        } else {
            out.roll = self.roll_fade.poll_out(dt, fade_time);
            out.yaw = self.yaw_fade.poll_out(dt, fade_time);
        }

        // --- Vertical: elevator ---
        if self.modes.is_active(Axis::Vertical) {
            let inverted = v.is_inverted();
            let climb = Stage::new(Role::VertSpeed, v.vertical_speed).mirrored(inverted);
            let aoa = Stage::new(Role::Elevator, v.angle_of_attack);
            let pitch = match self.modes.vertical().mode() {
                VertMode::Pitch => self
                    .bank
                    .cascade(&[Stage::new(Role::Elevator, v.pitch).mirrored(inverted)], ui, dt),
                VertMode::VSpeed => self.bank.cascade(&[climb, aoa], ui, dt),
                VertMode::Altitude => {
                    self.bank.cascade(&[Stage::new(Role::Altitude, v.altitude), climb, aoa], ui, dt)
                }
                VertMode::RadarAltitude => self
                    .bank
                    .cascade(&[Stage::new(Role::Altitude, v.radar_altitude), climb, aoa], ui, dt),
            };
            self.commanded.pitch = pitch.clamp(-1.0, 1.0);
            out.pitch = Some(self.commanded.pitch * gain);
        } else {
            out.pitch = self.pitch_fade.poll_out(dt, fade_time);
        }

        // --- Throttle ---
        if self.modes.is_active(Axis::Throttle) {
            let accel = Stage::new(Role::Acceleration, v.acceleration);
            let throttle = match self.modes.throttle().mode() {
                ThrottleMode::Direct => self.modes.throttle().target(),
                ThrottleMode::Acceleration => self.bank.cascade(&[accel], ui, dt),
                ThrottleMode::Speed => {
                    let speed = self.modes.speed_ref().pick(&v);
                    self.bank.cascade(&[Stage::new(Role::Speed, speed), accel], ui, dt)
                }
            };
            self.commanded.throttle = throttle.clamp(0.0, 1.0);
            out.throttle = Some(self.commanded.throttle);
        }

        out
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Switch, engage, disengage or retarget one axis. See
    /// [`ModeSwitcher::set_mode`] for the target rules.
    pub fn set_mode(
        &mut self,
        mode: Mode,
        active: bool,
        set_target: bool,
        target: Option<f64>,
        vessel: &VesselState,
    ) -> ModeChange {
        let change = self.modes.set_mode(&mut self.bank, mode, active, set_target, target, vessel);
        let axis = change.axis;

        match change.transition {
            Transition::Deactivated => match axis {
                Axis::Horizontal => {
                    self.roll_fade.fade_out(self.commanded.roll);
                    self.yaw_fade.fade_out(self.commanded.yaw);
                }
                Axis::Vertical => self.pitch_fade.fade_out(self.commanded.pitch),
                Axis::Throttle => {}
            },
            Transition::Activated | Transition::Switched { .. } => {
                match axis {
                    Axis::Horizontal => {
                        self.roll_fade.cancel();
                        self.yaw_fade.cancel();
                    }
                    Axis::Vertical => self.pitch_fade.cancel(),
                    Axis::Throttle => {}
                }
                // engaging takes the controls back from a pause
                self.set_paused(false);
            }
            _ => {}
        }

        if axis == Axis::Horizontal {
            if active && mode == Mode::Horizontal(HrztMode::Heading) {
                if let Some(heading) = change.target {
                    let from = self.bank[Role::HdgBank].active_setpoint();
                    self.shift.start(from, heading);
                    if !self.shift.is_running() {
                        // already there: no poll will write the setpoint
                        self.bank[Role::HdgBank].update_setpoint(self.shift.target(), false, 0.0);
                    }
                }
            } else {
                self.shift.cancel();
            }
        }
        change
    }

    /// Set the target of an axis in its current mode.
    pub fn set_target(&mut self, axis: Axis, value: f64) -> ModeChange {
        let mode = self.modes.mode(axis);
        let active = self.modes.is_active(axis);
        let vessel = self.vessel.clone();
        self.set_mode(mode, active, true, Some(value), &vessel)
    }

    /// Move the current target by `delta` (rate input from keys or a
    /// joystick). Returns the new target.
    pub fn nudge(&mut self, axis: Axis, delta: f64) -> f64 {
        let delta = finite_or_zero(delta);
        let mode = self.modes.mode(axis);
        let target = match mode {
            Mode::Horizontal(HrztMode::Heading) => {
                if self.modes.is_active(axis) {
                    let from = self.bank[Role::HdgBank].active_setpoint();
                    self.shift.nudge(from, delta);
                    self.shift.target()
                } else {
                    wrap_360(self.modes.target(axis) + delta)
                }
            }
            Mode::Throttle(ThrottleMode::Direct) => (self.modes.target(axis) + delta).clamp(0.0, 1.0),
            _ => match mode.top() {
                Some(role) => {
                    self.bank[role].increase_setpoint(delta);
                    self.bank[role].target_setpoint()
                }
                None => self.modes.target(axis),
            },
        };
        self.modes.record_target(axis, target);
        debug!("{:?} target nudged to {}", axis, self.modes.target_display(axis));
        target
    }

    /// Pausing releases every channel and drops the integrals; resuming
    /// fades the outputs back in.
    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.bank.clear_all();
            self.roll_fade.cancel();
            self.yaw_fade.cancel();
            self.pitch_fade.cancel();
            info!("autopilot paused");
        } else {
            self.bank.skip_derivative(&Role::ALL);
            self.resume.fade_in();
            info!("autopilot resumed");
        }
    }

    pub fn set_speed_reference(&mut self, speed_ref: SpeedRef) {
        self.modes.set_speed_ref(speed_ref);
        self.config.speed_reference = speed_ref;
    }

    pub fn apply_gains(&mut self, gains: &BankGains) {
        self.bank.apply_gains(gains);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn bank(&self) -> &ControllerBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut ControllerBank {
        &mut self.bank
    }

    pub fn gains(&self) -> BankGains {
        self.bank.gains()
    }

    pub fn modes(&self) -> &ModeSwitcher {
        &self.modes
    }

    pub fn shift(&self) -> &HeadingShift {
        &self.shift
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    pub fn speed_reference(&self) -> SpeedRef {
        self.modes.speed_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn input_locks(&self) -> InputLocks {
        InputLocks {
            horizontal: self.modes.is_active(Axis::Horizontal),
            vertical: self.modes.is_active(Axis::Vertical),
            throttle: self.modes.is_active(Axis::Throttle),
        }
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(AutopilotConfig::default())
    }
}

impl Controller for Autopilot {
    fn control(&mut self, state: &VesselState, dt: f64) -> FlightControls {
        self.tick(state, dt)
    }

    fn reset(&mut self) {
        let vessel = self.vessel.clone();
        for axis in Axis::ALL {
            let mode = self.modes.mode(axis);
            self.set_mode(mode, false, false, None, &vessel);
        }
        self.bank.clear_all();
        self.shift.cancel();
    }

    fn name(&self) -> &str {
        "Autopilot"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
