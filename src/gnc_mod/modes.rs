use log::{debug, info};

use crate::dynamics::state::VesselState;
use super::angle::{finite_or_zero, wrap_360};
use super::bank::{ControllerBank, Role};

// ---------------------------------------------------------------------------
// Axes and modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
    Throttle,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Horizontal, Axis::Vertical, Axis::Throttle];

    /// Every controller owned by this axis, active chain or not.
    pub fn roles(self) -> &'static [Role] {
        match self {
            Axis::Horizontal => &[Role::HdgBank, Role::BankToYaw, Role::Aileron, Role::Rudder],
            Axis::Vertical => &[Role::Altitude, Role::VertSpeed, Role::Elevator],
            Axis::Throttle => &[Role::Speed, Role::Acceleration],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HrztMode {
    /// Hold a bank angle.
    Bank,
    /// Fly toward a heading reached through an eased shift.
    Heading,
    /// Hold a numerically entered heading.
    HeadingNum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertMode {
    Pitch,
    VSpeed,
    Altitude,
    RadarAltitude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleMode {
    /// Throttle setting is the target itself.
    Direct,
    Acceleration,
    Speed,
}

/// A mode on one of the three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Horizontal(HrztMode),
    Vertical(VertMode),
    Throttle(ThrottleMode),
}

impl Mode {
    pub fn axis(self) -> Axis {
        match self {
            Mode::Horizontal(_) => Axis::Horizontal,
            Mode::Vertical(_) => Axis::Vertical,
            Mode::Throttle(_) => Axis::Throttle,
        }
    }

    /// Controller whose setpoint is the pilot's target, if any.
    pub fn top(self) -> Option<Role> {
        match self {
            Mode::Horizontal(HrztMode::Bank) => Some(Role::Aileron),
            Mode::Horizontal(_) => Some(Role::HdgBank),
            Mode::Vertical(VertMode::Pitch) => Some(Role::Elevator),
            Mode::Vertical(VertMode::VSpeed) => Some(Role::VertSpeed),
            Mode::Vertical(_) => Some(Role::Altitude),
            Mode::Throttle(ThrottleMode::Direct) => None,
            Mode::Throttle(ThrottleMode::Acceleration) => Some(Role::Acceleration),
            Mode::Throttle(ThrottleMode::Speed) => Some(Role::Speed),
        }
    }

    /// The vessel's current value of the quantity this mode holds.
    pub fn capture(self, vessel: &VesselState, speed_ref: SpeedRef) -> f64 {
        match self {
            Mode::Horizontal(HrztMode::Bank) => vessel.bank,
            Mode::Horizontal(_) => vessel.heading,
            Mode::Vertical(VertMode::Pitch) => vessel.pitch,
            Mode::Vertical(VertMode::VSpeed) => vessel.vertical_speed,
            Mode::Vertical(VertMode::Altitude) => vessel.altitude,
            Mode::Vertical(VertMode::RadarAltitude) => vessel.radar_altitude,
            Mode::Throttle(ThrottleMode::Direct) => vessel.controls.throttle,
            Mode::Throttle(ThrottleMode::Acceleration) => vessel.acceleration,
            Mode::Throttle(ThrottleMode::Speed) => speed_ref.pick(vessel),
        }
    }

    pub fn format_target(self, value: f64) -> String {
        match self {
            Mode::Horizontal(_) | Mode::Vertical(VertMode::Pitch) => format!("{:.1}°", value),
            Mode::Vertical(VertMode::VSpeed) => format!("{:.1} m/s", value),
            Mode::Vertical(VertMode::Altitude) => format!("{:.0} m", value),
            Mode::Vertical(VertMode::RadarAltitude) => format!("{:.0} m AGL", value),
            Mode::Throttle(ThrottleMode::Direct) => format!("{:.0}%", value * 100.0),
            Mode::Throttle(ThrottleMode::Acceleration) => format!("{:.2} m/s²", value),
            Mode::Throttle(ThrottleMode::Speed) => format!("{:.1} m/s", value),
        }
    }
}

/// Which airspeed the speed hold tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedRef {
    #[default]
    True,
    Indicated,
}

impl SpeedRef {
    pub fn pick(self, vessel: &VesselState) -> f64 {
        match self {
            SpeedRef::True => vessel.true_airspeed,
            SpeedRef::Indicated => vessel.indicated_airspeed,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-axis state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ModeState<M> {
    mode: M,
    active: bool,
    was_active: bool,
    target: f64,
    target_valid: bool,
    target_display: String,
}

impl<M: Copy> ModeState<M> {
    fn new(mode: M) -> Self {
        Self {
            mode,
            active: false,
            was_active: false,
            target: 0.0,
            target_valid: false,
            target_display: String::new(),
        }
    }

    pub fn mode(&self) -> M {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Active flag before the last `set_mode` call on this axis.
    pub fn was_active(&self) -> bool {
        self.was_active
    }

    /// Last committed target (top-of-chain setpoint or direct throttle).
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn target_display(&self) -> &str {
        &self.target_display
    }
}

/// What a `set_mode` call did to its axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Activated,
    Deactivated,
    Switched { from: Mode },
    Retargeted,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeChange {
    pub axis: Axis,
    pub transition: Transition,
    /// Target committed by this call, if any.
    pub target: Option<f64>,
}

// ---------------------------------------------------------------------------
// ModeSwitcher
// ---------------------------------------------------------------------------

/// Tracks the mode of each axis and performs the controller bookkeeping
/// (integral preload, clearing, derivative skip, target capture) that keeps
/// transitions free of output jumps.
#[derive(Debug, Clone)]
pub struct ModeSwitcher {
    horizontal: ModeState<HrztMode>,
    vertical: ModeState<VertMode>,
    throttle: ModeState<ThrottleMode>,
    speed_ref: SpeedRef,
}

impl ModeSwitcher {
    pub fn new(speed_ref: SpeedRef) -> Self {
        Self {
            horizontal: ModeState::new(HrztMode::Bank),
            vertical: ModeState::new(VertMode::Pitch),
            throttle: ModeState::new(ThrottleMode::Direct),
            speed_ref,
        }
    }

    pub fn horizontal(&self) -> &ModeState<HrztMode> {
        &self.horizontal
    }

    pub fn vertical(&self) -> &ModeState<VertMode> {
        &self.vertical
    }

    pub fn throttle(&self) -> &ModeState<ThrottleMode> {
        &self.throttle
    }

    pub fn speed_ref(&self) -> SpeedRef {
        self.speed_ref
    }

    pub fn set_speed_ref(&mut self, speed_ref: SpeedRef) {
        self.speed_ref = speed_ref;
    }

    /// Current mode of `axis`.
    pub fn mode(&self, axis: Axis) -> Mode {
        match axis {
            Axis::Horizontal => Mode::Horizontal(self.horizontal.mode),
            Axis::Vertical => Mode::Vertical(self.vertical.mode),
            Axis::Throttle => Mode::Throttle(self.throttle.mode),
        }
    }

    pub fn is_active(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.horizontal.active,
            Axis::Vertical => self.vertical.active,
            Axis::Throttle => self.throttle.active,
        }
    }

    pub fn target(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.horizontal.target,
            Axis::Vertical => self.vertical.target,
            Axis::Throttle => self.throttle.target,
        }
    }

    pub fn target_display(&self, axis: Axis) -> &str {
        match axis {
            Axis::Horizontal => &self.horizontal.target_display,
            Axis::Vertical => &self.vertical.target_display,
            Axis::Throttle => &self.throttle.target_display,
        }
    }

    /// Change mode, active flag and/or target of one axis.
    ///
    /// With `set_target`, the top-of-chain target becomes `target`, or the
    /// vessel's current value when `target` is `None`. Entering a mode
    /// without `set_target` reuses the stored target of that mode, or
    /// captures the current value if there is none.
    pub fn set_mode(
        &mut self,
        bank: &mut ControllerBank,
        mode: Mode,
        active: bool,
        set_target: bool,
        target: Option<f64>,
        vessel: &VesselState,
    ) -> ModeChange {
        let vessel = vessel.sanitized();
        let axis = mode.axis();
        let old_mode = self.mode(axis);
        let was_active = self.is_active(axis);

        bank.skip_derivative(axis.roles());

        let transition = match (was_active, active) {
            (true, false) => Transition::Deactivated,
            (false, true) => Transition::Activated,
            (true, true) if old_mode != mode => Transition::Switched { from: old_mode },
            _ if set_target => Transition::Retargeted,
            _ => Transition::Unchanged,
        };

        let from = match transition {
            Transition::Switched { from } => Some(from),
            _ => None,
        };
        match transition {
            Transition::Deactivated => {
                bank.clear(axis.roles());
                for &role in axis.roles() {
                    bank[role].set_active(false);
                }
                info!("{:?} axis disengaged", axis);
            }
            Transition::Activated | Transition::Switched { .. } => {
                match mode {
                    Mode::Horizontal(m) => preload_horizontal(bank, m, from.and_then(as_horizontal), &vessel),
                    Mode::Vertical(m) => preload_vertical(bank, m, from.and_then(as_vertical), &vessel),
                    Mode::Throttle(m) => preload_throttle(bank, m, from.and_then(as_throttle), &vessel),
                }
                for &role in axis.roles() {
                    bank[role].set_active(false);
                }
                for &role in chain_roles(mode) {
                    bank[role].set_active(true);
                }
                info!("{:?} axis engaged in {:?}", axis, mode);
            }
            _ => {}
        }

        let entering = matches!(transition, Transition::Activated | Transition::Switched { .. });
        // heading chain already running: ease on from where it is
        let continuing = was_active && same_heading_chain(old_mode, mode);
        self.store_mode(mode, active);

        let mut committed = None;
        let reuse = !set_target && self.target_valid(axis) && old_mode == mode;
        if set_target || (entering && !reuse) {
            let value = match target {
                Some(v) if set_target => finite_or_zero(v),
                _ => mode.capture(&vessel, self.speed_ref),
            };
            committed = Some(self.commit_target(bank, mode, value, &vessel, continuing));
        } else if entering {
            let stored = self.target(axis);
            committed = Some(self.commit_target(bank, mode, stored, &vessel, continuing));
        } else if old_mode != mode {
            self.invalidate_target(axis);
        }

        ModeChange { axis, transition, target: committed }
    }

    /// Apply `value` to the mode's top controller and remember it.
    /// Returns the value as stored (wrapped or clamped).
    fn commit_target(
        &mut self,
        bank: &mut ControllerBank,
        mode: Mode,
        value: f64,
        vessel: &VesselState,
        continuing: bool,
    ) -> f64 {
        let stored = match mode {
            Mode::Horizontal(HrztMode::HeadingNum) => {
                let hdg = &mut bank[Role::HdgBank];
                let start = if continuing { hdg.active_setpoint() } else { vessel.heading };
                hdg.update_setpoint(value, true, start);
                hdg.target_setpoint()
            }
            Mode::Horizontal(HrztMode::Heading) => {
                // the shift drives the setpoint; start it from the nose, or
                // freeze a HeadingNum ease where it is
                let hdg = &mut bank[Role::HdgBank];
                let start = if continuing { hdg.active_setpoint() } else { vessel.heading };
                hdg.update_setpoint(start, false, 0.0);
                wrap_360(value)
            }
            Mode::Throttle(ThrottleMode::Direct) => value.clamp(0.0, 1.0),
            _ => match mode.top() {
                Some(role) => {
                    bank[role].update_setpoint(value, false, 0.0);
                    bank[role].target_setpoint()
                }
                None => value,
            },
        };
        debug!("{:?} target set to {}", mode, mode.format_target(stored));
        self.record_target(mode.axis(), stored);
        stored
    }

    /// Remember a target and refresh its display text without touching any
    /// controller.
    pub fn record_target(&mut self, axis: Axis, value: f64) {
        let text = self.mode(axis).format_target(value);
        match axis {
            Axis::Horizontal => set_target(&mut self.horizontal, value, text),
            Axis::Vertical => set_target(&mut self.vertical, value, text),
            Axis::Throttle => set_target(&mut self.throttle, value, text),
        }
    }

    fn target_valid(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.horizontal.target_valid,
            Axis::Vertical => self.vertical.target_valid,
            Axis::Throttle => self.throttle.target_valid,
        }
    }

    fn invalidate_target(&mut self, axis: Axis) {
        match axis {
            Axis::Horizontal => self.horizontal.target_valid = false,
            Axis::Vertical => self.vertical.target_valid = false,
            Axis::Throttle => self.throttle.target_valid = false,
        }
    }

    fn store_mode(&mut self, mode: Mode, active: bool) {
        match mode {
            Mode::Horizontal(m) => store(&mut self.horizontal, m, active),
            Mode::Vertical(m) => store(&mut self.vertical, m, active),
            Mode::Throttle(m) => store(&mut self.throttle, m, active),
        }
    }
}

impl Default for ModeSwitcher {
    fn default() -> Self {
        Self::new(SpeedRef::default())
    }
}

fn store<M: Copy>(state: &mut ModeState<M>, mode: M, active: bool) {
    state.was_active = state.active;
    state.mode = mode;
    state.active = active;
}

fn set_target<M>(state: &mut ModeState<M>, value: f64, text: String) {
    state.target = value;
    state.target_valid = true;
    state.target_display = text;
}

fn as_horizontal(mode: Mode) -> Option<HrztMode> {
    match mode {
        Mode::Horizontal(m) => Some(m),
        _ => None,
    }
}

fn as_vertical(mode: Mode) -> Option<VertMode> {
    match mode {
        Mode::Vertical(m) => Some(m),
        _ => None,
    }
}

fn as_throttle(mode: Mode) -> Option<ThrottleMode> {
    match mode {
        Mode::Throttle(m) => Some(m),
        _ => None,
    }
}

fn same_heading_chain(a: Mode, b: Mode) -> bool {
    let heading = |m| matches!(m, Mode::Horizontal(HrztMode::Heading | HrztMode::HeadingNum));
    heading(a) && heading(b)
}

/// Controllers evaluated each tick in `mode`, upstream first.
pub fn chain_roles(mode: Mode) -> &'static [Role] {
    match mode {
        Mode::Horizontal(HrztMode::Bank) => &[Role::Aileron, Role::BankToYaw, Role::Rudder],
        Mode::Horizontal(_) => &[Role::HdgBank, Role::Aileron, Role::BankToYaw, Role::Rudder],
        Mode::Vertical(VertMode::Pitch) => &[Role::Elevator],
        Mode::Vertical(VertMode::VSpeed) => &[Role::VertSpeed, Role::Elevator],
        Mode::Vertical(_) => &[Role::Altitude, Role::VertSpeed, Role::Elevator],
        Mode::Throttle(ThrottleMode::Direct) => &[],
        Mode::Throttle(ThrottleMode::Acceleration) => &[Role::Acceleration],
        Mode::Throttle(ThrottleMode::Speed) => &[Role::Speed, Role::Acceleration],
    }
}

// ---------------------------------------------------------------------------
// Integral preload per axis
// ---------------------------------------------------------------------------
//
// `from` is the previous mode when switching between two active modes and
// `None` when the axis is engaging from idle. Controllers that stay in the
// chain keep their state; new ones are seeded so their first output matches
// what the vehicle is already doing.

fn preload_horizontal(bank: &mut ControllerBank, mode: HrztMode, from: Option<HrztMode>, vessel: &VesselState) {
    match (mode, from) {
        (HrztMode::Bank, Some(_)) => bank.clear(&[Role::HdgBank]),
        (HrztMode::Bank, None) => {
            bank.clear(&[Role::HdgBank]);
            bank[Role::Aileron].preset_to(vessel.controls.roll, false);
        }
        (_, Some(HrztMode::Bank)) => {
            let held = bank[Role::Aileron].active_setpoint();
            bank[Role::HdgBank].preset_to(held, false);
        }
        (_, Some(_)) => {}
        (_, None) => {
            bank[Role::HdgBank].preset_to(vessel.bank, false);
            bank[Role::Aileron].preset_to(vessel.controls.roll, false);
        }
    }
    if from.is_none() {
        bank.clear(&[Role::BankToYaw]);
        bank[Role::Rudder].preset_to(vessel.controls.yaw, false);
    }
    debug!("horizontal preload for {:?} (from {:?})", mode, from);
}

fn preload_vertical(bank: &mut ControllerBank, mode: VertMode, from: Option<VertMode>, vessel: &VesselState) {
    let inverted = vessel.is_inverted();
    let seed_lower_chain = |bank: &mut ControllerBank| {
        bank[Role::VertSpeed].preset_to(vessel.angle_of_attack, inverted);
        bank[Role::Elevator].preset_to(vessel.controls.pitch, false);
    };
    match mode {
        VertMode::Pitch => {
            bank.clear(&[Role::Altitude, Role::VertSpeed]);
            bank[Role::Elevator].preset_to(vessel.controls.pitch, inverted);
        }
        VertMode::VSpeed => {
            bank.clear(&[Role::Altitude]);
            if !matches!(from, Some(VertMode::Altitude | VertMode::RadarAltitude)) {
                seed_lower_chain(bank);
            }
        }
        VertMode::Altitude | VertMode::RadarAltitude => match from {
            Some(VertMode::VSpeed) => {
                let commanded = bank[Role::VertSpeed].active_setpoint();
                bank[Role::Altitude].preset_to(commanded, false);
            }
            Some(VertMode::Altitude | VertMode::RadarAltitude) => bank[Role::Altitude].preset(false),
            _ => {
                bank[Role::Altitude].preset_to(vessel.vertical_speed, false);
                seed_lower_chain(bank);
            }
        },
    }
    debug!("vertical preload for {:?} (from {:?}, inverted {})", mode, from, inverted);
}

fn preload_throttle(bank: &mut ControllerBank, mode: ThrottleMode, from: Option<ThrottleMode>, vessel: &VesselState) {
    match mode {
        ThrottleMode::Direct => bank.clear(&[Role::Speed, Role::Acceleration]),
        ThrottleMode::Acceleration => {
            bank.clear(&[Role::Speed]);
            if from != Some(ThrottleMode::Speed) {
                bank[Role::Acceleration].preset_to(vessel.controls.throttle, false);
            }
        }
        ThrottleMode::Speed => {
            if from == Some(ThrottleMode::Acceleration) {
                let commanded = bank[Role::Acceleration].active_setpoint();
                bank[Role::Speed].preset_to(commanded, false);
            } else {
                bank[Role::Speed].preset_to(vessel.acceleration, false);
                bank[Role::Acceleration].preset_to(vessel.controls.throttle, false);
            }
        }
    }
    debug!("throttle preload for {:?} (from {:?})", mode, from);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_flight() -> VesselState {
        VesselState {
            heading: 90.0,
            pitch: 3.0,
            bank: 0.0,
            angle_of_attack: 3.0,
            vertical_speed: 0.0,
            altitude: 1000.0,
            radar_altitude: 800.0,
            true_airspeed: 120.0,
            indicated_airspeed: 110.0,
            controls: crate::dynamics::ControlState { pitch: 0.05, roll: 0.0, yaw: 0.0, throttle: 0.45 },
            ..Default::default()
        }
    }

    #[test]
    fn activation_captures_current_value() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        let change = modes.set_mode(
            &mut bank,
            Mode::Vertical(VertMode::Altitude),
            true,
            false,
            None,
            &level_flight(),
        );
        assert_eq!(change.transition, Transition::Activated);
        assert_eq!(change.target, Some(1000.0));
        assert_eq!(bank[Role::Altitude].target_setpoint(), 1000.0);
        assert_eq!(modes.target_display(Axis::Vertical), "1000 m");
    }

    #[test]
    fn activation_preloads_from_vehicle() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        modes.set_mode(&mut bank, Mode::Throttle(ThrottleMode::Speed), true, true, Some(130.0), &level_flight());
        // inverted-output controllers: integral holds the negated output
        assert!((bank[Role::Acceleration].sum() + 0.45).abs() < 1e-12);
        assert_eq!(bank[Role::Speed].target_setpoint(), 130.0);
        assert!(bank[Role::Speed].is_active());
    }

    #[test]
    fn every_call_skips_derivative_on_the_axis() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        modes.set_mode(&mut bank, Mode::Horizontal(HrztMode::Bank), false, true, Some(5.0), &level_flight());
        for &role in Axis::Horizontal.roles() {
            assert!(bank[role].skips_derivative(), "{:?}", role);
        }
        assert!(!bank[Role::Elevator].skips_derivative());
    }

    #[test]
    fn deactivation_clears_integrals() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        let vessel = level_flight();
        modes.set_mode(&mut bank, Mode::Vertical(VertMode::VSpeed), true, true, Some(2.0), &vessel);
        assert!(bank[Role::Elevator].sum() != 0.0);
        let change = modes.set_mode(&mut bank, Mode::Vertical(VertMode::VSpeed), false, false, None, &vessel);
        assert_eq!(change.transition, Transition::Deactivated);
        for &role in Axis::Vertical.roles() {
            assert_eq!(bank[role].sum(), 0.0);
            assert!(!bank[role].is_active());
        }
        assert!(modes.vertical().was_active());
        assert!(!modes.vertical().is_active());
    }

    #[test]
    fn vspeed_to_altitude_seeds_altitude_from_commanded_climb() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        let vessel = level_flight();
        modes.set_mode(&mut bank, Mode::Vertical(VertMode::VSpeed), true, true, Some(4.0), &vessel);
        let change = modes.set_mode(&mut bank, Mode::Vertical(VertMode::Altitude), true, false, None, &vessel);
        assert_eq!(change.transition, Transition::Switched { from: Mode::Vertical(VertMode::VSpeed) });
        assert!((bank[Role::Altitude].sum() + 4.0).abs() < 1e-12);
        // altitude stage now reproduces the commanded climb on its first tick
        let out = bank[Role::Altitude].response(vessel.altitude, true, 0.02);
        assert!((out - 4.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_flight_flips_preload() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        let vessel = VesselState { bank: 170.0, ..level_flight() };
        modes.set_mode(&mut bank, Mode::Vertical(VertMode::VSpeed), true, true, Some(0.0), &vessel);
        assert!((bank[Role::VertSpeed].sum() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn reengaging_reuses_stored_target() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        let vessel = level_flight();
        modes.set_mode(&mut bank, Mode::Horizontal(HrztMode::Bank), true, true, Some(15.0), &vessel);
        modes.set_mode(&mut bank, Mode::Horizontal(HrztMode::Bank), false, false, None, &vessel);
        let change = modes.set_mode(&mut bank, Mode::Horizontal(HrztMode::Bank), true, false, None, &vessel);
        assert_eq!(change.target, Some(15.0));
        assert_eq!(bank[Role::Aileron].target_setpoint(), 15.0);
    }

    #[test]
    fn heading_num_eases_from_current_heading() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        modes.set_mode(&mut bank, Mode::Horizontal(HrztMode::HeadingNum), true, true, Some(180.0), &level_flight());
        let hdg = &bank[Role::HdgBank];
        assert_eq!(hdg.target_setpoint(), 180.0);
        assert_eq!(hdg.active_setpoint(), 90.0);
    }

    #[test]
    fn direct_throttle_target_is_clamped() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        let change = modes.set_mode(&mut bank, Mode::Throttle(ThrottleMode::Direct), true, true, Some(1.7), &level_flight());
        assert_eq!(change.target, Some(1.0));
        assert_eq!(modes.target_display(Axis::Throttle), "100%");
    }

    #[test]
    fn same_mode_retarget_captures_when_no_value_given() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::default();
        let mut vessel = level_flight();
        modes.set_mode(&mut bank, Mode::Vertical(VertMode::Altitude), true, true, Some(1500.0), &vessel);
        vessel.altitude = 1234.0;
        let change = modes.set_mode(&mut bank, Mode::Vertical(VertMode::Altitude), true, true, None, &vessel);
        assert_eq!(change.transition, Transition::Retargeted);
        assert_eq!(bank[Role::Altitude].target_setpoint(), 1234.0);
    }

    #[test]
    fn indicated_speed_reference_is_captured() {
        let mut bank = ControllerBank::new();
        let mut modes = ModeSwitcher::new(SpeedRef::Indicated);
        let change = modes.set_mode(&mut bank, Mode::Throttle(ThrottleMode::Speed), true, false, None, &level_flight());
        assert_eq!(change.target, Some(110.0));
    }
}
