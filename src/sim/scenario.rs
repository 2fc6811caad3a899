use log::info;

use crate::dynamics::state::VesselState;
use crate::gnc::{Autopilot, Axis, HrztMode, Mode, ThrottleMode, VertMode};

// ---------------------------------------------------------------------------
// Timed pilot commands
// ---------------------------------------------------------------------------

/// What the pilot does at a scripted instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Engage (or switch to) a mode; `None` captures the current value.
    Engage(Mode, Option<f64>),
    Disengage(Axis),
    Target(Axis, f64),
    Nudge(Axis, f64),
    Pause(bool),
}

/// Pilot commands sorted by time, replayed into an [`Autopilot`] from the
/// script hook of [`fly_scripted`](super::runner::fly_scripted).
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<(f64, Command)>,
    next: usize,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, time: f64, command: Command) -> Self {
        let pos = self.steps.partition_point(|(t, _)| *t <= time);
        self.steps.insert(pos, (time, command));
        self
    }

    /// Apply every command due at `vessel.time`.
    pub fn apply(&mut self, ap: &mut Autopilot, vessel: &VesselState) {
        while let Some(&(time, command)) = self.steps.get(self.next) {
            if time > vessel.time + 1e-9 {
                break;
            }
            self.next += 1;
            info!("t={:.2}s {:?}", vessel.time, command);
            match command {
                Command::Engage(mode, target) => {
                    ap.set_mode(mode, true, target.is_some(), target, vessel);
                }
                Command::Disengage(axis) => {
                    let mode = ap.modes().mode(axis);
                    ap.set_mode(mode, false, false, None, vessel);
                }
                Command::Target(axis, value) => {
                    let mode = ap.modes().mode(axis);
                    let active = ap.modes().is_active(axis);
                    ap.set_mode(mode, active, true, Some(value), vessel);
                }
                Command::Nudge(axis, delta) => {
                    ap.nudge(axis, delta);
                }
                Command::Pause(paused) => ap.set_paused(paused),
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.steps.len()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The cross-country leg flown by the `pilot-assist` report and viewer:
/// turn onto 120° while climbing to 1200 m at 130 m/s, descend at 4 m/s,
/// level off, reverse course across north, and take a short pause.
pub fn cross_country() -> Script {
    Script::new()
        .at(0.0, Command::Engage(Mode::Horizontal(HrztMode::Heading), Some(120.0)))
        .at(0.0, Command::Engage(Mode::Vertical(VertMode::Altitude), Some(1200.0)))
        .at(0.0, Command::Engage(Mode::Throttle(ThrottleMode::Speed), Some(130.0)))
        .at(150.0, Command::Engage(Mode::Vertical(VertMode::VSpeed), Some(-4.0)))
        .at(200.0, Command::Engage(Mode::Vertical(VertMode::Altitude), None))
        .at(220.0, Command::Target(Axis::Horizontal, 340.0))
        .at(300.0, Command::Nudge(Axis::Horizontal, 30.0))
        .at(360.0, Command::Pause(true))
        .at(363.0, Command::Pause(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_stay_sorted() {
        let script = Script::new()
            .at(5.0, Command::Pause(true))
            .at(1.0, Command::Pause(false))
            .at(5.0, Command::Nudge(Axis::Vertical, 1.0));
        let times: Vec<f64> = script.steps.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![1.0, 5.0, 5.0]);
        // same-time steps keep insertion order
        assert_eq!(script.steps[2].1, Command::Nudge(Axis::Vertical, 1.0));
    }

    #[test]
    fn apply_runs_due_commands_once() {
        let mut ap = Autopilot::default();
        let mut script = Script::new()
            .at(0.0, Command::Engage(Mode::Throttle(ThrottleMode::Direct), Some(0.5)))
            .at(1.0, Command::Nudge(Axis::Throttle, 0.1));
        let v = VesselState::default();
        script.apply(&mut ap, &v);
        assert!(ap.input_locks().throttle);
        assert!(!script.is_done());
        script.apply(&mut ap, &VesselState { time: 1.0, ..v.clone() });
        script.apply(&mut ap, &VesselState { time: 1.02, ..v });
        assert!(script.is_done());
        assert!((ap.modes().target(Axis::Throttle) - 0.6).abs() < 1e-12);
    }
}
