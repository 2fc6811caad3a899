use log::{debug, info};

use crate::dynamics::aircraft::AircraftState;
use crate::dynamics::state::{ControlState, FlightControls, SimConfig, VesselState};
use crate::gnc::Controller;
use crate::vehicle::Airframe;
use super::integrator::rk4_step;

// ---------------------------------------------------------------------------
// Closed-loop flight
// ---------------------------------------------------------------------------

/// Actuators for the next step: released surfaces centre, a released
/// throttle stays where it was.
fn actuate(cmd: &FlightControls, previous: &ControlState) -> ControlState {
    let base = ControlState { pitch: 0.0, roll: 0.0, yaw: 0.0, throttle: previous.throttle };
    let c = cmd.apply_to(base);
    ControlState {
        pitch: c.pitch.clamp(-1.0, 1.0),
        roll: c.roll.clamp(-1.0, 1.0),
        yaw: c.yaw.clamp(-1.0, 1.0),
        throttle: c.throttle.clamp(0.0, 1.0),
    }
}

fn run<F>(airframe: &Airframe, config: &SimConfig, start: AircraftState, mut step: F) -> (Vec<VesselState>, Vec<FlightControls>)
where
    F: FnMut(&VesselState, f64) -> FlightControls,
{
    let mut state = start;

    let capacity = (config.max_time / config.dt) as usize + 1;
    let cap = capacity.min(200_000);
    let mut trajectory = Vec::with_capacity(cap);
    let mut commands = Vec::with_capacity(cap);

    trajectory.push(state.snapshot(airframe));
    commands.push(FlightControls::default());

    // half a step of slack so float accumulation does not add a step
    while state.time < config.max_time - config.dt * 0.5 {
        let snapshot = state.snapshot(airframe);
        let cmd = step(&snapshot, config.dt);
        let controls = actuate(&cmd, &state.controls);

        state = rk4_step(&state, airframe, &controls, config.dt);

        // Ground contact
        if state.altitude <= airframe.terrain_elevation {
            state.altitude = airframe.terrain_elevation;
            info!("ground contact at t={:.2}s", state.time);
            trajectory.push(state.snapshot(airframe));
            commands.push(cmd);
            break;
        }

        trajectory.push(state.snapshot(airframe));
        commands.push(cmd);
    }

    debug!("flight finished: {} samples", trajectory.len());
    (trajectory, commands)
}

/// Fly `airframe` from `start` under `controller` for `config.max_time`.
/// Returns the per-tick snapshots and the commands that produced them.
pub fn fly_with(
    airframe: &Airframe,
    config: &SimConfig,
    start: AircraftState,
    controller: &mut dyn Controller,
) -> (Vec<VesselState>, Vec<FlightControls>) {
    info!("flying {} with {}", airframe.name, controller.name());
    run(airframe, config, start, |v, dt| controller.control(v, dt))
}

/// Like [`fly_with`], but calls `script` before every tick so a scenario
/// can change modes and targets mid-flight.
pub fn fly_scripted<C, F>(
    airframe: &Airframe,
    config: &SimConfig,
    start: AircraftState,
    controller: &mut C,
    mut script: F,
) -> (Vec<VesselState>, Vec<FlightControls>)
where
    C: Controller,
    F: FnMut(&mut C, &VesselState),
{
    info!("flying {} with {} (scripted)", airframe.name, controller.name());
    run(airframe, config, start, |v, dt| {
        script(controller, v);
        controller.control(v, dt)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;

    /// Leaves every channel to the (absent) pilot.
    struct HandsOff;

    impl Controller for HandsOff {
        fn control(&mut self, _state: &VesselState, _dt: f64) -> FlightControls {
            FlightControls::default()
        }
    }

    /// Fixed commands on every channel.
    struct Fixed(ControlState);

    impl Controller for Fixed {
        fn control(&mut self, _state: &VesselState, _dt: f64) -> FlightControls {
            FlightControls {
                pitch: Some(self.0.pitch),
                roll: Some(self.0.roll),
                yaw: Some(self.0.yaw),
                throttle: Some(self.0.throttle),
            }
        }
    }

    #[test]
    fn sample_count_matches_duration() {
        let a = presets::trainer();
        let start = AircraftState::trimmed(&a, 1000.0, 0.0, 120.0);
        let config = SimConfig { dt: 0.02, max_time: 10.0 };
        let trim = start.controls;
        let (traj, cmds) = fly_with(&a, &config, start, &mut Fixed(trim));
        assert_eq!(traj.len(), 501);
        assert_eq!(cmds.len(), traj.len());
        assert!((traj.last().unwrap().time - 10.0).abs() < 1e-6);
    }

    #[test]
    fn released_throttle_is_kept() {
        let a = presets::trainer();
        let start = AircraftState::trimmed(&a, 1000.0, 0.0, 120.0);
        let config = SimConfig { dt: 0.02, max_time: 1.0 };
        let (traj, _) = fly_with(&a, &config, start, &mut HandsOff);
        let last = traj.last().unwrap();
        assert!((last.controls.throttle - 0.45).abs() < 1e-9);
        assert_eq!(last.controls.pitch, 0.0);
    }

    #[test]
    fn hands_off_eventually_hits_the_ground() {
        let a = presets::trainer();
        let start = AircraftState::trimmed(&a, 300.0, 0.0, 120.0);
        let config = SimConfig { dt: 0.02, max_time: 600.0 };
        let (traj, _) = fly_with(&a, &config, start, &mut Fixed(ControlState { pitch: -0.5, ..Default::default() }));
        let last = traj.last().unwrap();
        assert!(last.time < 600.0);
        assert_eq!(last.altitude, 0.0);
    }

    #[test]
    fn script_runs_before_each_tick() {
        let a = presets::trainer();
        let start = AircraftState::trimmed(&a, 1000.0, 0.0, 120.0);
        let config = SimConfig { dt: 0.1, max_time: 1.0 };
        let mut calls = 0;
        fly_scripted(&a, &config, start, &mut HandsOff, |_, _| calls += 1);
        assert_eq!(calls, 10);
    }
}
