use crate::dynamics::aircraft::{derivatives, AircraftState, Deriv};
use crate::dynamics::state::ControlState;
use crate::vehicle::Airframe;

// ---------------------------------------------------------------------------
// RK4 integrator with constant controls over the step
// ---------------------------------------------------------------------------

/// Single RK4 step with the actuators held at `controls`.
pub fn rk4_step(state: &AircraftState, airframe: &Airframe, controls: &ControlState, dt: f64) -> AircraftState {
    let k1 = derivatives(state, airframe, controls);
    let k2 = derivatives(&state.apply(&k1, dt * 0.5), airframe, controls);
    let k3 = derivatives(&state.apply(&k2, dt * 0.5), airframe, controls);
    let k4 = derivatives(&state.apply(&k3, dt), airframe, controls);

    let blend = |f: fn(&Deriv) -> f64| (f(&k1) + 2.0 * f(&k2) + 2.0 * f(&k3) + f(&k4)) * (dt / 6.0);

    let mut next = AircraftState {
        time: state.time + dt,
        heading: state.heading + blend(|d| d.heading),
        bank: state.bank + blend(|d| d.bank),
        roll_rate: state.roll_rate + blend(|d| d.roll_rate),
        pitch: state.pitch + blend(|d| d.pitch),
        pitch_rate: state.pitch_rate + blend(|d| d.pitch_rate),
        flight_path: state.flight_path + blend(|d| d.flight_path),
        sideslip: state.sideslip + blend(|d| d.sideslip),
        yaw_rate: state.yaw_rate + blend(|d| d.yaw_rate),
        speed: (state.speed + blend(|d| d.speed)).max(0.0),
        altitude: state.altitude + blend(|d| d.altitude),
        controls: *controls,
        acceleration: k1.speed,
    };
    next.normalize_angles();
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;

    #[test]
    fn trimmed_flight_holds_altitude() {
        let a = presets::trainer();
        let mut s = AircraftState::trimmed(&a, 1000.0, 90.0, 120.0);
        let controls = s.controls;
        for _ in 0..500 {
            s = rk4_step(&s, &a, &controls, 0.02);
        }
        assert!((s.altitude - 1000.0).abs() < 1.0, "drifted to {}", s.altitude);
        assert!((s.speed - 120.0).abs() < 0.5);
        assert!((s.time - 10.0).abs() < 1e-9);
    }

    #[test]
    fn heading_wraps_through_north() {
        let a = presets::trainer();
        let mut s = AircraftState::trimmed(&a, 1000.0, 359.9, 120.0);
        s.bank = 30.0;
        let controls = s.controls;
        for _ in 0..50 {
            s = rk4_step(&s, &a, &controls, 0.02);
        }
        assert!(s.heading < 10.0, "heading {}", s.heading);
        assert!((0.0..360.0).contains(&s.heading));
    }
}
