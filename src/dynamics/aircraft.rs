use nalgebra::Vector3;

use crate::dynamics::state::{ControlState, VesselState, G0};
use crate::gnc::angle::{wrap_180, wrap_360};
use crate::vehicle::Airframe;

/// Scale height of the exponential density model, m.
const SCALE_HEIGHT: f64 = 8_500.0;

// ---------------------------------------------------------------------------
// Integrated aircraft state (angles in degrees)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AircraftState {
    pub time: f64,
    pub heading: f64,
    pub bank: f64,
    pub roll_rate: f64,
    pub pitch: f64,
    pub pitch_rate: f64,
    pub flight_path: f64,         // climb angle of the velocity vector
    pub sideslip: f64,
    pub yaw_rate: f64,
    pub speed: f64,               // m/s true airspeed
    pub altitude: f64,
    /// Actuators applied over the last step.
    pub controls: ControlState,
    /// Along-track acceleration at the start of the last step.
    pub acceleration: f64,
}

/// Time derivative of the integrated part of [`AircraftState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Deriv {
    pub heading: f64,
    pub bank: f64,
    pub roll_rate: f64,
    pub pitch: f64,
    pub pitch_rate: f64,
    pub flight_path: f64,
    pub sideslip: f64,
    pub yaw_rate: f64,
    pub speed: f64,
    pub altitude: f64,
}

impl AircraftState {
    /// Wings level, unaccelerated flight at `speed`, with trim controls.
    pub fn trimmed(airframe: &Airframe, altitude: f64, heading: f64, speed: f64) -> Self {
        Self {
            time: 0.0,
            heading: wrap_360(heading),
            bank: 0.0,
            roll_rate: 0.0,
            pitch: airframe.trim_aoa(speed),
            pitch_rate: 0.0,
            flight_path: 0.0,
            sideslip: 0.0,
            yaw_rate: 0.0,
            speed,
            altitude,
            controls: ControlState {
                pitch: airframe.trim_elevator(speed),
                roll: 0.0,
                yaw: 0.0,
                throttle: airframe.trim_throttle(speed),
            },
            acceleration: 0.0,
        }
    }

    pub fn angle_of_attack(&self) -> f64 {
        self.pitch - self.flight_path
    }

    pub fn vertical_speed(&self) -> f64 {
        self.speed * self.flight_path.to_radians().sin()
    }

    /// Euler step of the integrated variables; used by the RK4 stages.
    pub fn apply(&self, d: &Deriv, dt: f64) -> Self {
        Self {
            time: self.time + dt,
            heading: self.heading + d.heading * dt,
            bank: self.bank + d.bank * dt,
            roll_rate: self.roll_rate + d.roll_rate * dt,
            pitch: self.pitch + d.pitch * dt,
            pitch_rate: self.pitch_rate + d.pitch_rate * dt,
            flight_path: self.flight_path + d.flight_path * dt,
            sideslip: self.sideslip + d.sideslip * dt,
            yaw_rate: self.yaw_rate + d.yaw_rate * dt,
            speed: self.speed + d.speed * dt,
            altitude: self.altitude + d.altitude * dt,
            controls: self.controls,
            acceleration: self.acceleration,
        }
    }

    /// Keep heading in [0, 360) and bank in [-180, 180).
    pub fn normalize_angles(&mut self) {
        self.heading = wrap_360(self.heading);
        self.bank = wrap_180(self.bank);
    }

    /// What the autopilot gets to read this tick.
    pub fn snapshot(&self, airframe: &Airframe) -> VesselState {
        VesselState {
            time: self.time,
            heading: self.heading,
            pitch: self.pitch,
            bank: self.bank,
            sideslip: self.sideslip,
            angle_of_attack: self.angle_of_attack(),
            vertical_speed: self.vertical_speed(),
            altitude: self.altitude,
            radar_altitude: self.altitude - airframe.terrain_elevation,
            true_airspeed: self.speed,
            indicated_airspeed: self.speed * (-self.altitude.max(0.0) / SCALE_HEIGHT).exp().sqrt(),
            acceleration: self.acceleration,
            rates: Vector3::new(self.pitch_rate, self.roll_rate, self.yaw_rate),
            controls: self.controls,
            pilot: Vector3::zeros(),
            use_integral: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Equations of motion
// ---------------------------------------------------------------------------

/// Reduced-order point-mass model with decoupled first-order rate dynamics.
///
///   1. Lift proportional to AoA and dynamic pressure, saturating at stall
///   2. Banked lift turns the flight path (coordinated-turn kinematics)
///   3. Surfaces drive angular accelerations against damping and stability
///   4. Thrust and quadratic drag along the flight path
pub fn derivatives(state: &AircraftState, airframe: &Airframe, controls: &ControlState) -> Deriv {
    let speed = state.speed.max(1.0);
    let aoa = state
        .angle_of_attack()
        .clamp(-airframe.stall_aoa, airframe.stall_aoa);
    let lift = airframe.lift_slope * aoa * (speed / airframe.reference_speed).powi(2);

    let gamma = state.flight_path.to_radians();
    let bank = state.bank.to_radians();

    // --- Flight path ---
    let d_gamma = ((lift * bank.cos() - G0 * gamma.cos()) / speed).to_degrees();
    let d_heading = (lift * bank.sin() / (speed * gamma.cos())).to_degrees();

    // --- Rotational ---
    let d_p = airframe.roll_authority * controls.roll - airframe.roll_damping * state.roll_rate;
    let d_q = airframe.pitch_authority * controls.pitch
        - airframe.pitch_damping * state.pitch_rate
        - airframe.pitch_stability * state.angle_of_attack();
    let d_r = airframe.yaw_authority * controls.yaw
        - airframe.yaw_damping * state.yaw_rate
        - airframe.yaw_stability * state.sideslip;
    let d_beta = state.yaw_rate - airframe.adverse_yaw * state.roll_rate;

    // --- Along track ---
    let d_v = airframe.max_thrust * controls.throttle
        - airframe.drag_factor * state.speed * state.speed
        - G0 * gamma.sin();

    Deriv {
        heading: d_heading,
        bank: state.roll_rate,
        roll_rate: d_p,
        pitch: state.pitch_rate,
        pitch_rate: d_q,
        flight_path: d_gamma,
        sideslip: d_beta,
        yaw_rate: d_r,
        speed: d_v,
        altitude: state.speed * gamma.sin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;

    #[test]
    fn trimmed_state_is_nearly_steady() {
        let a = presets::trainer();
        let s = AircraftState::trimmed(&a, 1000.0, 90.0, 120.0);
        let d = derivatives(&s, &a, &s.controls);
        assert!(d.flight_path.abs() < 1e-3, "dgamma {}", d.flight_path);
        assert!(d.speed.abs() < 1e-9, "dv {}", d.speed);
        assert!(d.pitch_rate.abs() < 1e-9, "dq {}", d.pitch_rate);
        assert_eq!(d.heading, 0.0);
    }

    #[test]
    fn right_bank_turns_right() {
        let a = presets::trainer();
        let mut s = AircraftState::trimmed(&a, 1000.0, 90.0, 120.0);
        s.bank = 30.0;
        let d = derivatives(&s, &a, &s.controls);
        assert!(d.heading > 0.0);
        assert!(d.flight_path < 0.0, "less vertical lift in a bank");
    }

    #[test]
    fn aileron_rolls_and_yaws_adversely() {
        let a = presets::trainer();
        let mut s = AircraftState::trimmed(&a, 1000.0, 0.0, 120.0);
        let controls = ControlState { roll: 0.5, ..s.controls };
        let d = derivatives(&s, &a, &controls);
        assert!(d.roll_rate > 0.0);
        s.roll_rate = 10.0;
        let d = derivatives(&s, &a, &controls);
        assert!(d.sideslip < 0.0);
    }

    #[test]
    fn snapshot_reports_climb_and_density() {
        let a = presets::trainer();
        let mut s = AircraftState::trimmed(&a, 3000.0, 45.0, 100.0);
        s.flight_path = 5.0;
        let v = s.snapshot(&a);
        assert!((v.vertical_speed - 100.0 * 5f64.to_radians().sin()).abs() < 1e-9);
        assert!(v.indicated_airspeed < v.true_airspeed);
        assert_eq!(v.radar_altitude, 3000.0);
        assert!((v.angle_of_attack - (s.pitch - 5.0)).abs() < 1e-12);
    }
}
