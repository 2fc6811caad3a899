use nalgebra::Vector3;

use crate::gnc::angle::finite_or_zero;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665;

// ---------------------------------------------------------------------------
// Per-tick vessel snapshot (angles in degrees, SI otherwise)
// ---------------------------------------------------------------------------

/// Everything the autopilot reads from the vehicle in one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselState {
    pub time: f64,                  // s
    pub heading: f64,               // deg, 0–360 compass
    pub pitch: f64,                 // deg, positive = nose up
    pub bank: f64,                  // deg, positive = right wing down
    pub sideslip: f64,              // deg
    pub angle_of_attack: f64,       // deg
    pub vertical_speed: f64,        // m/s
    pub altitude: f64,              // m above sea level
    pub radar_altitude: f64,        // m above terrain
    pub true_airspeed: f64,         // m/s
    pub indicated_airspeed: f64,    // m/s
    pub acceleration: f64,          // m/s^2 along the flight path
    pub rates: Vector3<f64>,        // deg/s [pitch, roll, yaw]
    pub controls: ControlState,     // actuator positions last tick
    pub pilot: Vector3<f64>,        // raw pilot stick [pitch, roll, yaw]
    /// False while landed or without control authority; integrators are
    /// suspended so they cannot wind up.
    pub use_integral: bool,
}

impl VesselState {
    /// Copy with every non-finite reading replaced by zero.
    pub fn sanitized(&self) -> Self {
        Self {
            time: finite_or_zero(self.time),
            heading: finite_or_zero(self.heading),
            pitch: finite_or_zero(self.pitch),
            bank: finite_or_zero(self.bank),
            sideslip: finite_or_zero(self.sideslip),
            angle_of_attack: finite_or_zero(self.angle_of_attack),
            vertical_speed: finite_or_zero(self.vertical_speed),
            altitude: finite_or_zero(self.altitude),
            radar_altitude: finite_or_zero(self.radar_altitude),
            true_airspeed: finite_or_zero(self.true_airspeed),
            indicated_airspeed: finite_or_zero(self.indicated_airspeed),
            acceleration: finite_or_zero(self.acceleration),
            rates: self.rates.map(finite_or_zero),
            controls: self.controls.sanitized(),
            pilot: self.pilot.map(finite_or_zero),
            use_integral: self.use_integral,
        }
    }

    /// Flying upside down: pitch authority acts the other way.
    pub fn is_inverted(&self) -> bool {
        self.bank.abs() > 90.0
    }
}

impl Default for VesselState {
    fn default() -> Self {
        Self {
            time: 0.0,
            heading: 0.0,
            pitch: 0.0,
            bank: 0.0,
            sideslip: 0.0,
            angle_of_attack: 0.0,
            vertical_speed: 0.0,
            altitude: 0.0,
            radar_altitude: 0.0,
            true_airspeed: 0.0,
            indicated_airspeed: 0.0,
            acceleration: 0.0,
            rates: Vector3::zeros(),
            controls: ControlState::default(),
            pilot: Vector3::zeros(),
            use_integral: true,
        }
    }
}

/// Actuator positions: surfaces in `[-1, 1]`, throttle in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlState {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
    pub throttle: f64,
}

impl ControlState {
    fn sanitized(&self) -> Self {
        Self {
            pitch: finite_or_zero(self.pitch),
            roll: finite_or_zero(self.roll),
            yaw: finite_or_zero(self.yaw),
            throttle: finite_or_zero(self.throttle),
        }
    }
}

// ---------------------------------------------------------------------------
// Autopilot output
// ---------------------------------------------------------------------------

/// Commands for one tick. `None` leaves the channel to the pilot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightControls {
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
    pub yaw: Option<f64>,
    pub throttle: Option<f64>,
}

impl FlightControls {
    /// Merge onto the current actuator state; released channels keep `base`.
    pub fn apply_to(&self, base: ControlState) -> ControlState {
        ControlState {
            pitch: self.pitch.unwrap_or(base.pitch),
            roll: self.roll.unwrap_or(base.roll),
            yaw: self.yaw.unwrap_or(base.yaw),
            throttle: self.throttle.unwrap_or(base.throttle),
        }
    }

    pub fn is_released(&self) -> bool {
        self.pitch.is_none() && self.roll.is_none() && self.yaw.is_none() && self.throttle.is_none()
    }
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,         // 50 Hz physics tick
            max_time: 300.0,
        }
    }
}
