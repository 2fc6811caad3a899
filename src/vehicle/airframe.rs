use crate::dynamics::state::G0;

// ---------------------------------------------------------------------------
// Airframe: linearised coefficients of the bench aircraft
// ---------------------------------------------------------------------------

/// Coefficients of the reduced-order aircraft model in `dynamics::aircraft`.
///
/// Angular terms are per degree, accelerations in deg/s² per unit deflection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Airframe {
    pub name: String,
    pub roll_authority: f64,      // deg/s² at full aileron
    pub roll_damping: f64,        // 1/s
    pub pitch_authority: f64,     // deg/s² at full elevator
    pub pitch_damping: f64,       // 1/s
    pub pitch_stability: f64,     // 1/s² per deg AoA (weathercock in pitch)
    pub yaw_authority: f64,       // deg/s² at full rudder
    pub yaw_damping: f64,         // 1/s
    pub yaw_stability: f64,       // 1/s² per deg sideslip
    pub adverse_yaw: f64,         // sideslip rate per unit roll rate
    pub lift_slope: f64,          // m/s² per deg AoA at reference speed
    pub reference_speed: f64,     // m/s
    pub stall_aoa: f64,           // deg, lift saturates beyond
    pub max_thrust: f64,          // m/s² at full throttle
    pub drag_factor: f64,         // 1/m, drag accel = drag_factor * v²
    pub terrain_elevation: f64,   // m, ground height under the aircraft
}

impl Airframe {
    /// Angle of attack giving 1 g of lift in level flight at `speed`.
    pub fn trim_aoa(&self, speed: f64) -> f64 {
        let q = (speed / self.reference_speed).powi(2);
        if q <= 0.0 || self.lift_slope <= 0.0 {
            return 0.0;
        }
        (G0 / (self.lift_slope * q)).min(self.stall_aoa)
    }

    /// Throttle balancing drag in level flight at `speed`.
    pub fn trim_throttle(&self, speed: f64) -> f64 {
        if self.max_thrust <= 0.0 {
            return 0.0;
        }
        (self.drag_factor * speed * speed / self.max_thrust).clamp(0.0, 1.0)
    }

    /// Elevator holding the trim AoA with zero pitch rate.
    pub fn trim_elevator(&self, speed: f64) -> f64 {
        if self.pitch_authority == 0.0 {
            return 0.0;
        }
        self.pitch_stability * self.trim_aoa(speed) / self.pitch_authority
    }
}

// ---------------------------------------------------------------------------
// Airframe builder
// ---------------------------------------------------------------------------

pub struct AirframeBuilder {
    frame: Airframe,
}

impl AirframeBuilder {
    /// Starts from the trainer coefficients.
    pub fn new(name: impl Into<String>) -> Self {
        let mut frame = presets::trainer();
        frame.name = name.into();
        Self { frame }
    }

    pub fn roll(mut self, authority: f64, damping: f64) -> Self {
        self.frame.roll_authority = authority;
        self.frame.roll_damping = damping;
        self
    }

    pub fn pitch(mut self, authority: f64, damping: f64, stability: f64) -> Self {
        self.frame.pitch_authority = authority;
        self.frame.pitch_damping = damping;
        self.frame.pitch_stability = stability;
        self
    }

    pub fn yaw(mut self, authority: f64, damping: f64, stability: f64) -> Self {
        self.frame.yaw_authority = authority;
        self.frame.yaw_damping = damping;
        self.frame.yaw_stability = stability;
        self
    }

    pub fn adverse_yaw(mut self, v: f64) -> Self { self.frame.adverse_yaw = v; self }
    pub fn lift_slope(mut self, v: f64) -> Self { self.frame.lift_slope = v; self }
    pub fn reference_speed(mut self, v: f64) -> Self { self.frame.reference_speed = v; self }
    pub fn stall_aoa(mut self, v: f64) -> Self { self.frame.stall_aoa = v; self }
    pub fn max_thrust(mut self, v: f64) -> Self { self.frame.max_thrust = v; self }
    pub fn drag_factor(mut self, v: f64) -> Self { self.frame.drag_factor = v; self }
    pub fn terrain_elevation(mut self, v: f64) -> Self { self.frame.terrain_elevation = v; self }

    pub fn build(self) -> Airframe {
        self.frame
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::Airframe;

    /// Light trainer cruising at 120 m/s; trims at 3° AoA and 45% throttle.
    pub fn trainer() -> Airframe {
        Airframe {
            name: "Trainer".into(),
            roll_authority: 120.0,
            roll_damping: 3.0,
            pitch_authority: 40.0,
            pitch_damping: 3.0,
            pitch_stability: 1.0,
            yaw_authority: 20.0,
            yaw_damping: 2.0,
            yaw_stability: 3.0,
            adverse_yaw: 0.05,
            lift_slope: 3.27,
            reference_speed: 120.0,
            stall_aoa: 15.0,
            max_thrust: 12.0,
            drag_factor: 12.0 * 0.45 / (120.0 * 120.0),
            terrain_elevation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trainer_trims_near_three_degrees() {
        let a = presets::trainer();
        let aoa = a.trim_aoa(120.0);
        assert!((aoa - 3.0).abs() < 0.01, "trim AoA {}", aoa);
        assert!((a.trim_throttle(120.0) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn slower_flight_needs_more_aoa() {
        let a = presets::trainer();
        assert!(a.trim_aoa(90.0) > a.trim_aoa(120.0));
        assert_eq!(a.trim_aoa(20.0), a.stall_aoa);
    }

    #[test]
    fn builder_overrides_only_given_terms() {
        let a = AirframeBuilder::new("Stiff")
            .roll(200.0, 5.0)
            .terrain_elevation(350.0)
            .build();
        assert_eq!(a.name, "Stiff");
        assert_eq!(a.roll_authority, 200.0);
        assert_eq!(a.terrain_elevation, 350.0);
        assert_eq!(a.pitch_authority, presets::trainer().pitch_authority);
    }
}
