#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::GainsError;
use super::bank::Role;

// ---------------------------------------------------------------------------
// Controller gains: the nine-number configuration tuple
// ---------------------------------------------------------------------------

/// Tunable configuration of one PID stage.
///
/// The array layout `[kp, ki, kd, out_min, out_max, i_min, i_max, scalar,
/// easing]` is the order presets are stored in and must not change.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub out_min: f64,
    pub out_max: f64,
    pub i_min: f64,
    pub i_max: f64,
    pub scalar: f64,
    pub easing: f64,
}

impl ControllerGains {
    /// Number of values in the flat representation.
    pub const LEN: usize = 9;

    pub const fn from_array(v: [f64; 9]) -> Self {
        Self {
            kp: v[0],
            ki: v[1],
            kd: v[2],
            out_min: v[3],
            out_max: v[4],
            i_min: v[5],
            i_max: v[6],
            scalar: v[7],
            easing: v[8],
        }
    }

    pub fn to_array(&self) -> [f64; 9] {
        [
            self.kp, self.ki, self.kd,
            self.out_min, self.out_max,
            self.i_min, self.i_max,
            self.scalar, self.easing,
        ]
    }

    /// Parse gains from an untrusted slice (e.g. values read by a preset loader).
    pub fn from_slice(values: &[f64]) -> Result<Self, GainsError> {
        if values.len() != Self::LEN {
            return Err(GainsError::Length { expected: Self::LEN, found: values.len() });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(GainsError::NonFinite { index });
        }
        let mut arr = [0.0; 9];
        arr.copy_from_slice(values);
        Ok(Self::from_array(arr))
    }
}

impl Default for ControllerGains {
    fn default() -> Self {
        Self::from_array([1.0, 0.0, 0.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0])
    }
}

// ---------------------------------------------------------------------------
// Gains for the whole controller bank
// ---------------------------------------------------------------------------

/// One `ControllerGains` per bank role, in `Role::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BankGains(pub [ControllerGains; 9]);

impl BankGains {
    pub fn get(&self, role: Role) -> &ControllerGains {
        &self.0[role.index()]
    }

    pub fn set(&mut self, role: Role, gains: ControllerGains) {
        self.0[role.index()] = gains;
    }

    /// Flatten to `9 x 9` numbers, role by role.
    pub fn to_flat(&self) -> Vec<f64> {
        self.0.iter().flat_map(|g| g.to_array()).collect()
    }

    pub fn from_flat(values: &[f64]) -> Result<Self, GainsError> {
        let expected = ControllerGains::LEN * Role::ALL.len();
        if values.len() != expected {
            return Err(GainsError::Length { expected, found: values.len() });
        }
        let mut out = Self::default();
        for (i, chunk) in values.chunks(ControllerGains::LEN).enumerate() {
            out.0[i] = ControllerGains::from_slice(chunk).map_err(|e| match e {
                GainsError::NonFinite { index } => GainsError::NonFinite {
                    index: i * ControllerGains::LEN + index,
                },
                other => other,
            })?;
        }
        Ok(out)
    }
}

impl Default for BankGains {
    fn default() -> Self {
        BankGains(Role::ALL.map(defaults::for_role))
    }
}

// ---------------------------------------------------------------------------
// Default tuning
// ---------------------------------------------------------------------------

/// Stock gains, tuned against the bench airframe (`vehicle::presets::trainer`).
pub mod defaults {
    use super::{ControllerGains, Role};

    //                                              kp     ki     kd   out_min out_max i_min  i_max scalar easing
    pub const HDG_BANK: ControllerGains = ControllerGains::from_array([2.0, 0.1, 0.0, -30.0, 30.0, -0.5, 0.5, 1.0, 1.0]);
    pub const BANK_TO_YAW: ControllerGains = ControllerGains::from_array([0.0, 0.0, 0.01, -2.0, 2.0, -0.5, 0.5, 1.0, 1.0]);
    pub const AILERON: ControllerGains = ControllerGains::from_array([0.02, 0.005, 0.01, -1.0, 1.0, -0.4, 0.4, 1.0, 1.0]);
    pub const RUDDER: ControllerGains = ControllerGains::from_array([0.1, 0.08, 0.05, -1.0, 1.0, -0.4, 0.4, 1.0, 1.0]);
    pub const ALTITUDE: ControllerGains = ControllerGains::from_array([0.1, 0.002, 0.0, -15.0, 15.0, -15.0, 15.0, 1.0, 100.0]);
    pub const VERT_SPEED: ControllerGains = ControllerGains::from_array([2.0, 0.5, 0.5, -5.0, 12.0, -10.0, 10.0, 10.0, 10.0]);
    pub const ELEVATOR: ControllerGains = ControllerGains::from_array([0.2, 0.1, 0.1, -1.0, 1.0, -0.5, 0.5, 1.0, 1.0]);
    pub const SPEED: ControllerGains = ControllerGains::from_array([0.2, 0.02, 0.0, -5.0, 5.0, -2.0, 2.0, 1.0, 10.0]);
    pub const ACCELERATION: ControllerGains = ControllerGains::from_array([0.05, 0.1, 0.0, 0.0, 1.0, -1.0, 1.0, 1.0, 10.0]);

    // stability augmentation, PID on attitude error with gyro-rate damping
    pub const SAS_PITCH: ControllerGains = ControllerGains::from_array([0.2, 0.1, 0.1, -1.0, 1.0, -0.5, 0.5, 1.0, 1.0]);
    pub const SAS_ROLL: ControllerGains = ControllerGains::from_array([0.05, 0.01, 0.02, -1.0, 1.0, -0.4, 0.4, 1.0, 1.0]);
    pub const SAS_YAW: ControllerGains = ControllerGains::from_array([0.05, 0.0, 0.05, -1.0, 1.0, -0.4, 0.4, 1.0, 1.0]);

    pub fn for_role(role: Role) -> ControllerGains {
        match role {
            Role::HdgBank => HDG_BANK,
            Role::BankToYaw => BANK_TO_YAW,
            Role::Aileron => AILERON,
            Role::Rudder => RUDDER,
            Role::Altitude => ALTITUDE,
            Role::VertSpeed => VERT_SPEED,
            Role::Elevator => ELEVATOR,
            Role::Speed => SPEED,
            Role::Acceleration => ACCELERATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_layout_is_stable() {
        let g = ControllerGains::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(g.kp, 1.0);
        assert_eq!(g.out_max, 5.0);
        assert_eq!(g.i_min, 6.0);
        assert_eq!(g.easing, 9.0);
        assert_eq!(g.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = ControllerGains::from_slice(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, GainsError::Length { expected: 9, found: 2 });
    }

    #[test]
    fn from_slice_rejects_nan() {
        let mut v = defaults::AILERON.to_array();
        v[4] = f64::NAN;
        assert_eq!(
            ControllerGains::from_slice(&v).unwrap_err(),
            GainsError::NonFinite { index: 4 }
        );
    }

    #[test]
    fn bank_gains_flat_reports_absolute_index() {
        let mut flat = BankGains::default().to_flat();
        assert_eq!(flat.len(), 81);
        flat[20] = f64::INFINITY;
        assert_eq!(BankGains::from_flat(&flat).unwrap_err(), GainsError::NonFinite { index: 20 });
    }

    #[test]
    fn bank_gains_indexed_by_role() {
        let gains = BankGains::default();
        assert_eq!(*gains.get(Role::Elevator), defaults::ELEVATOR);
        assert_eq!(*gains.get(Role::Speed), defaults::SPEED);
    }
}
