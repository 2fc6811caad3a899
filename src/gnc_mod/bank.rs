use std::ops::{Index, IndexMut};

use super::gains::{defaults, BankGains};
use super::pid::{AxisController, ControllerId};

// ---------------------------------------------------------------------------
// Controller roles
// ---------------------------------------------------------------------------

/// The nine PID stages of the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Heading error → bank angle target.
    HdgBank,
    /// Bank angle → sideslip target (turn coordination).
    BankToYaw,
    /// Bank angle → roll deflection.
    Aileron,
    /// Sideslip → yaw deflection.
    Rudder,
    /// Altitude → vertical speed target.
    Altitude,
    /// Vertical speed → angle of attack target.
    VertSpeed,
    /// Angle of attack (or pitch) → pitch deflection.
    Elevator,
    /// Airspeed → acceleration target.
    Speed,
    /// Acceleration → throttle.
    Acceleration,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::HdgBank,
        Role::BankToYaw,
        Role::Aileron,
        Role::Rudder,
        Role::Altitude,
        Role::VertSpeed,
        Role::Elevator,
        Role::Speed,
        Role::Acceleration,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Cascade stage description
// ---------------------------------------------------------------------------

/// One link of a cascade: which controller runs and what it measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub role: Role,
    pub input: f64,
    /// Measured rate for `DirectRate` controllers.
    pub rate: Option<f64>,
    /// Negate this stage's output before handing it on (inverted flight).
    pub mirror: bool,
}

impl Stage {
    pub fn new(role: Role, input: f64) -> Self {
        Self { role, input, rate: None, mirror: false }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn mirrored(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }
}

// ---------------------------------------------------------------------------
// ControllerBank
// ---------------------------------------------------------------------------

/// Owns every autopilot PID stage, one per [`Role`].
///
/// Controllers never see each other; [`ControllerBank::cascade`] copies each
/// stage's output into the next stage's setpoint.
#[derive(Debug, Clone)]
pub struct ControllerBank {
    controllers: [AxisController; 9],
}

impl ControllerBank {
    pub fn new() -> Self {
        Self::with_gains(&BankGains::default())
    }

    pub fn with_gains(gains: &BankGains) -> Self {
        let controllers = Role::ALL.map(|role| {
            let c = AxisController::new(ControllerId::Bank(role), *gains.get(role));
            match role {
                Role::HdgBank => c.with_heading().with_inverted_output(true),
                // positive bank asks for positive sideslip target
                Role::BankToYaw => c,
                _ => c.with_inverted_output(true),
            }
        });
        Self { controllers }
    }

    pub fn get(&self, role: Role) -> &AxisController {
        &self.controllers[role.index()]
    }

    pub fn get_mut(&mut self, role: Role) -> &mut AxisController {
        &mut self.controllers[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &AxisController)> {
        Role::ALL.iter().copied().zip(self.controllers.iter())
    }

    /// Run `stages` in order. Each stage's response becomes the next stage's
    /// setpoint for this same tick; the last stage's response is returned
    /// unclamped to any actuator range.
    ///
    /// An empty chain yields 0.
    pub fn cascade(&mut self, stages: &[Stage], use_integral: bool, dt: f64) -> f64 {
        let mut output = 0.0;
        for (i, stage) in stages.iter().enumerate() {
            let controller = self.get_mut(stage.role);
            output = match stage.rate {
                Some(rate) => controller.response_with_rate(stage.input, rate, use_integral, dt),
                None => controller.response(stage.input, use_integral, dt),
            };
            if stage.mirror {
                output = -output;
            }
            if let Some(next) = stages.get(i + 1) {
                self.get_mut(next.role).update_setpoint(output, false, 0.0);
            }
        }
        output
    }

    pub fn clear(&mut self, roles: &[Role]) {
        for &role in roles {
            self.get_mut(role).clear();
        }
    }

    pub fn skip_derivative(&mut self, roles: &[Role]) {
        for &role in roles {
            self.get_mut(role).skip_derivative();
        }
    }

    pub fn clear_all(&mut self) {
        self.clear(&Role::ALL);
    }

    pub fn gains(&self) -> BankGains {
        BankGains(Role::ALL.map(|role| self.get(role).gains()))
    }

    pub fn apply_gains(&mut self, gains: &BankGains) {
        for role in Role::ALL {
            self.get_mut(role).set_gains(*gains.get(role));
        }
    }

    /// Restore one controller to its stock tuning.
    pub fn reset_gains(&mut self, role: Role) {
        self.get_mut(role).set_gains(defaults::for_role(role));
    }
}

impl Default for ControllerBank {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Role> for ControllerBank {
    type Output = AxisController;

    fn index(&self, role: Role) -> &AxisController {
        self.get(role)
    }
}

impl IndexMut<Role> for ControllerBank {
    fn index_mut(&mut self, role: Role) -> &mut AxisController {
        self.get_mut(role)
    }
}
