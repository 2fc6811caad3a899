pub mod angle;
pub mod autopilot;
pub mod bank;
pub mod controller;
pub mod fade;
pub mod gains;
pub mod modes;
pub mod pid;
pub mod sas;
pub mod shaper;

pub use autopilot::{Autopilot, AutopilotConfig, InputLocks};
pub use bank::{ControllerBank, Role, Stage};
pub use controller::Controller;
pub use fade::Fade;
pub use gains::{BankGains, ControllerGains};
pub use modes::{Axis, HrztMode, Mode, ModeChange, ModeSwitcher, SpeedRef, ThrottleMode, Transition, VertMode};
pub use pid::{AxisController, Channel, ControllerId, DerivativeSource};
pub use sas::Stabilizer;
pub use shaper::HeadingShift;
