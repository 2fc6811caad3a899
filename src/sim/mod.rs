pub mod integrator;
pub mod runner;
pub mod event;
pub mod scenario;

pub use runner::{fly_scripted, fly_with};
pub use integrator::rk4_step;
pub use scenario::{Command, Script};
