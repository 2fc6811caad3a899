use crate::dynamics::state::{FlightControls, VesselState};

/// Trait for flight controllers.
///
/// Implement this to plug a custom control law into the simulation loop.
/// Channels left as `None` stay with the pilot.
pub trait Controller {
    /// Compute actuator commands from the current vessel snapshot.
    fn control(&mut self, state: &VesselState, dt: f64) -> FlightControls;

    /// Reset controller internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
