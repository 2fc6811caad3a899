pub mod state;
pub mod aircraft;

pub use state::{ControlState, FlightControls, SimConfig, VesselState, G0};
pub use aircraft::{derivatives, AircraftState, Deriv};
