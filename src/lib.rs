pub mod dynamics;
pub mod vehicle;
mod gnc_mod;
pub mod sim;
pub mod io;
pub mod error;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

// Flat re-exports for the common types
pub mod types {
    pub use crate::dynamics::state::{ControlState, FlightControls, SimConfig, VesselState, G0};
    pub use crate::dynamics::aircraft::AircraftState;
    pub use crate::vehicle::Airframe;
}
