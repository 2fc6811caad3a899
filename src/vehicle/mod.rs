pub mod airframe;

pub use airframe::{presets, Airframe, AirframeBuilder};
