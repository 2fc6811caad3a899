use crate::dynamics::state::VesselState;
use crate::gnc::angle::angle_diff;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Kinds of flight events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    HeadingCaptured { heading: f64 },
    AltitudeCaptured { altitude: f64 },
    SpeedCaptured { speed: f64 },
    Inverted,
    GroundContact,
    Custom(String),
}

/// A discrete event that occurred during a flight.
#[derive(Debug, Clone)]
pub struct FlightEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: VesselState,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive snapshots and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &VesselState, current: &VesselState) -> Option<EventKind>;
}

/// Run `detectors` over a recorded trajectory.
pub fn scan(trajectory: &[VesselState], detectors: &mut [Box<dyn EventDetector>]) -> Vec<FlightEvent> {
    let mut events = Vec::new();
    for pair in trajectory.windows(2) {
        for d in detectors.iter_mut() {
            if let Some(kind) = d.check(&pair[0], &pair[1]) {
                events.push(FlightEvent { time: pair[1].time, kind, state: pair[1].clone() });
            }
        }
    }
    events
}

// ---------------------------------------------------------------------------
// Capture detectors
// ---------------------------------------------------------------------------

/// A held quantity the bench can judge a response on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    Heading,
    Altitude,
    Speed,
}

impl Quantity {
    pub fn read(self, v: &VesselState) -> f64 {
        match self {
            Quantity::Heading => v.heading,
            Quantity::Altitude => v.altitude,
            Quantity::Speed => v.true_airspeed,
        }
    }

    /// Signed distance from `target`; headings take the short way round.
    pub fn error(self, target: f64, v: &VesselState) -> f64 {
        match self {
            Quantity::Heading => angle_diff(target, v.heading),
            _ => self.read(v) - target,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Quantity::Heading => "heading",
            Quantity::Altitude => "altitude",
            Quantity::Speed => "speed",
        }
    }
}

/// Fires once when a quantity first settles inside `tolerance` of `target`
/// and stays there for `dwell` seconds.
pub struct CaptureDetector {
    pub quantity: Quantity,
    pub target: f64,
    pub tolerance: f64,
    pub dwell: f64,
    entered: Option<f64>,
    fired: bool,
}

impl CaptureDetector {
    pub fn new(quantity: Quantity, target: f64, tolerance: f64, dwell: f64) -> Self {
        Self { quantity, target, tolerance, dwell, entered: None, fired: false }
    }

}

impl EventDetector for CaptureDetector {
    fn check(&mut self, _prev: &VesselState, current: &VesselState) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if self.quantity.error(self.target, current).abs() > self.tolerance {
            self.entered = None;
            return None;
        }
        let since = *self.entered.get_or_insert(current.time);
        if current.time - since < self.dwell {
            return None;
        }
        self.fired = true;
        Some(match self.quantity {
            Quantity::Heading => EventKind::HeadingCaptured { heading: current.heading },
            Quantity::Altitude => EventKind::AltitudeCaptured { altitude: current.altitude },
            Quantity::Speed => EventKind::SpeedCaptured { speed: current.true_airspeed },
        })
    }
}

/// Detects rolling past 90° of bank.
pub struct InvertedDetector;

impl EventDetector for InvertedDetector {
    fn check(&mut self, prev: &VesselState, current: &VesselState) -> Option<EventKind> {
        if !prev.is_inverted() && current.is_inverted() {
            Some(EventKind::Inverted)
        } else {
            None
        }
    }
}

/// Detects when altitude crosses a threshold (ascending or descending).
pub struct AltitudeDetector {
    pub altitude: f64,
    pub ascending: bool,
    fired: bool,
}

impl AltitudeDetector {
    pub fn new(altitude: f64, ascending: bool) -> Self {
        Self { altitude, ascending, fired: false }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&mut self, prev: &VesselState, current: &VesselState) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let crossed = if self.ascending {
            prev.altitude < self.altitude && current.altitude >= self.altitude
        } else {
            prev.altitude > self.altitude && current.altitude <= self.altitude
        };
        if crossed {
            self.fired = true;
            Some(EventKind::Custom(format!(
                "Altitude {:.0}m ({})",
                self.altitude,
                if self.ascending { "climbing" } else { "descending" }
            )))
        } else {
            None
        }
    }
}

/// Detects touching the terrain.
pub struct GroundDetector;

impl EventDetector for GroundDetector {
    fn check(&mut self, prev: &VesselState, current: &VesselState) -> Option<EventKind> {
        if prev.radar_altitude > 0.0 && current.radar_altitude <= 0.0 {
            Some(EventKind::GroundContact)
        } else {
            None
        }
    }
}
