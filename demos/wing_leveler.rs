use pilot_assist::dynamics::aircraft::AircraftState;
use pilot_assist::dynamics::state::{FlightControls, SimConfig, VesselState};
use pilot_assist::gnc::Controller;
use pilot_assist::sim;
use pilot_assist::vehicle::AirframeBuilder;

/// Proportional-derivative wing leveler on the ailerons only. Pitch, yaw and
/// throttle stay with the (absent) pilot.
struct WingLeveler {
    kp: f64,
    kd: f64,
}

impl Controller for WingLeveler {
    fn control(&mut self, state: &VesselState, _dt: f64) -> FlightControls {
        let roll = -self.kp * state.bank - self.kd * state.rates.y;
        FlightControls { roll: Some(roll.clamp(-1.0, 1.0)), ..Default::default() }
    }

    fn name(&self) -> &str {
        "WingLeveler"
    }
}

fn main() {
    let airframe = AirframeBuilder::new("Trainer, soft ailerons")
        .roll(90.0, 2.5)
        .build();

    let mut start = AircraftState::trimmed(&airframe, 1500.0, 0.0, 120.0);
    start.bank = 30.0;

    let config = SimConfig { dt: 0.02, max_time: 20.0 };
    let mut controller = WingLeveler { kp: 0.01, kd: 0.005 };

    println!("Simulating with {} controller...", controller.name());
    let (trajectory, _) = sim::fly_with(&airframe, &config, start, &mut controller);

    let Some(last) = trajectory.last() else { return };
    let settled = trajectory.iter().find(|s| s.bank.abs() < 1.0).map_or(f64::NAN, |s| s.time);

    println!("Bank within 1°: {:.1} s", settled);
    println!("Final bank: {:.2}°", last.bank);
    println!("Heading drift: {:.1}°", last.heading);
    println!("Altitude lost: {:.0} m", 1500.0 - last.altitude);
}
