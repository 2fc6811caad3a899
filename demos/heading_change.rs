use pilot_assist::dynamics::aircraft::AircraftState;
use pilot_assist::dynamics::state::SimConfig;
use pilot_assist::gnc::{Autopilot, HrztMode, Mode, ThrottleMode, VertMode};
use pilot_assist::io::csv;
use pilot_assist::io::json::{self, ResponseSummary};
use pilot_assist::sim::event::Quantity;
use pilot_assist::sim::{self, Command, Script};
use pilot_assist::vehicle::presets;

fn main() {
    let airframe = presets::trainer();
    let config = SimConfig { dt: 0.02, max_time: 200.0 };
    let start = AircraftState::trimmed(&airframe, 1000.0, 90.0, 120.0);

    // hold altitude and speed, turn the long way onto 250
    let mut script = Script::new()
        .at(0.0, Command::Engage(Mode::Vertical(VertMode::Altitude), None))
        .at(0.0, Command::Engage(Mode::Throttle(ThrottleMode::Speed), None))
        .at(0.0, Command::Engage(Mode::Horizontal(HrztMode::HeadingNum), Some(250.0)));

    println!("Simulating {} heading change ...", airframe.name);
    let mut autopilot = Autopilot::default();
    let (trajectory, commands) =
        sim::fly_scripted(&airframe, &config, start, &mut autopilot, |ap, v| script.apply(ap, v));

    let summary = ResponseSummary::from_flight(&trajectory, &commands, Quantity::Heading, 250.0, 1.0);
    let max_bank = trajectory.iter().map(|s| s.bank.abs()).fold(0.0_f64, f64::max);
    println!("Settled within 1°: {}", summary.settling_time.map_or("never".into(), |t| format!("{:.1} s", t)));
    println!("Overshoot: {:.2}°", summary.overshoot);
    println!("Max bank: {:.1}°", max_bank);

    csv::write_telemetry_file("heading_change_telemetry.csv", &trajectory, &commands)
        .expect("Failed to write CSV");
    json::write_summary_file("heading_change_summary.json", &airframe.name, &[summary])
        .expect("Failed to write JSON");

    println!("Exported: heading_change_telemetry.csv, heading_change_summary.json");
}
