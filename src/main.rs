use std::env;

use log::{error, LevelFilter};

use pilot_assist::dynamics::aircraft::AircraftState;
use pilot_assist::gnc::{Autopilot, AutopilotConfig, Axis};
use pilot_assist::io::{csv, json, logger};
use pilot_assist::io::json::ResponseSummary;
use pilot_assist::sim::{self, scenario};
use pilot_assist::sim::event::{
    self, AltitudeDetector, CaptureDetector, EventDetector, GroundDetector, InvertedDetector, Quantity,
};
use pilot_assist::types::{SimConfig, VesselState};
use pilot_assist::vehicle::presets;

fn main() {
    if let Err(e) = logger::init(LevelFilter::Info) {
        eprintln!("logger unavailable: {}", e);
    }

    // Optional outputs: pilot-assist [telemetry.csv] [summary.json]
    let mut args = env::args().skip(1);
    let csv_path = args.next();
    let json_path = args.next();

    // -----------------------------------------------------------------------
    // Airframe and initial condition: trimmed cruise, 1000 m, heading 090
    // -----------------------------------------------------------------------
    let airframe = presets::trainer();
    let start = AircraftState::trimmed(&airframe, 1000.0, 90.0, 120.0);

    let config = SimConfig {
        dt: 0.02,
        max_time: 420.0,
    };

    // -----------------------------------------------------------------------
    // Run the scripted flight
    // -----------------------------------------------------------------------
    let mut autopilot = Autopilot::new(AutopilotConfig::default());
    let mut script = scenario::cross_country();
    let (trajectory, commands) = sim::fly_scripted(&airframe, &config, start, &mut autopilot, |ap, v| {
        script.apply(ap, v)
    });

    // -----------------------------------------------------------------------
    // Analyze trajectory
    // -----------------------------------------------------------------------
    let Some(final_state) = trajectory.last() else {
        error!("flight produced no samples");
        return;
    };
    let max_bank = trajectory.iter().map(|s| s.bank.abs()).fold(0.0_f64, f64::max);
    let max_slip = trajectory.iter().map(|s| s.sideslip.abs()).fold(0.0_f64, f64::max);
    let (min_alt, max_alt) = trajectory
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| (lo.min(s.altitude), hi.max(s.altitude)));

    // the opening leg, before the descent is commanded
    let first_leg: Vec<VesselState> = trajectory.iter().filter(|s| s.time < 150.0).cloned().collect();
    let first_cmds = &commands[..first_leg.len().min(commands.len())];
    let responses = [
        ResponseSummary::from_flight(&first_leg, first_cmds, Quantity::Heading, 120.0, 1.0),
        ResponseSummary::from_flight(&first_leg, first_cmds, Quantity::Altitude, 1200.0, 10.0),
        ResponseSummary::from_flight(&first_leg, first_cmds, Quantity::Speed, 130.0, 1.0),
    ];

    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(CaptureDetector::new(Quantity::Heading, 120.0, 1.0, 5.0)),
        Box::new(CaptureDetector::new(Quantity::Altitude, 1200.0, 10.0, 5.0)),
        Box::new(CaptureDetector::new(Quantity::Speed, 130.0, 1.0, 5.0)),
        Box::new(CaptureDetector::new(Quantity::Heading, 10.0, 1.0, 5.0)),
        Box::new(AltitudeDetector::new(1100.0, false)),
        Box::new(InvertedDetector),
        Box::new(GroundDetector),
    ];
    let events = event::scan(&trajectory, &mut detectors);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  AUTOPILOT FLIGHT REPORT: {}", airframe.name);
    println!("====================================================================");
    println!();
    println!("  Airframe");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Roll auth:     {:>8.1} deg/s²   Roll damping:  {:>6.2} 1/s",
        airframe.roll_authority, airframe.roll_damping
    );
    println!(
        "  Pitch auth:    {:>8.1} deg/s²   Pitch damping: {:>6.2} 1/s",
        airframe.pitch_authority, airframe.pitch_damping
    );
    println!(
        "  Cruise:        {:>8.1} m/s      Trim AoA:      {:>6.2} deg",
        airframe.reference_speed,
        airframe.trim_aoa(airframe.reference_speed)
    );
    println!(
        "  Trim throttle: {:>8.1} %        Stall AoA:     {:>6.1} deg",
        airframe.trim_throttle(airframe.reference_speed) * 100.0,
        airframe.stall_aoa
    );
    println!();

    println!("  Autopilot Modes at End of Flight");
    println!("  ──────────────────────────────────────────────────────────────────");
    for axis in Axis::ALL {
        let modes = autopilot.modes();
        println!(
            "  {:<11} {:<22} {:>10}   {}",
            format!("{:?}", axis),
            format!("{:?}", modes.mode(axis)),
            modes.target_display(axis),
            if modes.is_active(axis) { "ENGAGED" } else { "off" }
        );
    }
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    if events.is_empty() {
        println!("  (none)");
    }
    for e in &events {
        println!(
            "  t={:>6.1}s   {:<40}   alt={:>7.1}m   hdg={:>5.1}",
            e.time,
            format!("{:?}", e.kind),
            e.state.altitude,
            e.state.heading
        );
    }
    println!();

    println!("  Opening Leg Response");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:<9} {:>8} {:>10} {:>11} {:>11} {:>10}",
        "quantity", "target", "overshoot", "settle (s)", "final err", "peak defl"
    );
    for r in &responses {
        println!(
            "  {:<9} {:>8.1} {:>10.2} {:>11} {:>11.3} {:>10.3}",
            r.quantity.name(),
            r.target,
            r.overshoot,
            r.settling_time.map_or("never".to_string(), |t| format!("{:.1}", t)),
            r.final_error,
            r.peak_deflection
        );
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Max bank:      {:>8.1} deg", max_bank);
    println!("  Max sideslip:  {:>8.2} deg", max_slip);
    println!("  Altitude band: {:>8.0} .. {:.0} m", min_alt, max_alt);
    println!("  Flight time:   {:>8.1} s", final_state.time);
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>7}  {:>8}  {:>7}  {:>6}  {:>7}  {:>7}  {:>5}",
        "t (s)", "hdg", "alt (m)", "v (m/s)", "bank", "vs", "elev", "thr"
    );
    println!("  {}", "─".repeat(66));

    let sample_interval = (trajectory.len() / 30).max(1);
    for (i, s) in trajectory.iter().enumerate() {
        if i % sample_interval != 0 && i != trajectory.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.1}  {:>7.1}  {:>8.1}  {:>7.1}  {:>6.1}  {:>7.2}  {:>7.3}  {:>5.2}",
            s.time,
            s.heading,
            s.altitude,
            s.true_airspeed,
            s.bank,
            s.vertical_speed,
            s.controls.pitch,
            s.controls.throttle
        );
    }

    println!();
    println!("  Simulation: {} steps, dt={} s", trajectory.len(), config.dt);
    println!("====================================================================");
    println!();

    if let Some(path) = csv_path {
        if let Err(e) = csv::write_telemetry_file(&path, &trajectory, &commands) {
            error!("could not write {}: {}", path, e);
        }
    }
    if let Some(path) = json_path {
        if let Err(e) = json::write_summary_file(&path, &airframe.name, &responses) {
            error!("could not write {}: {}", path, e);
        }
    }
}
