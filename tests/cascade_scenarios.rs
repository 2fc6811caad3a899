use pilot_assist::dynamics::aircraft::AircraftState;
use pilot_assist::dynamics::state::{FlightControls, SimConfig, VesselState};
use pilot_assist::gnc::angle::wrap_180;
use pilot_assist::gnc::{Autopilot, Axis, Channel, HrztMode, Mode, Stabilizer, ThrottleMode, VertMode};
use pilot_assist::io::json::ResponseSummary;
use pilot_assist::sim::event::{self, CaptureDetector, EventDetector, EventKind, Quantity};
use pilot_assist::sim::{self, Command, Script};
use pilot_assist::vehicle::{presets, AirframeBuilder};

const HEADING: Mode = Mode::Horizontal(HrztMode::Heading);
const HEADING_NUM: Mode = Mode::Horizontal(HrztMode::HeadingNum);
const BANK: Mode = Mode::Horizontal(HrztMode::Bank);
const ALTITUDE: Mode = Mode::Vertical(VertMode::Altitude);
const VSPEED: Mode = Mode::Vertical(VertMode::VSpeed);
const RADAR: Mode = Mode::Vertical(VertMode::RadarAltitude);
const SPEED: Mode = Mode::Throttle(ThrottleMode::Speed);

fn config(max_time: f64) -> SimConfig {
    SimConfig { dt: 0.02, max_time }
}

fn fly(script: Script, start: AircraftState, max_time: f64) -> (Vec<VesselState>, Vec<FlightControls>) {
    let airframe = presets::trainer();
    let mut autopilot = Autopilot::default();
    let mut script = script;
    sim::fly_scripted(&airframe, &config(max_time), start, &mut autopilot, |ap, v| script.apply(ap, v))
}

fn cruise(heading: f64) -> AircraftState {
    AircraftState::trimmed(&presets::trainer(), 1000.0, heading, 120.0)
}

fn max_abs(traj: &[VesselState], f: impl Fn(&VesselState) -> f64) -> f64 {
    traj.iter().map(|s| f(s).abs()).fold(0.0_f64, f64::max)
}

#[test]
fn test_full_cascade_reaches_all_targets() {
    let script = Script::new()
        .at(0.0, Command::Engage(HEADING, Some(120.0)))
        .at(0.0, Command::Engage(ALTITUDE, Some(1200.0)))
        .at(0.0, Command::Engage(SPEED, Some(130.0)));
    let (traj, cmds) = fly(script, cruise(90.0), 300.0);

    let last = traj.last().unwrap();
    assert!(wrap_180(last.heading - 120.0).abs() < 0.5, "heading {}", last.heading);
    assert!((last.altitude - 1200.0).abs() < 1.0, "altitude {}", last.altitude);
    assert!((last.true_airspeed - 130.0).abs() < 0.5, "speed {}", last.true_airspeed);

    assert!(max_abs(&traj, |s| s.bank) < 45.0);
    assert!(max_abs(&traj, |s| s.sideslip) < 1.0);

    // every tick drove all four channels inside actuator range
    for c in &cmds[1..] {
        let pitch = c.pitch.unwrap();
        let throttle = c.throttle.unwrap();
        assert!((-1.0..=1.0).contains(&pitch));
        assert!((0.0..=1.0).contains(&throttle));
        assert!(c.roll.is_some() && c.yaw.is_some());
    }

    let speed = ResponseSummary::from_flight(&traj, &cmds, Quantity::Speed, 130.0, 1.0);
    assert!(speed.settling_time.unwrap() < 60.0);
}

#[test]
fn test_capture_in_trim_holds_state() {
    let script = Script::new()
        .at(0.0, Command::Engage(ALTITUDE, None))
        .at(0.0, Command::Engage(SPEED, None))
        .at(0.0, Command::Engage(HEADING_NUM, None));
    let (traj, cmds) = fly(script, cruise(90.0), 60.0);

    assert!(max_abs(&traj, |s| s.altitude - 1000.0) < 0.01);
    assert!(max_abs(&traj, |s| wrap_180(s.heading - 90.0)) < 0.01);
    assert!(max_abs(&traj, |s| s.true_airspeed - 120.0) < 0.01);

    // the first commands equal the trim the aircraft was flying with
    let start = cruise(90.0);
    assert!((cmds[1].pitch.unwrap() - start.controls.pitch).abs() < 1e-3);
    assert!((cmds[1].throttle.unwrap() - start.controls.throttle).abs() < 1e-3);
}

#[test]
fn test_vspeed_to_altitude_switch_is_bumpless() {
    let script = Script::new()
        .at(0.0, Command::Engage(VSPEED, Some(3.0)))
        .at(0.0, Command::Engage(SPEED, Some(120.0)))
        .at(0.0, Command::Engage(BANK, Some(0.0)))
        .at(60.0, Command::Engage(ALTITUDE, None));
    let (traj, cmds) = fly(script, cruise(90.0), 120.0);

    let k = traj.iter().position(|s| s.time >= 60.0 - 1e-9).unwrap();
    assert!((traj[k].vertical_speed - 3.0).abs() < 0.05);

    // cmds[k + 1] was computed from traj[k], right after the switch
    let before = cmds[k].pitch.unwrap();
    let after = cmds[k + 1].pitch.unwrap();
    assert!((after - before).abs() < 1e-3, "pitch jumped {} -> {}", before, after);

    // the climb stops and the captured altitude is held loosely
    let captured = traj[k].altitude;
    let last = traj.last().unwrap();
    assert!(last.vertical_speed.abs() < 1.0);
    assert!((last.altitude - captured).abs() < 30.0);
}

#[test]
fn test_heading_turn_across_north_goes_short_way() {
    let script = Script::new()
        .at(0.0, Command::Engage(HEADING, Some(10.0)))
        .at(0.0, Command::Engage(ALTITUDE, None))
        .at(0.0, Command::Engage(SPEED, None));
    let (traj, _) = fly(script, cruise(350.0), 120.0);

    let last = traj.last().unwrap();
    assert!(wrap_180(last.heading - 10.0).abs() < 0.5, "heading {}", last.heading);
    // never swung left of the starting heading
    for s in &traj {
        assert!(wrap_180(s.heading - 350.0) > -0.5, "turned wrong way at t={}", s.time);
    }
    assert!(max_abs(&traj, |s| s.altitude - 1000.0) < 15.0);
}

#[test]
fn test_heading_num_large_turn_right() {
    let script = Script::new()
        .at(0.0, Command::Engage(HEADING_NUM, Some(250.0)))
        .at(0.0, Command::Engage(ALTITUDE, None))
        .at(0.0, Command::Engage(SPEED, None));
    let (traj, _) = fly(script, cruise(90.0), 200.0);

    let last = traj.last().unwrap();
    assert!(wrap_180(last.heading - 250.0).abs() < 0.5);
    assert!(traj.iter().all(|s| wrap_180(s.heading - 90.0) > -0.5));
    assert!(traj.iter().all(|s| s.bank > -1.0));

    let mut detectors: Vec<Box<dyn EventDetector>> =
        vec![Box::new(CaptureDetector::new(Quantity::Heading, 250.0, 1.0, 2.0))];
    let events = event::scan(&traj, &mut detectors);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0].kind, EventKind::HeadingCaptured { .. }));
    assert!(events[0].time > 60.0 && events[0].time < 120.0);
}

#[test]
fn test_radar_altitude_over_raised_terrain() {
    let airframe = AirframeBuilder::new("Trainer").terrain_elevation(400.0).build();
    let start = AircraftState::trimmed(&airframe, 1000.0, 90.0, 120.0);
    let mut autopilot = Autopilot::default();
    let mut script = Script::new()
        .at(0.0, Command::Engage(RADAR, Some(500.0)))
        .at(0.0, Command::Engage(SPEED, None))
        .at(0.0, Command::Engage(BANK, Some(0.0)));
    let (traj, _) = sim::fly_scripted(&airframe, &config(300.0), start, &mut autopilot, |ap, v| {
        script.apply(ap, v)
    });

    let last = traj.last().unwrap();
    assert!((last.radar_altitude - 500.0).abs() < 1.0, "radar {}", last.radar_altitude);
    assert!((last.altitude - 900.0).abs() < 1.0);
    assert_eq!(autopilot.modes().target_display(Axis::Vertical), "500 m AGL");
}

#[test]
fn test_disengage_releases_channels() {
    let script = Script::new()
        .at(0.0, Command::Engage(ALTITUDE, None))
        .at(0.0, Command::Engage(SPEED, None))
        .at(10.0, Command::Disengage(Axis::Vertical))
        .at(10.0, Command::Disengage(Axis::Throttle));
    let (traj, cmds) = fly(script, cruise(90.0), 20.0);

    let k = traj.iter().position(|s| s.time >= 10.0 - 1e-9).unwrap();
    // elevator fades out over one second, throttle is dropped at once
    assert!(cmds[k + 1].pitch.is_some());
    assert!(cmds[k + 1].throttle.is_none());
    assert!(cmds.last().unwrap().pitch.is_none());
    // released throttle stays where the autopilot left it
    let held = traj[k].controls.throttle;
    assert!((traj.last().unwrap().controls.throttle - held).abs() < 1e-12);
}

#[test]
fn test_pause_releases_then_resumes() {
    let script = Script::new()
        .at(0.0, Command::Engage(HEADING, None))
        .at(0.0, Command::Engage(ALTITUDE, None))
        .at(0.0, Command::Engage(SPEED, None))
        .at(5.0, Command::Pause(true))
        .at(6.0, Command::Pause(false));
    let (traj, cmds) = fly(script, cruise(90.0), 30.0);

    let paused = traj.iter().position(|s| s.time >= 5.5).unwrap();
    assert!(cmds[paused + 1].is_released());
    assert!(!cmds.last().unwrap().is_released());
    assert!(max_abs(&traj, |s| s.altitude - 1000.0) < 20.0);
}

#[test]
fn test_stabilizer_holds_bank() {
    let airframe = presets::trainer();
    let mut start = AircraftState::trimmed(&airframe, 1000.0, 90.0, 120.0);
    start.bank = 10.0;

    let mut sas = Stabilizer::new();
    sas.engage(&start.snapshot(&airframe));
    assert!((sas.hold(Channel::Roll) - 10.0).abs() < 1e-12);

    let (traj, cmds) = sim::fly_with(&airframe, &config(30.0), start.clone(), &mut sas);
    for s in &traj {
        assert!((s.bank - 10.0).abs() < 0.1, "bank {} at t={}", s.bank, s.time);
        assert!((s.pitch - start.pitch).abs() < 0.05);
    }
    // throttle is never touched
    assert!(cmds.iter().all(|c| c.throttle.is_none()));
}
