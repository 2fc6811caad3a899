use std::io::{self, Write};

use crate::dynamics::state::{FlightControls, VesselState};

fn channel(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

/// Write per-tick telemetry to CSV format.
///
/// Columns: time, heading, pitch, bank, sideslip, aoa, vspeed, altitude,
///          radar_alt, tas, ias, accel, q_rate, p_rate, r_rate,
///          cmd_pitch, cmd_roll, cmd_yaw, cmd_throttle
///
/// Command columns are empty on ticks where the channel was released.
pub fn write_telemetry<W: Write>(
    writer: &mut W,
    trajectory: &[VesselState],
    commands: &[FlightControls],
) -> io::Result<()> {
    writeln!(
        writer,
        "time,heading,pitch,bank,sideslip,aoa,vspeed,altitude,\
         radar_alt,tas,ias,accel,q_rate,p_rate,r_rate,\
         cmd_pitch,cmd_roll,cmd_yaw,cmd_throttle"
    )?;

    for (i, s) in trajectory.iter().enumerate() {
        let cmd = commands.get(i).copied().unwrap_or_default();
        writeln!(
            writer,
            "{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.2},\
             {:.2},{:.3},{:.3},{:.4},{:.4},{:.4},{:.4},\
             {},{},{},{}",
            s.time,
            s.heading, s.pitch, s.bank, s.sideslip, s.angle_of_attack,
            s.vertical_speed, s.altitude, s.radar_altitude,
            s.true_airspeed, s.indicated_airspeed, s.acceleration,
            s.rates.x, s.rates.y, s.rates.z,
            channel(cmd.pitch), channel(cmd.roll), channel(cmd.yaw), channel(cmd.throttle),
        )?;
    }

    Ok(())
}

/// Write telemetry to a CSV file at the given path.
pub fn write_telemetry_file(
    path: &str,
    trajectory: &[VesselState],
    commands: &[FlightControls],
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_telemetry(&mut file, trajectory, commands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_output_has_header_and_rows() {
        let traj = vec![
            VesselState { time: 0.0, altitude: 1000.0, ..Default::default() },
            VesselState { time: 0.02, altitude: 1000.5, ..Default::default() },
        ];
        let cmds = vec![
            FlightControls::default(),
            FlightControls { pitch: Some(0.1), throttle: Some(0.5), ..Default::default() },
        ];

        let mut buf = Vec::new();
        write_telemetry(&mut buf, &traj, &cmds).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].starts_with("0.000,"));
        assert!(lines[1].ends_with(",,,"));
        assert!(lines[2].ends_with("0.1000,,,0.5000"));
        let columns = lines[0].split(',').count();
        assert!(lines.iter().all(|l| l.split(',').count() == columns));
    }
}
