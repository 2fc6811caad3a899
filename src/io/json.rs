use std::io::{self, Write};

use crate::dynamics::state::{FlightControls, VesselState};
use crate::sim::event::Quantity;

/// How a held quantity responded to a step in its target.
#[derive(Debug, Clone)]
pub struct ResponseSummary {
    pub quantity: Quantity,
    pub target: f64,
    pub initial: f64,
    /// Largest excursion past the target, in the quantity's units.
    pub overshoot: f64,
    /// First time after which the error stays inside the band; `None` if
    /// the response never settles.
    pub settling_time: Option<f64>,
    pub final_error: f64,
    /// Largest surface deflection commanded, any axis.
    pub peak_deflection: f64,
}

impl ResponseSummary {
    /// Judge a recorded flight against `target` with a settling band of
    /// `band` (same units as the quantity).
    pub fn from_flight(
        trajectory: &[VesselState],
        commands: &[FlightControls],
        quantity: Quantity,
        target: f64,
        band: f64,
    ) -> Self {
        let (initial, initial_error) = trajectory
            .first()
            .map(|s| (quantity.read(s), quantity.error(target, s)))
            .unwrap_or((target, 0.0));
        // approaching from below means overshoot is a positive error
        let direction = -initial_error.signum();

        let overshoot = trajectory
            .iter()
            .map(|s| direction * quantity.error(target, s))
            .fold(0.0_f64, f64::max);

        let settling_time = trajectory
            .iter()
            .rposition(|s| quantity.error(target, s).abs() > band)
            .map_or(trajectory.first().map(|s| s.time), |i| {
                trajectory.get(i + 1).map(|s| s.time)
            });

        let final_error = trajectory
            .last()
            .map(|s| quantity.error(target, s))
            .unwrap_or(0.0);

        let peak_deflection = commands
            .iter()
            .flat_map(|c| [c.pitch, c.roll, c.yaw])
            .flatten()
            .map(f64::abs)
            .fold(0.0_f64, f64::max);

        ResponseSummary {
            quantity,
            target,
            initial,
            overshoot,
            settling_time,
            final_error,
            peak_deflection,
        }
    }
}

fn number_or_null(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => "null".into(),
    }
}

/// Write a tuning report as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    airframe: &str,
    responses: &[ResponseSummary],
) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"airframe\": \"{}\",", airframe.replace('"', "\\\""))?;
    writeln!(writer, "  \"responses\": [")?;
    for (i, r) in responses.iter().enumerate() {
        writeln!(writer, "    {{")?;
        writeln!(writer, "      \"quantity\": \"{}\",", r.quantity.name())?;
        writeln!(writer, "      \"target\": {:.2},", r.target)?;
        writeln!(writer, "      \"initial\": {:.2},", r.initial)?;
        writeln!(writer, "      \"overshoot\": {:.3},", r.overshoot)?;
        writeln!(writer, "      \"settling_time_s\": {},", number_or_null(r.settling_time))?;
        writeln!(writer, "      \"final_error\": {:.4},", r.final_error)?;
        writeln!(writer, "      \"peak_deflection\": {:.3}", r.peak_deflection)?;
        let sep = if i + 1 < responses.len() { "," } else { "" };
        writeln!(writer, "    }}{}", sep)?;
    }
    writeln!(writer, "  ]")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write a tuning report JSON to a file.
pub fn write_summary_file(
    path: &str,
    airframe: &str,
    responses: &[ResponseSummary],
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, airframe, responses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn altitude_step() -> Vec<VesselState> {
        [(0.0, 1000.0), (1.0, 1150.0), (2.0, 1230.0), (3.0, 1195.0), (4.0, 1201.0), (5.0, 1200.0)]
            .iter()
            .map(|&(time, altitude)| VesselState { time, altitude, ..Default::default() })
            .collect()
    }

    #[test]
    fn summary_measures_overshoot_and_settling() {
        let traj = altitude_step();
        let cmds = vec![FlightControls { pitch: Some(-0.4), roll: Some(0.1), ..Default::default() }];
        let s = ResponseSummary::from_flight(&traj, &cmds, Quantity::Altitude, 1200.0, 10.0);
        assert!((s.overshoot - 30.0).abs() < 1e-9);
        assert_eq!(s.settling_time, Some(3.0));
        assert_eq!(s.final_error, 0.0);
        assert!((s.peak_deflection - 0.4).abs() < 1e-12);
    }

    #[test]
    fn descent_overshoot_is_measured_downward() {
        let traj: Vec<VesselState> = [(0.0, 500.0), (1.0, 390.0), (2.0, 400.0)]
            .iter()
            .map(|&(time, altitude)| VesselState { time, altitude, ..Default::default() })
            .collect();
        let s = ResponseSummary::from_flight(&traj, &[], Quantity::Altitude, 400.0, 1.0);
        assert!((s.overshoot - 10.0).abs() < 1e-9);
        assert_eq!(s.settling_time, Some(2.0));
    }

    #[test]
    fn json_output_is_valid() {
        let traj = altitude_step();
        let summary = ResponseSummary::from_flight(&traj, &[], Quantity::Altitude, 1200.0, 1.0);
        let never = ResponseSummary { settling_time: None, ..summary.clone() };

        let mut buf = Vec::new();
        write_summary(&mut buf, "Trainer", &[summary, never]).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("\"airframe\": \"Trainer\""));
        assert!(json.contains("\"overshoot\""));
        assert!(json.contains("\"settling_time_s\": null"));
        assert_eq!(json.matches('{').count(), json.matches('}').count());
    }
}
