use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use pilot_assist::dynamics::aircraft::AircraftState;
use pilot_assist::dynamics::state::{FlightControls, SimConfig, VesselState};
use pilot_assist::gnc::Autopilot;
use pilot_assist::sim::{self, scenario};
use pilot_assist::vehicle::{presets, Airframe};

fn main() -> eframe::Result {
    let airframe = presets::trainer();
    let config = SimConfig { dt: 0.02, max_time: 420.0 };
    let start = AircraftState::trimmed(&airframe, 1000.0, 90.0, 120.0);

    let mut autopilot = Autopilot::default();
    let mut script = scenario::cross_country();
    let (trajectory, commands) = sim::fly_scripted(&airframe, &config, start, &mut autopilot, |ap, v| {
        script.apply(ap, v)
    });

    let app = FlightViz { trajectory, commands, airframe };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Autopilot Flight Bench", options, Box::new(|_| Ok(Box::new(app))))
}

struct FlightViz {
    trajectory: Vec<VesselState>,
    commands: Vec<FlightControls>,
    airframe: Airframe,
}

fn series<T>(samples: &[(f64, T)], f: impl Fn(&T) -> Option<f64>) -> PlotPoints<'static> {
    samples
        .iter()
        .filter_map(|(t, s)| f(s).map(|y| [*t, y]))
        .collect()
}

impl eframe::App for FlightViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.trajectory.len() / 2000).max(1);
        let sampled: Vec<(f64, &VesselState)> =
            self.trajectory.iter().step_by(step).map(|s| (s.time, s)).collect();
        let cmds: Vec<(f64, &FlightControls)> = self
            .trajectory
            .iter()
            .zip(&self.commands)
            .step_by(step)
            .map(|(s, c)| (s.time, c))
            .collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Airframe: {}", self.airframe.name));
            let max_bank = self.trajectory.iter().map(|s| s.bank.abs()).fold(0.0_f64, f64::max);
            let max_alt = self.trajectory.iter().map(|s| s.altitude).fold(0.0_f64, f64::max);
            ui.label(format!(
                "Max bank: {:.1}°  |  Max altitude: {:.0} m  |  Flight: {:.0} s",
                max_bank,
                max_alt,
                self.trajectory.last().map_or(0.0, |s| s.time),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Heading and bank vs Time
                ui.vertical(|ui| {
                    ui.label("Heading / Bank (deg)");
                    Plot::new("heading")
                        .width(half_w)
                        .height(half_h)
                        .legend(Legend::default())
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Heading", series(&sampled, |s| Some(s.heading))));
                            plot_ui.line(Line::new("Bank", series(&sampled, |s| Some(s.bank))));
                        });
                });

                // Altitude vs Time
                ui.vertical(|ui| {
                    ui.label("Altitude (m)");
                    Plot::new("altitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Altitude", series(&sampled, |s| Some(s.altitude))));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Airspeed vs Time
                ui.vertical(|ui| {
                    ui.label("Airspeed (m/s)");
                    Plot::new("speed")
                        .width(half_w)
                        .height(half_h)
                        .legend(Legend::default())
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("TAS", series(&sampled, |s| Some(s.true_airspeed))));
                            plot_ui.line(Line::new("IAS", series(&sampled, |s| Some(s.indicated_airspeed))));
                        });
                });

                // Commands vs Time; gaps where a channel was released
                ui.vertical(|ui| {
                    ui.label("Commands");
                    Plot::new("commands")
                        .width(half_w)
                        .height(half_h)
                        .legend(Legend::default())
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Elevator", series(&cmds, |c| c.pitch)));
                            plot_ui.line(Line::new("Aileron", series(&cmds, |c| c.roll)));
                            plot_ui.line(Line::new("Rudder", series(&cmds, |c| c.yaw)));
                            plot_ui.line(Line::new("Throttle", series(&cmds, |c| c.throttle)));
                        });
                });
            });
        });
    }
}
