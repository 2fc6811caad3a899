use log::{debug, info};

use crate::dynamics::state::{FlightControls, VesselState};
use super::controller::Controller;
use super::gains::{defaults, ControllerGains};
use super::pid::{AxisController, Channel, ControllerId, DerivativeSource};

/// Stick deflection above which the pilot owns a channel.
pub const PILOT_DEADBAND: f64 = 0.01;

const CHANNELS: [Channel; 3] = [Channel::Pitch, Channel::Roll, Channel::Yaw];

fn slot(channel: Channel) -> usize {
    match channel {
        Channel::Pitch => 0,
        Channel::Roll => 1,
        Channel::Yaw => 2,
    }
}

/// Attitude reading and gyro rate for one channel.
fn measure(channel: Channel, v: &VesselState) -> (f64, f64) {
    match channel {
        Channel::Pitch => (v.pitch, v.rates.x),
        Channel::Roll => (v.bank, v.rates.y),
        Channel::Yaw => (v.heading, v.rates.z),
    }
}

// ---------------------------------------------------------------------------
// Stabilizer: attitude hold with pilot override
// ---------------------------------------------------------------------------

/// Holds the pitch, bank and heading captured when engaged.
///
/// Each channel is a PID on attitude error whose derivative comes straight
/// from the gyros. While the pilot deflects a channel's stick that channel is
/// released; once the stick is centred again the current attitude becomes
/// the new hold.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    controllers: [AxisController; 3],
    engaged: bool,
    overridden: [bool; 3],
}

impl Stabilizer {
    pub fn new() -> Self {
        Self::with_gains([defaults::SAS_PITCH, defaults::SAS_ROLL, defaults::SAS_YAW])
    }

    /// Gains in pitch, roll, yaw order.
    pub fn with_gains(gains: [ControllerGains; 3]) -> Self {
        let controllers = [0, 1, 2].map(|i| {
            let channel = CHANNELS[i];
            let c = AxisController::new(ControllerId::Sas(channel), gains[i])
                .with_derivative(DerivativeSource::DirectRate)
                .with_inverted_output(true);
            if channel == Channel::Yaw { c.with_heading() } else { c }
        });
        Self { controllers, engaged: false, overridden: [false; 3] }
    }

    /// Capture the current attitude and start holding it.
    pub fn engage(&mut self, vessel: &VesselState) {
        let v = vessel.sanitized();
        for channel in CHANNELS {
            self.capture(channel, &v);
        }
        let trim = [v.controls.pitch, v.controls.roll, v.controls.yaw];
        for (c, t) in self.controllers.iter_mut().zip(trim) {
            c.preset_to(t, false);
            c.set_active(true);
        }
        self.overridden = [false; 3];
        self.engaged = true;
        info!(
            "SAS engaged: pitch {:.1} bank {:.1} heading {:.1}",
            v.pitch, v.bank, v.heading
        );
    }

    pub fn disengage(&mut self) {
        for c in self.controllers.iter_mut() {
            c.clear();
            c.set_active(false);
        }
        self.engaged = false;
        info!("SAS disengaged");
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn is_overridden(&self, channel: Channel) -> bool {
        self.overridden[slot(channel)]
    }

    /// Attitude currently held on `channel`.
    pub fn hold(&self, channel: Channel) -> f64 {
        self.controllers[slot(channel)].target_setpoint()
    }

    pub fn controller(&self, channel: Channel) -> &AxisController {
        &self.controllers[slot(channel)]
    }

    pub fn controller_mut(&mut self, channel: Channel) -> &mut AxisController {
        &mut self.controllers[slot(channel)]
    }

    fn capture(&mut self, channel: Channel, v: &VesselState) {
        let (attitude, _) = measure(channel, v);
        let c = &mut self.controllers[slot(channel)];
        c.update_setpoint(attitude, false, 0.0);
        c.clear();
        c.skip_derivative();
    }

    /// One tick. Throttle is never touched.
    pub fn tick(&mut self, vessel: &VesselState, dt: f64) -> FlightControls {
        if !self.engaged {
            return FlightControls::default();
        }
        let v = vessel.sanitized();
        let mut out = [None; 3];
        for channel in CHANNELS {
            let i = slot(channel);
            if v.pilot[i].abs() > PILOT_DEADBAND {
                if !self.overridden[i] {
                    debug!("SAS {:?} released to pilot", channel);
                }
                self.overridden[i] = true;
                continue;
            }
            if self.overridden[i] {
                self.overridden[i] = false;
                self.capture(channel, &v);
                debug!("SAS {:?} recaptured at {:.1}", channel, self.hold(channel));
            }
            let (attitude, rate) = measure(channel, &v);
            let response = self.controllers[i].response_with_rate(attitude, rate, v.use_integral, dt);
            out[i] = Some(response.clamp(-1.0, 1.0));
        }
        FlightControls { pitch: out[0], roll: out[1], yaw: out[2], throttle: None }
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for Stabilizer {
    fn control(&mut self, state: &VesselState, dt: f64) -> FlightControls {
        self.tick(state, dt)
    }

    fn reset(&mut self) {
        self.disengage();
    }

    fn name(&self) -> &str {
        "SAS"
    }
}
