use super::angle::finite_or_zero;

// ---------------------------------------------------------------------------
// Output fades
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    In,
    Out,
}

/// Linear ramp of an output channel, polled once per tick.
///
/// `fade_out` holds the last commanded value and ramps it to zero so a
/// released control surface does not snap back; `fade_in` ramps a gain
/// from 0 to 1 after the autopilot resumes.
#[derive(Debug, Clone)]
pub struct Fade {
    phase: Phase,
    level: f64,
    held: f64,
}

impl Fade {
    pub fn new() -> Self {
        Self { phase: Phase::Idle, level: 1.0, held: 0.0 }
    }

    pub fn fade_out(&mut self, from: f64) {
        self.phase = Phase::Out;
        self.level = 1.0;
        self.held = finite_or_zero(from);
    }

    pub fn fade_in(&mut self) {
        self.phase = Phase::In;
        self.level = 0.0;
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.level = 1.0;
    }

    /// Next fade-out value, or `None` when no fade-out is running.
    pub fn poll_out(&mut self, dt: f64, duration: f64) -> Option<f64> {
        if self.phase != Phase::Out {
            return None;
        }
        self.level -= step(dt, duration);
        if self.level <= 0.0 {
            self.cancel();
            return None;
        }
        Some(self.held * self.level)
    }

    /// Next fade-in gain in `[0, 1]`; 1 when idle.
    pub fn poll_in(&mut self, dt: f64, duration: f64) -> f64 {
        if self.phase != Phase::In {
            return 1.0;
        }
        self.level += step(dt, duration);
        if self.level >= 1.0 {
            self.cancel();
        }
        self.level
    }

    pub fn is_fading(&self) -> bool {
        self.phase != Phase::Idle
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new()
    }
}

/// Fraction of the ramp covered in one tick; a non-positive duration
/// completes in a single tick.
fn step(dt: f64, duration: f64) -> f64 {
    let duration = finite_or_zero(duration);
    if duration <= 0.0 {
        1.0
    } else {
        finite_or_zero(dt).max(0.0) / duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_out_ramps_to_release() {
        let mut fade = Fade::new();
        fade.fade_out(0.8);
        let mut values = Vec::new();
        while let Some(v) = fade.poll_out(0.1, 1.0) {
            values.push(v);
            assert!(values.len() < 20);
        }
        // ten ticks of 0.1 s, give or take rounding on the last one
        assert!((9..=10).contains(&values.len()));
        assert!((values[0] - 0.72).abs() < 1e-9);
        assert!(*values.last().unwrap() < 0.1);
        assert!(values.windows(2).all(|w| w[1] < w[0]));
        assert!(!fade.is_fading());
    }

    #[test]
    fn fade_in_reaches_unity() {
        let mut fade = Fade::new();
        assert_eq!(fade.poll_in(0.1, 1.0), 1.0);
        fade.fade_in();
        let first = fade.poll_in(0.25, 1.0);
        assert!((first - 0.25).abs() < 1e-12);
        for _ in 0..5 {
            fade.poll_in(0.25, 1.0);
        }
        assert_eq!(fade.poll_in(0.25, 1.0), 1.0);
        assert!(!fade.is_fading());
    }

    #[test]
    fn zero_duration_is_instant() {
        let mut fade = Fade::new();
        fade.fade_out(1.0);
        assert_eq!(fade.poll_out(0.02, 0.0), None);
        fade.fade_in();
        assert_eq!(fade.poll_in(0.02, 0.0), 1.0);
    }
}
