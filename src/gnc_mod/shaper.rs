use log::debug;

use super::angle::{angle_diff, finite_or_zero, wrap_360};

// ---------------------------------------------------------------------------
// Heading shift: eases a compass target toward a commanded heading
// ---------------------------------------------------------------------------

/// Per-tick polled heading transition.
///
/// Starts slow and accelerates (`increment` grows by `easing * dt * rate`
/// every tick), always rotating the short way round. When the remaining
/// distance drops below `epsilon` the heading snaps to the target and the
/// shift ends.
#[derive(Debug, Clone)]
pub struct HeadingShift {
    current: f64,
    target: f64,
    increment: f64,
    direction: f64,
    running: bool,
    rate: f64,
    epsilon: f64,
}

impl HeadingShift {
    pub fn new(rate: f64, epsilon: f64) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            increment: 0.0,
            direction: 0.0,
            running: false,
            rate: finite_or_zero(rate).max(0.0),
            epsilon: finite_or_zero(epsilon).abs(),
        }
    }

    /// Begin a shift from `from` toward `to`.
    ///
    /// If a shift is already running, the remaining distance is measured
    /// from the current heading and the accumulated increment is kept unless
    /// the direction of travel reverses.
    pub fn start(&mut self, from: f64, to: f64) {
        let to = wrap_360(finite_or_zero(to));
        if self.running {
            let direction = angle_diff(self.current, to).signum();
            if direction != self.direction {
                self.increment = 0.0;
            }
            self.direction = direction;
            self.target = to;
            debug!("heading shift retargeted to {:.1}", to);
        } else {
            self.current = wrap_360(finite_or_zero(from));
            self.target = to;
            self.increment = 0.0;
            self.direction = angle_diff(self.current, to).signum();
            self.running = true;
            debug!("heading shift {:.1} -> {:.1}", self.current, to);
        }
        if angle_diff(self.current, self.target).abs() <= self.epsilon {
            self.finish();
        }
    }

    /// Retarget relative to the current goal (keyboard-style input).
    pub fn nudge(&mut self, from: f64, delta: f64) {
        let base = if self.running { self.target } else { from };
        self.start(from, base + finite_or_zero(delta));
    }

    /// Advance one tick. Returns the heading to command while a shift is in
    /// progress (including the final snapped value), `None` once idle.
    pub fn poll(&mut self, easing: f64, dt: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        self.increment += finite_or_zero(easing).max(0.0) * finite_or_zero(dt).max(0.0) * self.rate;
        let remaining = angle_diff(self.current, self.target);
        if remaining.abs() <= self.increment.max(self.epsilon) {
            self.finish();
        } else {
            self.current = wrap_360(self.current + remaining.signum() * self.increment);
            if angle_diff(self.current, self.target).abs() <= self.epsilon {
                self.finish();
            }
        }
        Some(self.current)
    }

    /// Stop where we are. Safe to call when idle.
    pub fn cancel(&mut self) {
        if self.running {
            debug!("heading shift cancelled at {:.1}", self.current);
        }
        self.running = false;
        self.increment = 0.0;
    }

    fn finish(&mut self) {
        self.current = self.target;
        self.running = false;
        self.increment = 0.0;
        debug!("heading shift complete at {:.1}", self.target);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(shift: &mut HeadingShift, easing: f64, dt: f64) -> Vec<f64> {
        let mut out = Vec::new();
        for _ in 0..100_000 {
            match shift.poll(easing, dt) {
                Some(h) => out.push(h),
                None => break,
            }
        }
        out
    }

    #[test]
    fn shift_converges_and_snaps() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.start(90.0, 180.0);
        let path = run_to_end(&mut shift, 1.0, 0.02);
        assert!(!shift.is_running());
        assert_eq!(*path.last().unwrap(), 180.0);
        assert!(path.windows(2).all(|w| w[1] >= w[0]), "shift must be monotonic");
    }

    #[test]
    fn shift_crosses_north_the_short_way() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.start(350.0, 20.0);
        let path = run_to_end(&mut shift, 5.0, 0.02);
        assert!(path.iter().all(|&h| h >= 350.0 || h <= 20.0));
        assert_eq!(*path.last().unwrap(), 20.0);
    }

    #[test]
    fn increment_accelerates() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.start(0.0, 90.0);
        let a = shift.poll(1.0, 1.0).unwrap();
        let b = shift.poll(1.0, 1.0).unwrap();
        assert!((b - a) > a, "second step {} should exceed first {}", b - a, a);
    }

    #[test]
    fn same_direction_retarget_keeps_increment() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.start(0.0, 90.0);
        for _ in 0..50 {
            shift.poll(1.0, 0.1);
        }
        let inc = shift.increment();
        assert!(inc > 0.0);
        shift.start(0.0, 120.0);
        assert_eq!(shift.increment(), inc);
        assert_eq!(shift.target(), 120.0);
    }

    #[test]
    fn reversal_resets_increment() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.start(0.0, 90.0);
        for _ in 0..50 {
            shift.poll(1.0, 0.1);
        }
        let here = shift.current();
        shift.start(0.0, 300.0);
        assert_eq!(shift.increment(), 0.0);
        let next = shift.poll(1.0, 0.1).unwrap();
        assert!(angle_diff(here, next) < 0.0, "should now turn left");
    }

    #[test]
    fn cancel_stops_polling() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.start(0.0, 90.0);
        shift.poll(1.0, 0.1);
        shift.cancel();
        assert_eq!(shift.poll(1.0, 0.1), None);
        shift.cancel();
        assert!(!shift.is_running());
    }

    #[test]
    fn tiny_shift_finishes_immediately() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.start(45.0, 45.005);
        assert!(!shift.is_running());
    }

    #[test]
    fn nudge_accumulates_on_target() {
        let mut shift = HeadingShift::new(0.01, 0.01);
        shift.nudge(10.0, 5.0);
        shift.nudge(10.0, 5.0);
        assert_eq!(shift.target(), 20.0);
    }
}
