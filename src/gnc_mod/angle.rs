// ---------------------------------------------------------------------------
// Compass arithmetic (degrees)
// ---------------------------------------------------------------------------

/// Wrap an angle into `[0, 360)`.
pub fn wrap_360(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Wrap an angle into `[-180, 180)`.
pub fn wrap_180(angle: f64) -> f64 {
    wrap_360(angle + 180.0) - 180.0
}

/// Shortest signed rotation from `from` to `to`.
///
/// The result never exceeds 180 degrees in magnitude, so a target just
/// across north is reached the short way round.
pub fn angle_diff(from: f64, to: f64) -> f64 {
    wrap_180(to - from)
}

/// Replace NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_360_range() {
        assert!((wrap_360(370.0) - 10.0).abs() < 1e-12);
        assert!((wrap_360(-10.0) - 350.0).abs() < 1e-12);
        assert_eq!(wrap_360(360.0), 0.0);
        assert!(wrap_360(-1e-17) < 360.0);
    }

    #[test]
    fn diff_takes_short_way_round() {
        assert!((angle_diff(350.0, 10.0) - 20.0).abs() < 1e-12);
        assert!((angle_diff(10.0, 350.0) + 20.0).abs() < 1e-12);
        assert!((angle_diff(90.0, 270.0).abs() - 180.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_becomes_zero() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
        assert_eq!(finite_or_zero(-2.5), -2.5);
    }
}
