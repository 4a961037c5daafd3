//! This module keeps requested changes inside the brightness bounds.

/// Result of clamping a requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Clamped {
    /// Level the backlight should end up at.
    pub target: u32,
    /// `target - current`
    pub delta: i64,
}

/// Clamp `current + requested_delta` to `lower_limit..=max`.
///
/// Anything below `lower_limit` becomes `lower_limit`, except when toggling
/// off, where it becomes 0.
pub(crate) fn clamp(
    current: u32,
    max: u32,
    requested_delta: i64,
    lower_limit: u32,
    toggle_off: bool,
) -> Clamped {
    let mut target = i64::from(current).saturating_add(requested_delta);
    if target < i64::from(lower_limit) {
        target = if toggle_off { 0 } else { i64::from(lower_limit) };
    }
    if target > i64::from(max) {
        target = i64::from(max);
    }
    // Only lower_limit or max can have pushed it here, both fit.
    let target = u32::try_from(target.max(0)).unwrap_or(max);
    Clamped {
        target,
        delta: i64::from(target) - i64::from(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_bounds_passes_through() {
        assert_eq!(
            clamp(100, 852, 200, 1, false),
            Clamped {
                target: 300,
                delta: 200
            }
        );
    }

    #[test]
    fn clamps_to_max() {
        assert_eq!(
            clamp(800, 852, 200, 1, false),
            Clamped {
                target: 852,
                delta: 52
            }
        );
    }

    #[test]
    fn clamps_to_lower_limit() {
        assert_eq!(
            clamp(10, 852, -50, 1, false),
            Clamped {
                target: 1,
                delta: -9
            }
        );
    }

    #[test]
    fn toggle_off_goes_to_zero() {
        assert_eq!(
            clamp(10, 852, -10, 1, true),
            Clamped {
                target: 0,
                delta: -10
            }
        );
        // Toggle off ignores the floor even when it is large.
        assert_eq!(clamp(300, 852, -300, 50, true).target, 0);
    }

    #[test]
    fn clamp_is_total() {
        let max = 120;
        for lower_limit in [0, 1, 7, 120] {
            for current in 0..=max {
                for requested in [i64::MIN, -1000, -121, -60, -1, 0, 1, 60, 121, 1000, i64::MAX] {
                    for toggle_off in [false, true] {
                        let clamped = clamp(current, max, requested, lower_limit, toggle_off);
                        assert!(clamped.target <= max);
                        if !toggle_off {
                            assert!(clamped.target >= lower_limit);
                        }
                        assert_eq!(
                            i64::from(current) + clamped.delta,
                            i64::from(clamped.target)
                        );
                    }
                }
            }
        }
    }
}
