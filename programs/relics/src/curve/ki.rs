//! The diminishing-returns reshape applied to Ki harvests.

/// Pivot of the reshape curve; harvests flatten sharply as the raw amount
/// approaches this value.
pub const KI_RESHAPE_PIVOT: u64 = 106_666;

const KI_RESHAPE_DIVISOR: u64 = 1_066_666;

/// Reshapes a raw Ki amount to discourage very large harvests per entry.
/// The curve is `x - x^4 / pivot^3`, refactored to avoid rounding errors:
///
///   f = x^2 / pivot
///   y = (x * pivot - f^2) / divisor
///
/// The result is then multiplied by 10 because Ki tokens carry one decimal
/// place (the fungible metadata standard requires at least one).
///
/// Returns `None` when the math overflows, which only happens for raw
/// amounts so large that the reduction schedule would award nothing anyway.
pub fn reshape_harvest(raw: u64) -> Option<u64> {
    let f = raw.checked_mul(raw)? / KI_RESHAPE_PIVOT;

    // raw * pivot cannot overflow: raw was already divided by
    // LAMPORTS_PER_SOL by the caller.
    let shaped = (raw * KI_RESHAPE_PIVOT).checked_sub(f.checked_mul(f)?)? / KI_RESHAPE_DIVISOR;

    shaped.checked_mul(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_harvests_pass_through_in_deci_ki() {
        // For small x the quartic term vanishes and the curve is ~x/10,
        // re-multiplied by 10 into deci-Ki.
        assert_eq!(reshape_harvest(0), Some(0));
        assert_eq!(reshape_harvest(100), Some(90));
        assert_eq!(reshape_harvest(1_000), Some(990));
        assert_eq!(reshape_harvest(10_000), Some(9_990));
    }

    #[test]
    fn pinned_curve_values() {
        assert_eq!(reshape_harvest(50_000), Some(44_850));
        assert_eq!(reshape_harvest(100_000), Some(17_600));
        assert_eq!(reshape_harvest(106_000), Some(1_970));
    }

    #[test]
    fn curve_flattens_to_zero_near_the_pivot() {
        // Just under the pivot the award collapses to zero.
        assert_eq!(reshape_harvest(106_666), Some(0));
    }

    #[test]
    fn beyond_the_pivot_the_subtraction_underflows() {
        // Past the pivot the quartic term exceeds the linear one; the
        // checked subtraction reports the harvest as unawardable.
        assert_eq!(reshape_harvest(1_000_000), None);
    }

    #[test]
    fn extreme_amounts_overflow_to_none() {
        assert_eq!(reshape_harvest(u64::MAX / KI_RESHAPE_PIVOT), None);
    }

    #[test]
    fn monotone_up_to_the_curve_peak() {
        // The reshape increases up to its peak (around pivot / 4^(1/3)) and
        // never exceeds the raw amount in deci-Ki.
        let mut previous = 0;
        for raw in (0..=60_000).step_by(500) {
            let shaped = reshape_harvest(raw).unwrap();
            assert!(shaped >= previous);
            assert!(shaped <= raw * 10);
            previous = shaped;
        }
    }
}
