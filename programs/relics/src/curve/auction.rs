//! The auction bid floor curve.

/// Computes the lowest acceptable next bid for an entry in auction.
///
/// With no prior bid the floor is simply `initial_minimum_bid`.  Once a bid
/// exists, the floor follows
/// `y = p * ((1 / (101 - 100 * (a / b))) + 1.01)`
/// where `a` is seconds elapsed, `b` the auction duration and `p` the current
/// highest bid: a curve running from ~1.02x the highest bid at the start of
/// the auction up to ~2.01x at its end.
///
/// Returns 0 when no further bid is possible (the highest bid is already
/// `u64::MAX`).
pub fn compute_minimum_bid(
    auction_duration: u64,
    initial_minimum_bid: u64,
    current_max_bid: u64,
    seconds_elapsed: u64,
) -> u64 {
    if current_max_bid == u64::MAX {
        return 0;
    }

    // Until the first bid is cast, only the initial minimum applies.
    if current_max_bid < initial_minimum_bid {
        return initial_minimum_bid;
    }

    let a = seconds_elapsed.min(auction_duration - 1);
    let b = auction_duration;
    let p = current_max_bid;

    // result = (p * (((1000 * b) / ((b + b / 100) - a)) + 101000)) / 100000
    // The term involving a and b cannot overflow: durations fit in u32, and
    // a < b.
    let factor = (1000 * b) / ((b + b / 100) - a) + 101_000;

    match p.checked_mul(factor) {
        Some(scaled) => scaled / 100_000,
        None => {
            // The formula overflows only for bids in the millions of SOL.
            // Fall back to 1/8 above the previous bid, and clamp at the
            // maximum possible bid if even that overflows.
            p.checked_add(p >> 3).unwrap_or(u64::MAX)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SOL: u64 = 1_000_000_000;

    #[test]
    fn first_bid_pays_the_initial_minimum() {
        assert_eq!(compute_minimum_bid(600, SOL, 0, 0), SOL);
        assert_eq!(compute_minimum_bid(600, SOL, SOL - 1, 599), SOL);
    }

    #[test]
    fn ratchet_starts_near_two_percent() {
        // a = 0: factor = 1000b / (b + b/100) + 101000 ≈ 990 + 101000
        let floor = compute_minimum_bid(600, SOL, SOL, 0);
        assert_eq!(floor, 1_019_900_000);
    }

    #[test]
    fn ratchet_approaches_two_x_at_the_end() {
        let floor = compute_minimum_bid(600, SOL, SOL, 599);
        // a = 599, b = 600: 1000*600 / (606 - 599) = 85714; +101000 → 1.86714x
        assert_eq!(floor, 1_867_140_000);

        // Elapsed times past the duration clamp to duration - 1.
        assert_eq!(compute_minimum_bid(600, SOL, SOL, 10_000), floor);
    }

    #[test]
    fn successive_bids_walk_the_ratchet() {
        // A 600 second auction with a 500_000 lamport minimum.  The first
        // bidder faces the plain minimum; their 600_000 bid then sets the
        // floor for the second bidder at t=200.
        assert_eq!(compute_minimum_bid(600, 500_000, 0, 100), 500_000);

        let second_floor = compute_minimum_bid(600, 500_000, 600_000, 200);
        assert_eq!(second_floor, 614_862);

        // The second bidder's 700_000 clears the floor, pushing the next
        // floor higher still.
        assert!(compute_minimum_bid(600, 500_000, 700_000, 300) > 700_000);
    }

    #[test]
    fn saturated_auction_refuses_further_bids() {
        assert_eq!(compute_minimum_bid(600, SOL, u64::MAX, 300), 0);
    }

    #[test]
    fn overflow_falls_back_to_an_eighth_increase() {
        // p * ~102000 overflows, so the floor becomes p + p/8.
        let p = u64::MAX / 1000;
        assert_eq!(compute_minimum_bid(600, SOL, p, 0), p + (p >> 3));

        // And when even that overflows, the floor is pinned to u64::MAX.
        let p = u64::MAX - 1;
        assert_eq!(compute_minimum_bid(600, SOL, p, 0), u64::MAX);
    }

    proptest! {
        #[test]
        fn floor_is_within_the_documented_ratchet_band(
            duration in 2u64..=(u32::MAX as u64),
            prior in 1u64..=(1u64 << 40),
            elapsed in 0u64..=(u32::MAX as u64),
        ) {
            // Priors below 2^40 lamports never hit the overflow fallback.
            let floor = compute_minimum_bid(duration, 1, prior, elapsed);

            // >= ~1.01x of the prior bid...
            prop_assert!(floor >= prior / 100_000 * 101_000);
            // ...and bounded by ~2.01x + rounding.
            prop_assert!(floor <= prior * 201_000 / 100_000 + 1);
        }

        #[test]
        fn floor_is_monotone_in_elapsed_time(
            duration in 2u64..=1_000_000,
            prior in 1u64..=(1u64 << 40),
            t1 in 0u64..=1_000_000,
            t2 in 0u64..=1_000_000,
        ) {
            let (t1, t2) = (t1.min(t2), t1.max(t2));
            let early = compute_minimum_bid(duration, 1, prior, t1);
            let late = compute_minimum_bid(duration, 1, prior, t2);
            prop_assert!(early <= late);
        }
    }
}
