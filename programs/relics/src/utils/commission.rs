use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{Block, Entry};
use crate::utils::{get_minimum_stake_delegation, move_stake_via_bridge, BridgeAccounts};
use crate::COMMISSION_DENOMINATOR;

/// Commission owed on `earned` lamports at `commission` (a binary fraction
/// of 0xFFFF).
pub fn commission_amount(earned: u64, commission: u16) -> u64 {
    ((earned as u128 * commission as u128) / COMMISSION_DENOMINATOR as u128) as u64
}

/// Charges commission on a staked entry's earnings since the last charge.
///
/// The entry's watermark is set to the post-charge delegation and its
/// commission snapshot rolls forward to the block's current value, so a
/// block commission change never applies to earnings already banked.
///
/// When the owed commission is below the platform's minimum stake
/// delegation, the minimum is first split out of the master stake and
/// merged into the entry stake through the bridge; this guarantees the
/// subsequent split leaves both resulting accounts at or above the minimum.
/// Either way the owed commission then moves entry stake → bridge → master.
/// Net of the transient top-up, exactly the owed commission reaches the
/// master.
///
/// Returns the lamports charged.
pub fn charge_commission<'info>(
    delegated: u64,
    block: &Block,
    entry: &mut Entry,
    stake_account: &AccountInfo<'info>,
    master_stake: &AccountInfo<'info>,
    bridge: &BridgeAccounts<'_, 'info>,
) -> Result<u64> {
    let earned =
        delegated.saturating_sub(entry.staked.last_commission_charge_stake_account_lamports);
    let owed = commission_amount(earned, entry.commission);

    // The watermark moves to the value the stake account will hold once the
    // commission has been split off.
    entry.staked.last_commission_charge_stake_account_lamports = delegated - owed;
    entry.commission = block.commission;

    if owed == 0 {
        return Ok(0);
    }

    let minimum = get_minimum_stake_delegation()?;

    let mut to_move = owed;
    if to_move < minimum {
        move_stake_via_bridge(bridge, master_stake, stake_account, minimum)
            .map_err(|_| error!(ErrorCode::FailedToMoveStakeOut))?;
        to_move += minimum;
    }

    move_stake_via_bridge(bridge, stake_account, master_stake, to_move)
        .map_err(|_| error!(ErrorCode::FailedToMoveStake))?;

    Ok(owed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LAMPORTS_PER_SOL;

    #[test]
    fn five_percent_commission_on_half_a_sol() {
        // 0x0CCC / 0xFFFF ~= 5%; earnings of 0.5 SOL owe ~0.025 SOL.
        let owed = commission_amount(LAMPORTS_PER_SOL / 2, 0x0CCC);
        assert_eq!(owed, 24_994_277);
    }

    #[test]
    fn full_commission_takes_everything() {
        assert_eq!(commission_amount(123_456, 0xFFFF), 123_456);
    }

    #[test]
    fn zero_earnings_owe_nothing() {
        assert_eq!(commission_amount(0, 0x0CCC), 0);
    }

    #[test]
    fn large_earnings_do_not_overflow() {
        // earned * commission exceeds u64; the u128 intermediate carries it.
        let earned = u64::MAX / 2;
        assert_eq!(
            commission_amount(earned, 0xFFFF),
            earned
        );
    }

    #[test]
    fn watermark_lands_on_post_charge_stake() {
        // The §4.10 arithmetic: 10.5 SOL delegated, watermark at 10 SOL,
        // ~5% commission.
        let delegated = 10 * LAMPORTS_PER_SOL + LAMPORTS_PER_SOL / 2;
        let watermark = 10 * LAMPORTS_PER_SOL;
        let owed = commission_amount(delegated - watermark, 0x0CCC);
        assert_eq!(delegated - owed, 10_475_005_723);
    }
}
