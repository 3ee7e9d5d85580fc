use anchor_lang::prelude::*;

use crate::curve::reshape_harvest;
use crate::states::Entry;
use crate::utils::{create_associated_token_account_idempotent, mint_tokens_signed};
use crate::LAMPORTS_PER_SOL;

/// Outcome of the pure harvest computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarvestAmount {
    /// No earnings to harvest; the watermark stays put.
    Nothing,
    /// The computation overflowed.  Overflow only happens for earnings so
    /// large that the reduction schedule would award zero anyway, so the
    /// mint is skipped but the watermark still advances.
    Overflowed,
    /// Deci-Ki to mint (possibly zero after reshaping); the watermark
    /// advances.
    DeciKi(u64),
}

/// Ki owed on `earned` staking lamports at `ki_factor` lamports-per-Ki,
/// after the diminishing-returns reshape.
pub fn compute_harvest(earned: u64, ki_factor: u64) -> HarvestAmount {
    let raw = match earned.checked_mul(ki_factor) {
        Some(product) => product / LAMPORTS_PER_SOL,
        None => return HarvestAmount::Overflowed,
    };
    if raw == 0 {
        return HarvestAmount::Nothing;
    }
    match reshape_harvest(raw) {
        Some(amount) => HarvestAmount::DeciKi(amount),
        None => HarvestAmount::Overflowed,
    }
}

/// Harvest accounts bundle.
pub struct KiMintAccounts<'a, 'info> {
    pub ki_mint: &'a AccountInfo<'info>,
    pub destination: &'a AccountInfo<'info>,
    pub destination_owner: &'a AccountInfo<'info>,
    pub funding: &'a AccountInfo<'info>,
    pub authority: &'a AccountInfo<'info>,
    pub authority_bump: u8,
    pub token_program: &'a AccountInfo<'info>,
    pub ata_program: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
}

/// Harvests Ki for a staked entry: mints the reshaped earnings since the
/// last harvest into the owner's associated Ki account (created on demand)
/// and advances the harvest watermark.  Returns the deci-Ki minted.
pub fn harvest_ki<'info>(
    delegated: u64,
    entry: &mut Entry,
    accounts: &KiMintAccounts<'_, 'info>,
) -> Result<u64> {
    let earned = delegated.saturating_sub(entry.staked.last_ki_harvest_stake_account_lamports);
    let ki_factor =
        entry.metadata.level_metadata[entry.metadata.level as usize].ki_factor as u64;

    let minted = match compute_harvest(earned, ki_factor) {
        HarvestAmount::Nothing => return Ok(0),
        HarvestAmount::Overflowed | HarvestAmount::DeciKi(0) => 0,
        HarvestAmount::DeciKi(amount) => {
            create_associated_token_account_idempotent(
                accounts.destination,
                accounts.ki_mint,
                accounts.destination_owner,
                accounts.funding,
                accounts.ata_program,
                accounts.token_program,
                accounts.system_program,
            )?;
            mint_tokens_signed(
                accounts.ki_mint,
                accounts.destination,
                accounts.authority,
                accounts.authority_bump,
                accounts.token_program,
                amount,
            )?;
            amount
        }
    };

    entry.staked.last_ki_harvest_stake_account_lamports = delegated;
    Ok(minted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earnings_below_one_ki_harvest_nothing() {
        // 500 lamports earned at 1000 lamports per Ki rounds to zero, and
        // the watermark must not advance (the earnings remain harvestable).
        assert_eq!(compute_harvest(500, 1000), HarvestAmount::Nothing);
    }

    #[test]
    fn zero_ki_factor_harvests_nothing() {
        assert_eq!(compute_harvest(u64::MAX / 2, 0), HarvestAmount::Nothing);
    }

    #[test]
    fn ordinary_earnings_mint_deci_ki() {
        // 0.5 SOL earned at ki_factor 1000: raw 500 Ki, reshaped and paid
        // out in deci-Ki.
        assert_eq!(
            compute_harvest(LAMPORTS_PER_SOL / 2, 1000),
            HarvestAmount::DeciKi(490)
        );
    }

    #[test]
    fn past_the_reshape_pivot_the_award_collapses() {
        // raw = 500_000 Ki is far past the reshape pivot; the quartic term
        // dominates and the harvest is reported as overflowed.
        assert_eq!(
            compute_harvest(LAMPORTS_PER_SOL / 2, 1_000_000),
            HarvestAmount::Overflowed
        );
    }

    #[test]
    fn overflowing_earnings_still_advance_the_watermark() {
        assert_eq!(compute_harvest(u64::MAX, u64::MAX), HarvestAmount::Overflowed);
    }
}
