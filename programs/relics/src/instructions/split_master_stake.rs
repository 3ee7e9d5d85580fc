use anchor_lang::prelude::*;
use anchor_lang::solana_program::stake;

use crate::error::ErrorCode;
use crate::states::ProgramConfig;
use crate::utils::{split_master_stake_signed, StakeAccount};
use crate::{AUTHORITY_SEED, CONFIG_SEED, MASTER_STAKE_ACCOUNT_MIN_LAMPORTS, MASTER_STAKE_SEED};

#[derive(Accounts)]
pub struct SplitMasterStake<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    /// Funds the target account's rent and becomes its stake authorities.
    #[account(
        mut,
        constraint = admin.key() == config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [MASTER_STAKE_SEED],
        bump,
    )]
    pub master_stake: UncheckedAccount<'info>,

    /// Fresh keypair account receiving the split; must co-sign so a plain
    /// CreateAccount suffices.
    #[account(mut)]
    pub target_stake: Signer<'info>,

    /// CHECK: PDA derivation enforced by seeds; signs the split and
    /// authority handover.
    #[account(
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub clock: Sysvar<'info, Clock>,

    pub system_program: Program<'info, System>,

    /// CHECK: program id only.
    #[account(address = stake::program::ID)]
    pub stake_program: UncheckedAccount<'info>,
}

/// Splits commission earnings out of the master stake account into an
/// admin-controlled stake account, always leaving the master at or above
/// its floor.  `lamports` of 0 splits the maximum.
pub fn split_master_stake(ctx: Context<SplitMasterStake>, lamports: u64) -> Result<()> {
    let master = StakeAccount::decode(&ctx.accounts.master_stake.to_account_info())?;
    let delegated = match master {
        StakeAccount::Delegated(_, delegation) => delegation.stake,
        _ => return err!(ErrorCode::InvalidStakeAccount),
    };

    let mut to_split = delegated
        .checked_sub(MASTER_STAKE_ACCOUNT_MIN_LAMPORTS)
        .ok_or(error!(ErrorCode::InsufficientFunds))?;
    if lamports > 0 && to_split > lamports {
        to_split = lamports;
    }

    split_master_stake_signed(
        &ctx.accounts.master_stake.to_account_info(),
        &ctx.accounts.target_stake.to_account_info(),
        ctx.accounts.admin.key,
        to_split,
        &ctx.accounts.admin.to_account_info(),
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &ctx.accounts.clock.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
    )?;

    msg!("Split {} lamports from the master stake", to_split);
    Ok(())
}
