use anchor_lang::prelude::*;
use anchor_lang::solana_program::{stake as stake_program, sysvar};

use crate::error::ErrorCode;
use crate::states::{Block, CommissionCharged, Entry, EntryState};
use crate::utils::{
    charge_commission, delegate_stake_signed, BridgeAccounts, StakeAccount,
};
use crate::{validator_vote, AUTHORITY_SEED, BRIDGE_SEED, MASTER_STAKE_SEED};

/// Accounts for the public commission crank.
///
/// Anyone may run it against any staked entry.  An undelegated stake
/// account is delegated to the designated validator and the entry's
/// watermarks reset; a delegated one has commission charged on its
/// earnings.  Concurrent callers are harmless: the runtime serializes on
/// the entry account, and a second run finds nothing left to charge.
#[derive(Accounts)]
pub struct TakeCommissionOrDelegate<'info> {
    /// Fronts the bridge account's transient rent; repaid by the move.
    #[account(mut)]
    pub funding: Signer<'info>,

    pub block: Account<'info, Block>,

    #[account(
        mut,
        constraint = entry.block == block.key() @ ErrorCode::InvalidEntryRange,
    )]
    pub entry: Account<'info, Entry>,

    /// CHECK: checked against the entry's staked stake account below.
    #[account(
        mut,
        address = entry.staked.stake_account @ ErrorCode::NotStaked,
    )]
    pub stake_account: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [MASTER_STAKE_SEED],
        bump,
    )]
    pub master_stake: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds; created and drained within
    /// the instruction.
    #[account(
        mut,
        seeds = [BRIDGE_SEED, entry.mint.as_ref()],
        bump,
    )]
    pub bridge_stake: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// CHECK: pinned address.
    #[account(address = validator_vote::ID)]
    pub validator_vote: UncheckedAccount<'info>,

    pub clock: Sysvar<'info, Clock>,

    /// CHECK: pinned address.
    #[account(address = sysvar::stake_history::ID)]
    pub stake_history: UncheckedAccount<'info>,

    /// CHECK: pinned address.
    #[account(address = stake_program::config::ID)]
    pub stake_config: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,

    /// CHECK: program id only.
    #[account(address = stake_program::program::ID)]
    pub stake_program: UncheckedAccount<'info>,
}

pub fn take_commission_or_delegate(ctx: Context<TakeCommissionOrDelegate>) -> Result<()> {
    let block = &ctx.accounts.block;
    let entry = &mut ctx.accounts.entry;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    let now = Clock::get()?.unix_timestamp;
    require!(
        entry.state(Some(block), now) == EntryState::OwnedAndStaked,
        ErrorCode::NotStaked
    );

    let stake_info = ctx.accounts.stake_account.to_account_info();

    match StakeAccount::decode(&stake_info)? {
        // Not delegated (it arrived delegated elsewhere and was
        // deactivated): delegate it now and restart the watermarks from the
        // fresh delegation.
        StakeAccount::Initialized(_) => {
            delegate_stake_signed(
                &stake_info,
                &ctx.accounts.validator_vote.to_account_info(),
                &ctx.accounts.authority.to_account_info(),
                ctx.bumps.authority,
                &ctx.accounts.clock.to_account_info(),
                &ctx.accounts.stake_history.to_account_info(),
                &ctx.accounts.stake_config.to_account_info(),
            )
            .map_err(|_| error!(ErrorCode::FailedToDelegate))?;

            // Re-read: the delegation fields only exist after the invoke.
            let delegated = StakeAccount::decode(&stake_info)?.delegated_lamports();
            entry.staked.last_commission_charge_stake_account_lamports = delegated;
            entry.staked.last_ki_harvest_stake_account_lamports = delegated;
            Ok(())
        }

        StakeAccount::Delegated(_, delegation) => {
            let entry_mint = entry.mint;
            let bridge_seeds: [&[u8]; 2] = [BRIDGE_SEED, entry_mint.as_ref()];
            let charged = charge_commission(
                delegation.stake,
                block,
                entry,
                &stake_info,
                &ctx.accounts.master_stake.to_account_info(),
                &BridgeAccounts {
                    bridge: &ctx.accounts.bridge_stake.to_account_info(),
                    bridge_seeds: &bridge_seeds,
                    funding: &ctx.accounts.funding.to_account_info(),
                    authority: &ctx.accounts.authority.to_account_info(),
                    authority_bump: ctx.bumps.authority,
                    clock: &ctx.accounts.clock.to_account_info(),
                    stake_history: &ctx.accounts.stake_history.to_account_info(),
                    system_program: &ctx.accounts.system_program.to_account_info(),
                },
            )?;

            if charged > 0 {
                emit!(CommissionCharged {
                    mint: entry.mint,
                    lamports: charged,
                });
            }
            Ok(())
        }

        _ => err!(ErrorCode::InvalidStakeAccount),
    }
}
