use anchor_lang::prelude::*;
use anchor_lang::solana_program::{stake as stake_program, sysvar};

use crate::error::ErrorCode;
use crate::states::{Block, Entry, EntryStakedEvent, EntryState};
use crate::utils::{
    deactivate_stake_signed, delegate_stake_signed, is_token_owner, set_stake_authorities,
    StakeAccount,
};
use crate::{validator_vote, AUTHORITY_SEED};

/// Accounts for staking an owned entry.
///
/// The owner hands a stake account over to the program: both of its
/// authorities move to the program authority, it is delegated to the
/// designated validator (or deactivated, if it arrives delegated elsewhere,
/// so the crank can re-delegate it next epoch), and the entry records the
/// delegation watermarks that commission and Ki harvesting run against.
#[derive(Accounts)]
pub struct Stake<'info> {
    pub block: Account<'info, Block>,

    #[account(
        mut,
        constraint = entry.block == block.key() @ ErrorCode::InvalidEntryRange,
    )]
    pub entry: Account<'info, Entry>,

    /// Owner of the entry token.
    pub token_owner: Signer<'info>,

    /// Proof of ownership: the token account holding the entry token.
    ///
    /// CHECK: decoded and checked against the entry mint and signer below.
    pub token_account: UncheckedAccount<'info>,

    /// The stake account being handed over.
    ///
    /// CHECK: decoded and validated as a stake account below.
    #[account(mut)]
    pub stake_account: UncheckedAccount<'info>,

    /// Current withdraw authority of the stake account; must co-sign the
    /// handover.
    pub stake_withdraw_authority: Signer<'info>,

    /// CHECK: pinned address.
    #[account(address = validator_vote::ID)]
    pub validator_vote: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub clock: Sysvar<'info, Clock>,

    /// CHECK: pinned address.
    #[account(address = sysvar::stake_history::ID)]
    pub stake_history: UncheckedAccount<'info>,

    /// CHECK: pinned address.
    #[account(address = stake_program::config::ID)]
    pub stake_config: UncheckedAccount<'info>,

    /// CHECK: program id only.
    #[account(address = stake_program::program::ID)]
    pub stake_program: UncheckedAccount<'info>,
}

pub fn stake(ctx: Context<Stake>) -> Result<()> {
    let block = &ctx.accounts.block;
    let entry = &mut ctx.accounts.entry;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    let clock = Clock::get()?;
    require!(
        entry.state(Some(block), clock.unix_timestamp) == EntryState::Owned,
        ErrorCode::NotStakeable
    );

    require!(
        is_token_owner(
            &ctx.accounts.token_account.to_account_info(),
            ctx.accounts.token_owner.key,
            &entry.mint,
            1,
        ),
        ErrorCode::NotOwned
    );

    let stake_info = ctx.accounts.stake_account.to_account_info();
    let decoded = StakeAccount::decode(&stake_info)?;

    let meta = match decoded {
        StakeAccount::Initialized(meta) => meta,
        StakeAccount::Delegated(meta, _) => meta,
        _ => return err!(ErrorCode::InvalidStakeAccount),
    };

    require_keys_eq!(
        meta.withdrawer,
        ctx.accounts.stake_withdraw_authority.key(),
        ErrorCode::InvalidStakeAccount
    );

    // Locked stake is not supported; custodians are not honored.
    require!(
        meta.lockup_unix_timestamp <= clock.unix_timestamp
            && meta.lockup_epoch <= clock.epoch,
        ErrorCode::StakeAccountLocked
    );

    // Hand both authorities to the program, signed by the current withdraw
    // authority.
    set_stake_authorities(
        &stake_info,
        &ctx.accounts.stake_withdraw_authority.to_account_info(),
        ctx.accounts.authority.key,
        &ctx.accounts.clock.to_account_info(),
    )?;

    match decoded {
        // Not delegated yet: delegate to the designated validator now.
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
        }
        // Delegated to a foreign validator: deactivate, so the
        // take-commission-or-delegate crank can re-delegate next epoch.
        StakeAccount::Delegated(_, delegation) => {
            if delegation.voter != validator_vote::ID {
                deactivate_stake_signed(
                    &stake_info,
                    &ctx.accounts.authority.to_account_info(),
                    ctx.bumps.authority,
                    &ctx.accounts.clock.to_account_info(),
                )?;
            }
        }
        _ => unreachable!(),
    }

    let delegated = decoded.delegated_lamports();
    entry.staked.stake_account = stake_info.key();
    entry.staked.last_commission_charge_stake_account_lamports = delegated;
    entry.staked.last_ki_harvest_stake_account_lamports = delegated;

    emit!(EntryStakedEvent {
        mint: entry.mint,
        stake_account: stake_info.key(),
        delegated_lamports: delegated,
    });
    Ok(())
}
