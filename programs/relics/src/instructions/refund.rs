use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{Block, Entry, EntryState, RefundIssued};
use crate::utils::is_token_owner;
use crate::AUTHORITY_SEED;

#[derive(Accounts)]
pub struct Refund<'info> {
    /// Owner of the entry token.
    pub token_owner: Signer<'info>,

    pub block: Account<'info, Block>,

    #[account(
        mut,
        constraint = entry.block == block.key() @ ErrorCode::InvalidEntryRange,
    )]
    pub entry: Account<'info, Entry>,

    /// Holds the escrowed purchase price.
    ///
    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// Proof of ownership: the token account holding the entry token.
    ///
    /// CHECK: decoded and checked against the entry mint and signer below.
    pub token_account: UncheckedAccount<'info>,

    /// Receives the refunded lamports.
    ///
    /// CHECK: any account chosen by the owner.
    #[account(mut)]
    pub destination: UncheckedAccount<'info>,
}

/// Refunds a mystery purchase whose entry was never revealed within the
/// reveal grace period.  The purchase price returns from the authority
/// escrow; the purchaser keeps the mystery token itself.  Each entry can be
/// refunded once.
pub fn refund(ctx: Context<Refund>) -> Result<()> {
    let block = &ctx.accounts.block;
    let entry = &mut ctx.accounts.entry;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    require!(
        is_token_owner(
            &ctx.accounts.token_account.to_account_info(),
            ctx.accounts.token_owner.key,
            &entry.mint,
            1,
        ),
        ErrorCode::NotOwned
    );

    let now = Clock::get()?.unix_timestamp;
    require!(
        entry.state(Some(block), now) == EntryState::WaitingForRevealOwned,
        ErrorCode::EntryNotRefundable
    );
    require!(!entry.refund_awarded, ErrorCode::AlreadyRefunded);

    // The grace period runs from the end of the mystery phase.  If the
    // phase timed out rather than selling through, the end-of-phase stamp
    // was never written and the timeout instant is used instead.
    let phase_end = if block.mystery_phase_end_timestamp > 0 {
        block.mystery_phase_end_timestamp
    } else {
        block.block_start_timestamp + block.config.mystery_phase_duration as i64
    };
    require!(
        now > phase_end + block.config.reveal_period_duration as i64,
        ErrorCode::EntryNotRefundable
    );

    let lamports = entry.purchase_price_lamports;
    ctx.accounts
        .authority
        .to_account_info()
        .sub_lamports(lamports)?;
    ctx.accounts
        .destination
        .to_account_info()
        .add_lamports(lamports)?;

    entry.refund_awarded = true;

    emit!(RefundIssued {
        mint: entry.mint,
        destination: *ctx.accounts.destination.key,
        lamports,
    });
    Ok(())
}
