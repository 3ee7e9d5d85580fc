use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::Token;

use crate::error::ErrorCode;
use crate::states::{Bid, Entry, EntryState, ProgramConfig, WinningBidClaimed};
use crate::utils::{
    burn_tokens, close_token_account, create_associated_token_account_idempotent,
    token_account_amount, transfer_entry_token_signed,
};
use crate::{
    AUTHORITY_SEED, BID_MARKER_MINT_SEED, BID_MARKER_TOKEN_SEED, CONFIG_SEED,
};

/// Accounts for claiming a won auction: the winning bidder receives the
/// entry token, the admin receives the escrowed bid lamports.
///
/// The two optional trailing accounts reclaim the bid marker in the same
/// call: the marker tokens are burned and the marker account closed back to
/// the bidder.
#[derive(Accounts)]
pub struct ClaimWinning<'info> {
    #[account(mut)]
    pub bidder: Signer<'info>,

    #[account(mut)]
    pub entry: Account<'info, Entry>,

    #[account(
        mut,
        constraint = bid.bidder == bidder.key() @ ErrorCode::CannotClaimBid,
        constraint = bid.key() == entry.auction.winning_bid @ ErrorCode::CannotClaimBid,
    )]
    pub bid: Account<'info, Bid>,

    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    /// Receives the winning bid lamports.
    ///
    /// CHECK: pinned to the configured admin address.
    #[account(
        mut,
        address = config.admin,
    )]
    pub admin: UncheckedAccount<'info>,

    /// CHECK: pinned to the entry's recorded token account.
    #[account(
        mut,
        address = entry.token,
    )]
    pub entry_token: UncheckedAccount<'info>,

    /// CHECK: pinned to the entry's recorded mint.
    #[account(address = entry.mint)]
    pub entry_mint: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// CHECK: validated by the associated token program.
    #[account(mut)]
    pub token_destination: UncheckedAccount<'info>,

    /// CHECK: any system account may receive the token.
    pub token_destination_owner: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [BID_MARKER_MINT_SEED],
        bump,
    )]
    pub bid_marker_mint: Option<UncheckedAccount<'info>>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [
            BID_MARKER_TOKEN_SEED,
            entry.mint.as_ref(),
            bidder.key().as_ref(),
        ],
        bump,
    )]
    pub bid_marker_token: Option<UncheckedAccount<'info>>,
}

pub fn claim_winning(ctx: Context<ClaimWinning>) -> Result<()> {
    let entry = &mut ctx.accounts.entry;
    let now = Clock::get()?.unix_timestamp;

    // Winning claims only exist once the auction is over and was bid on.
    require!(
        entry.state(None, now) == EntryState::WaitingToBeClaimed,
        ErrorCode::CannotClaimBid
    );

    create_associated_token_account_idempotent(
        &ctx.accounts.token_destination.to_account_info(),
        &ctx.accounts.entry_mint.to_account_info(),
        &ctx.accounts.token_destination_owner.to_account_info(),
        &ctx.accounts.bidder.to_account_info(),
        &ctx.accounts.associated_token_program.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
    )?;

    transfer_entry_token_signed(
        &ctx.accounts.entry_token.to_account_info(),
        &ctx.accounts.token_destination.to_account_info(),
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &ctx.accounts.token_program.to_account_info(),
    )?;

    if let (Some(marker_mint), Some(marker_token)) = (
        &ctx.accounts.bid_marker_mint,
        &ctx.accounts.bid_marker_token,
    ) {
        reclaim_bid_marker(
            &marker_mint.to_account_info(),
            &marker_token.to_account_info(),
            &ctx.accounts.bidder.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
        )?;
    }

    // The winning bid amount becomes the purchase price, moving the entry
    // into the Owned state; the escrowed lamports go to the admin.
    let bid_info = ctx.accounts.bid.to_account_info();
    let bid_lamports = bid_info.lamports();
    entry.purchase_price_lamports = bid_lamports;

    bid_info.sub_lamports(bid_lamports)?;
    ctx.accounts.admin.to_account_info().add_lamports(bid_lamports)?;

    emit!(WinningBidClaimed {
        bidder: *ctx.accounts.bidder.key,
        mint: entry.mint,
        amount: bid_lamports,
    });
    Ok(())
}

/// Burns whatever marker tokens remain and closes the marker account back
/// to the bidder.
pub(crate) fn reclaim_bid_marker<'info>(
    marker_mint: &AccountInfo<'info>,
    marker_token: &AccountInfo<'info>,
    bidder: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
) -> Result<()> {
    let amount = token_account_amount(marker_token);
    if amount > 0 {
        burn_tokens(marker_mint, marker_token, bidder, token_program, amount)?;
    }
    close_token_account(marker_token, bidder, bidder, token_program)
}
