use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::curve::compute_minimum_bid;
use crate::error::ErrorCode;
use crate::states::{Bid, BidPlaced, Entry, EntryState};
use crate::utils::{create_pda, create_pda_token_account, mint_tokens_signed};
use crate::{
    AUTHORITY_SEED, BID_MARKER_MINT_SEED, BID_MARKER_TOKEN_SEED, BID_SEED,
};

/// Accounts for bidding on an in-auction entry.
///
/// A bid escrows its lamports in a per-bid account whose address derives
/// from the bidder's bid-marker token account, and mints 10 deci bid-marker
/// tokens to the bidder so user interfaces can discover outstanding bids.
/// Losing the marker is harmless: the bid account is still reachable from
/// the entry mint and bidder addresses.
#[derive(Accounts)]
pub struct PlaceBid<'info> {
    /// Pays the bid and all account rent.
    #[account(mut)]
    pub bidder: Signer<'info>,

    #[account(mut)]
    pub entry: Account<'info, Entry>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [BID_MARKER_MINT_SEED],
        bump,
    )]
    pub bid_marker_mint: UncheckedAccount<'info>,

    /// The bidder's marker token account for this entry; created on the
    /// first bid.
    ///
    /// CHECK: PDA derivation enforced by seeds; created below.
    #[account(
        mut,
        seeds = [
            BID_MARKER_TOKEN_SEED,
            entry.mint.as_ref(),
            bidder.key().as_ref(),
        ],
        bump,
    )]
    pub bid_marker_token: UncheckedAccount<'info>,

    /// Escrows the bid lamports; re-used (topped up) when the same bidder
    /// raises their bid on the same entry.
    ///
    /// CHECK: PDA derivation enforced by seeds; created below.
    #[account(
        mut,
        seeds = [BID_SEED, bid_marker_token.key().as_ref()],
        bump,
    )]
    pub bid_account: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds; mints the marker.
    #[account(
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn bid(
    ctx: Context<PlaceBid>,
    minimum_bid_lamports: u64,
    maximum_bid_lamports: u64,
) -> Result<()> {
    require!(
        minimum_bid_lamports <= maximum_bid_lamports,
        ErrorCode::BidTooLow
    );

    let entry = &mut ctx.accounts.entry;
    let now = Clock::get()?.unix_timestamp;

    require!(
        entry.state(None, now) == EntryState::InNormalAuction,
        ErrorCode::EntryNotInAuction
    );

    let floor = compute_minimum_bid(
        entry.duration as u64,
        entry.minimum_price_lamports,
        entry.auction.highest_bid_lamports,
        (now - entry.auction.begin_timestamp) as u64,
    );

    // 0 means the auction is saturated and no bid is possible.
    require!(floor > 0, ErrorCode::BidTooLow);
    require!(floor <= maximum_bid_lamports, ErrorCode::BidTooLow);

    // The actual bid is the floor, lifted to the bidder's stated minimum.
    let bid_lamports = floor.max(minimum_bid_lamports);

    // Mint a bid marker, creating the marker token account on first use.
    // Minting on every bid keeps the account non-empty so wallet cleanup
    // tooling does not close it while the bid is live.
    let bid_marker_token = ctx.accounts.bid_marker_token.to_account_info();
    if bid_marker_token.data_is_empty() {
        create_pda_token_account(
            &bid_marker_token,
            &[
                BID_MARKER_TOKEN_SEED,
                entry.mint.as_ref(),
                ctx.accounts.bidder.key.as_ref(),
            ],
            &ctx.accounts.bid_marker_mint.to_account_info(),
            &ctx.accounts.bidder.to_account_info(),
            &ctx.accounts.bidder.to_account_info(),
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.system_program.to_account_info(),
        )?;
    }
    mint_tokens_signed(
        &ctx.accounts.bid_marker_mint.to_account_info(),
        &bid_marker_token,
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &ctx.accounts.token_program.to_account_info(),
        10,
    )?;

    // The bid account holds the bid lamports in escrow until a claim.  A
    // raised bid tops the same account up to the new amount.
    let bid_info = ctx.accounts.bid_account.to_account_info();
    let bid_marker_token_key = bid_marker_token.key();
    create_pda(
        &bid_info,
        &[BID_SEED, bid_marker_token_key.as_ref()],
        &ctx.accounts.bidder.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        &crate::ID,
        bid_lamports,
        Bid::LEN as u64,
    )?;
    Bid {
        mint: entry.mint,
        bidder: *ctx.accounts.bidder.key,
    }
    .try_serialize(&mut &mut bid_info.try_borrow_mut_data()?[..])?;

    entry.auction.highest_bid_lamports = bid_lamports;
    entry.auction.winning_bid = bid_info.key();

    emit!(BidPlaced {
        bidder: *ctx.accounts.bidder.key,
        mint: entry.mint,
        amount: bid_lamports,
    });
    Ok(())
}
