use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::error::ErrorCode;
use crate::instructions::claim_winning::reclaim_bid_marker;
use crate::states::{Bid, Entry, EntryState, LosingBidReclaimed};
use crate::{BID_MARKER_MINT_SEED, BID_MARKER_TOKEN_SEED};

/// Accounts for reclaiming an outbid (or simply not winning) bid.  Legal
/// while the auction still runs and after it settles, as long as this is
/// not the winning bid.  The optional trailing accounts reclaim the bid
/// marker in the same call.
#[derive(Accounts)]
pub struct ClaimLosing<'info> {
    /// Receives the escrowed bid lamports back.
    #[account(mut)]
    pub bidder: Signer<'info>,

    pub entry: Account<'info, Entry>,

    #[account(
        mut,
        constraint = bid.bidder == bidder.key() @ ErrorCode::CannotClaimBid,
        constraint = bid.key() != entry.auction.winning_bid @ ErrorCode::BidWon,
    )]
    pub bid: Account<'info, Bid>,

    pub token_program: Program<'info, Token>,

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

pub fn claim_losing(ctx: Context<ClaimLosing>) -> Result<()> {
    let entry = &ctx.accounts.entry;
    let now = Clock::get()?.unix_timestamp;

    match entry.state(None, now) {
        // A running auction can always have outbid losers.
        EntryState::InNormalAuction => {}

        // A settled auction can too, but only if the entry ever had one.
        EntryState::WaitingToBeClaimed | EntryState::Owned | EntryState::OwnedAndStaked => {
            require!(entry.has_auction, ErrorCode::CannotClaimBid);
        }

        // No bid can ever have existed in the remaining states.
        _ => return err!(ErrorCode::CannotClaimBid),
    }

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

    let bid_info = ctx.accounts.bid.to_account_info();
    let bid_lamports = bid_info.lamports();
    bid_info.sub_lamports(bid_lamports)?;
    ctx.accounts
        .bidder
        .to_account_info()
        .add_lamports(bid_lamports)?;

    emit!(LosingBidReclaimed {
        bidder: *ctx.accounts.bidder.key,
        mint: entry.mint,
        amount: bid_lamports,
    });
    Ok(())
}
