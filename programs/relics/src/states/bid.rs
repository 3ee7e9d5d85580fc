use anchor_lang::prelude::*;

/// One bid attempt, at the PDA derived from `(BID_SEED, bid marker token)`.
///
/// The account's lamports balance *is* the bid: the program escrows the bid
/// SOL directly in this account until the auction settles and the bid is
/// claimed as winning or losing.
#[account]
#[derive(Default, Debug)]
pub struct Bid {
    /// Mint of the entry bid on.
    pub mint: Pubkey,

    /// The bidder; the only key allowed to claim this bid.
    pub bidder: Pubkey,
}

impl Bid {
    pub const LEN: usize = 8 + 32 + 32;
}
