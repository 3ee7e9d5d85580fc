use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to track catalog state changes
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted when a block receives its final entry and its mystery phase
/// begins.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct BlockCompleted {
    pub block: Pubkey,
    pub group_number: u32,
    pub block_number: u32,
    /// The block start timestamp captured at completion.
    pub block_start_timestamp: i64,
}

/// Emitted once per entry when its commitment is successfully revealed.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EntryRevealed {
    pub mint: Pubkey,
    pub entry_index: u16,
    pub reveal_timestamp: i64,
}

/// Emitted when an entry is purchased, as a mystery or after reveal.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EntryPurchased {
    pub buyer: Pubkey,
    pub mint: Pubkey,
    /// Lamports paid.
    pub price: u64,
    /// True for mystery purchases, whose proceeds sit in escrow until
    /// reveal.
    pub mystery: bool,
}

/// Emitted when an unrevealed mystery purchase is refunded after the reveal
/// grace period.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RefundIssued {
    pub mint: Pubkey,
    pub destination: Pubkey,
    pub lamports: u64,
}

/// Emitted for every accepted auction bid.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct BidPlaced {
    pub bidder: Pubkey,
    pub mint: Pubkey,
    /// The escrowed bid amount in lamports.
    pub amount: u64,
}

/// Emitted when the auction winner claims the entry token.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct WinningBidClaimed {
    pub bidder: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

/// Emitted when a losing bidder reclaims their escrowed bid.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct LosingBidReclaimed {
    pub bidder: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

/// Emitted when an owned entry is staked to the designated validator.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EntryStakedEvent {
    pub mint: Pubkey,
    pub stake_account: Pubkey,
    /// Delegated lamports observed at stake time.
    pub delegated_lamports: u64,
}

/// Emitted when an entry's stake account is released back to its owner.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EntryDestaked {
    pub mint: Pubkey,
    pub stake_account: Pubkey,
    pub new_withdraw_authority: Pubkey,
}

/// Emitted when Ki is minted for a staked entry's earnings.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct KiHarvested {
    pub mint: Pubkey,
    /// Ki minted, in deci-Ki.
    pub amount: u64,
}

/// Emitted when commission is charged against a staked entry's earnings and
/// moved into the master stake account.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct CommissionCharged {
    pub mint: Pubkey,
    pub lamports: u64,
}

/// Emitted when a block's commission is changed.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct CommissionUpdated {
    pub block: Pubkey,
    pub commission: u16,
    pub epoch: u64,
}

/// Emitted when an entry levels up by burning Ki.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EntryLeveledUp {
    pub mint: Pubkey,
    /// The level reached.
    pub level: u8,
    /// Deci-Ki burned.
    pub ki_burned: u64,
}
