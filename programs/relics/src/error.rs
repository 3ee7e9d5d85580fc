use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Caller is not permitted to perform this operation")]
    PermissionDenied,

    #[msg("Block must have at least one entry")]
    InvalidEntryCount,

    #[msg("Mystery count exceeds the block's entry count")]
    MysteryCountExceedsEntryCount,

    #[msg("Start price exceeds the 100,000 SOL pricing-precision limit")]
    StartPriceTooHigh,

    #[msg("Minimum price exceeds the start price")]
    MinimumPriceExceedsStartPrice,

    #[msg("Auction duration must be nonzero")]
    ZeroDuration,

    #[msg("Minimum price is below the rent-exempt minimum of a bid account")]
    MinimumPriceBelowBidRent,

    #[msg("Block already exists")]
    BlockAlreadyExists,

    #[msg("Operation requires a complete block")]
    BlockNotComplete,

    #[msg("Block has not met its reveal criteria")]
    BlockNotRevealable,

    #[msg("Entry range extends past the block's entry count")]
    InvalidEntryRange,

    #[msg("Entry has already been revealed")]
    AlreadyRevealed,

    #[msg("Reveal hash does not match the entry's commitment")]
    InvalidHash,

    #[msg("Entry is already owned")]
    AlreadyOwned,

    #[msg("Entry is waiting for reveal and cannot be purchased")]
    EntryWaitingForReveal,

    #[msg("Entry is in auction and can only be bid on")]
    EntryInAuction,

    #[msg("Entry has a winning bid waiting to be claimed")]
    EntryWaitingToBeClaimed,

    #[msg("Entry is not in auction")]
    EntryNotInAuction,

    #[msg("Entry is not in a refundable state")]
    EntryNotRefundable,

    #[msg("Refund was already awarded for this entry")]
    AlreadyRefunded,

    #[msg("Actual price is higher than the caller's maximum price")]
    PriceTooHigh,

    #[msg("Insufficient funds provided for the operation")]
    InsufficientFunds,

    #[msg("Buyer is not present in the block's whitelist")]
    FailedWhitelistCheck,

    #[msg("Whitelist would exceed its maximum entry count")]
    TooManyWhitelistEntries,

    #[msg("Whitelist is still in use by its block")]
    WhitelistInUse,

    #[msg("Bid is below the current bid floor")]
    BidTooLow,

    #[msg("Bid cannot be claimed in the entry's current state")]
    CannotClaimBid,

    #[msg("Bid is the winning bid and cannot be reclaimed as losing")]
    BidWon,

    #[msg("Entry is not in a stakeable state")]
    NotStakeable,

    #[msg("Entry is not staked")]
    NotStaked,

    #[msg("Entry is not owned by the caller")]
    NotOwned,

    #[msg("Entry is already at the maximum level")]
    AlreadyAtMaxLevel,

    #[msg("Commission was already changed this epoch")]
    CommissionAlreadySetThisEpoch,

    #[msg("Commission increase exceeds the per-epoch cap")]
    CommissionTooHigh,

    #[msg("Account is not a valid stake account")]
    InvalidStakeAccount,

    #[msg("Stake account lockup is in force")]
    StakeAccountLocked,

    #[msg("Failed to move stake into the master stake account")]
    FailedToMoveStake,

    #[msg("Failed to move stake out of the master stake account")]
    FailedToMoveStakeOut,

    #[msg("Failed to delegate the stake account")]
    FailedToDelegate,

    #[msg("Stake program did not return a minimum delegation")]
    FailedToGetMinimumStakeDelegation,

    #[msg("Program derived account could not be created")]
    CreateAccountFailed,

    #[msg("Existing account cannot be resized to the required length")]
    InvalidResize,

    #[msg("Arithmetic overflow")]
    Overflow,
}
