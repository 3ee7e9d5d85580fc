use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::{MAX_COMMISSION_INCREASE, MAX_START_PRICE_LAMPORTS};

//
// ──────────────────────────────────────────────────────────────────────────────
// Block Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Operational parameters of a block of entries.  Supplied when the block is
/// created and never changed afterwards.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockConfiguration {
    /// Identification of the group this block belongs to.
    pub group_number: u32,

    /// Identification of this block within its group.
    pub block_number: u32,

    /// Total number of entries in this block.  Must be greater than 0.
    pub total_entry_count: u16,

    /// Number of mysteries which may be purchased; when all are purchased the
    /// block becomes revealable.  Must be <= total_entry_count.
    pub total_mystery_count: u16,

    /// Seconds from the last entry add to the end of the mystery phase.
    pub mystery_phase_duration: u32,

    /// Price in lamports of a mystery at the instant the mystery phase
    /// begins.  Must be >= minimum_price_lamports.
    pub mystery_start_price_lamports: u64,

    /// Seconds past the end of the mystery phase after which an unrevealed
    /// purchased entry allows a zero-penalty refund of the purchase price
    /// (the purchaser keeps the token itself).
    pub reveal_period_duration: u32,

    /// Used three ways: the mystery price at the end of the mystery phase,
    /// the starting bid floor of an auction, and the final price of an
    /// unsold non-auction entry past its sale period.
    pub minimum_price_lamports: u64,

    /// If true, a revealed unsold entry enters an auction of `duration`
    /// seconds.  If false, it is immediately purchasable at a price decaying
    /// from final_start_price_lamports over `duration` seconds.
    pub has_auction: bool,

    /// Auction length, or the non-auction price decay window.
    pub duration: u32,

    /// Initial sale price of a revealed non-auction entry.  Must be
    /// >= minimum_price_lamports.
    pub final_start_price_lamports: u64,

    /// Seconds after block completion during which only whitelisted buyers
    /// may purchase.  0 means the block never uses a whitelist.
    pub whitelist_duration: u32,
}

impl BlockConfiguration {
    pub const LEN: usize = 4 + 4 + 2 + 2 + 4 + 8 + 4 + 8 + 1 + 4 + 8 + 4;

    /// Validates the configuration against the creation-time invariants.
    /// `bid_rent_minimum` is the rent-exempt minimum of a bid account; prices
    /// below it could produce bids that are not rent exempt.
    pub fn validate(&self, bid_rent_minimum: u64) -> Result<()> {
        require!(self.total_entry_count > 0, ErrorCode::InvalidEntryCount);

        if self.total_mystery_count > 0 && self.mystery_phase_duration > 0 {
            require!(
                self.total_mystery_count <= self.total_entry_count,
                ErrorCode::MysteryCountExceedsEntryCount
            );
            require!(
                self.mystery_start_price_lamports <= MAX_START_PRICE_LAMPORTS,
                ErrorCode::StartPriceTooHigh
            );
            require!(
                self.minimum_price_lamports <= self.mystery_start_price_lamports,
                ErrorCode::MinimumPriceExceedsStartPrice
            );
        }

        if self.has_auction {
            require!(self.duration > 0, ErrorCode::ZeroDuration);
        } else {
            require!(
                self.final_start_price_lamports <= MAX_START_PRICE_LAMPORTS,
                ErrorCode::StartPriceTooHigh
            );
            require!(
                self.final_start_price_lamports >= self.minimum_price_lamports,
                ErrorCode::MinimumPriceExceedsStartPrice
            );
        }

        require!(
            self.minimum_price_lamports >= bid_rent_minimum,
            ErrorCode::MinimumPriceBelowBidRent
        );

        Ok(())
    }
}

/// Per-block state: the immutable configuration plus the mutable aggregates
/// maintained by entry adds, mystery sales, reveals and commission changes.
#[account]
#[derive(Default, Debug)]
pub struct Block {
    /// Never changed after the block is created.  Each entry of the block
    /// carries a copy of the economic parameters it needs.
    pub config: BlockConfiguration,

    /// Number of entries added to the block so far.
    pub added_entries_count: u16,

    /// Timestamp at which the last entry was added and the block became
    /// complete; the mystery phase begins at that instant.  0 until then.
    pub block_start_timestamp: i64,

    /// Number of mysteries sold so far.
    pub mysteries_sold_count: u16,

    /// Timestamp at which the number of mysteries sold reached
    /// total_mystery_count; if the block has no mysteries, the timestamp of
    /// the last entry add.
    pub mystery_phase_end_timestamp: i64,

    /// Commission charged on staked-entry earnings, as a binary fraction of
    /// 0xFFFF.  May change at most once per epoch, by at most
    /// MAX_COMMISSION_INCREASE upwards.  Takes effect per entry only after
    /// that entry's next commission charge.
    pub commission: u16,

    /// Epoch of the last commission change.
    pub last_commission_change_epoch: u64,

    /// Bitmap of entry indices which have already been provisioned.  Allows
    /// entries to be added across multiple transactions and replayed safely.
    pub entries_added_bitmap: Vec<u8>,
}

impl Block {
    /// Account size for a block holding `total_entry_count` entries.
    pub fn space_for(total_entry_count: u16) -> usize {
        8 + BlockConfiguration::LEN + 2 + 8 + 2 + 8 + 2 + 8 + 4
            + Self::bitmap_len(total_entry_count)
    }

    pub fn bitmap_len(total_entry_count: u16) -> usize {
        (total_entry_count as usize + 7) / 8 + 1
    }

    pub fn is_complete(&self) -> bool {
        self.added_entries_count == self.config.total_entry_count
    }

    /// Assumes the block is complete.  A complete block is revealable once
    /// all mysteries are sold, or once the mystery phase has timed out.
    pub fn is_revealable(&self, now: i64) -> bool {
        if self.mysteries_sold_count == self.config.total_mystery_count {
            return true;
        }
        now > self.block_start_timestamp + self.config.mystery_phase_duration as i64
    }

    pub fn entry_added(&self, entry_index: u16) -> bool {
        self.entries_added_bitmap[entry_index as usize / 8] & (1 << (entry_index % 8)) != 0
    }

    pub fn record_entry_added(&mut self, entry_index: u16) {
        self.entries_added_bitmap[entry_index as usize / 8] |= 1 << (entry_index % 8);
        self.added_entries_count += 1;
    }

    /// True while the block restricts purchases to whitelisted buyers.
    pub fn in_whitelist_phase(&self, now: i64) -> bool {
        self.config.whitelist_duration > 0
            && now < self.block_start_timestamp + self.config.whitelist_duration as i64
    }

    /// Applies a commission change, enforcing the once-per-epoch rule and the
    /// increase cap.
    pub fn try_set_commission(&mut self, commission: u16, epoch: u64) -> Result<()> {
        require!(
            self.last_commission_change_epoch < epoch,
            ErrorCode::CommissionAlreadySetThisEpoch
        );
        require!(
            commission as u32 <= self.commission as u32 + MAX_COMMISSION_INCREASE as u32,
            ErrorCode::CommissionTooHigh
        );

        self.commission = commission;
        self.last_commission_change_epoch = epoch;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_block(total_entry_count: u16, total_mystery_count: u16) -> Block {
        Block {
            config: BlockConfiguration {
                total_entry_count,
                total_mystery_count,
                mystery_phase_duration: 3600,
                ..BlockConfiguration::default()
            },
            entries_added_bitmap: vec![0; Block::bitmap_len(total_entry_count)],
            ..Block::default()
        }
    }

    #[test]
    fn bitmap_tracks_added_entries() {
        let mut block = test_block(11, 0);

        assert!(!block.is_complete());
        for index in [0u16, 3, 7, 8, 10] {
            assert!(!block.entry_added(index));
            block.record_entry_added(index);
            assert!(block.entry_added(index));
        }

        let popcount: u32 = block
            .entries_added_bitmap
            .iter()
            .map(|byte| byte.count_ones())
            .sum();
        assert_eq!(popcount as u16, block.added_entries_count);
        assert_eq!(block.added_entries_count, 5);
        assert!(!block.is_complete());

        for index in [1u16, 2, 4, 5, 6, 9] {
            block.record_entry_added(index);
        }
        assert!(block.is_complete());
    }

    #[test]
    fn complete_iff_all_added() {
        let mut block = test_block(3, 0);
        block.record_entry_added(0);
        block.record_entry_added(2);
        assert!(!block.is_complete());
        block.record_entry_added(1);
        assert!(block.is_complete());
    }

    #[test]
    fn revealable_when_all_mysteries_sold_or_phase_over() {
        let mut block = test_block(4, 2);
        block.block_start_timestamp = 1_000;

        // Mysteries outstanding, phase running.
        assert!(!block.is_revealable(1_000 + 3600));

        // Phase timed out.
        assert!(block.is_revealable(1_000 + 3601));

        // All mysteries sold, well before the timeout.
        block.mysteries_sold_count = 2;
        assert!(block.is_revealable(1_001));
    }

    #[test]
    fn zero_mystery_block_immediately_revealable() {
        let block = test_block(4, 0);
        assert!(block.is_revealable(0));
    }

    #[test]
    fn whitelist_phase_window() {
        let mut block = test_block(1, 0);
        block.block_start_timestamp = 1_000;

        // No whitelist configured: never in the phase.
        assert!(!block.in_whitelist_phase(1_001));

        block.config.whitelist_duration = 600;
        assert!(block.in_whitelist_phase(1_001));
        assert!(block.in_whitelist_phase(1_599));
        assert!(!block.in_whitelist_phase(1_600));
    }

    #[test]
    fn commission_cap_and_epoch_gate() {
        let mut block = test_block(1, 0);
        block.commission = 0x0100;
        block.last_commission_change_epoch = 10;

        // Too large an increase.
        assert!(block.try_set_commission(0x0C00, 11).is_err());

        // Acceptable increase.
        block.try_set_commission(0x0500, 11).unwrap();
        assert_eq!(block.commission, 0x0500);
        assert_eq!(block.last_commission_change_epoch, 11);

        // Second change in the same epoch refused.
        assert!(block.try_set_commission(0x0400, 11).is_err());

        // Next epoch: decreases are always allowed.
        block.try_set_commission(0x0001, 12).unwrap();
        assert_eq!(block.commission, 0x0001);
    }

    #[test]
    fn commission_cap_does_not_overflow_near_max() {
        let mut block = test_block(1, 0);
        block.commission = 0xFFFF - 100;
        // new > old + 1310 never wraps even at the top of the range
        assert!(block.try_set_commission(0xFFFF, 1).is_ok());
    }

    #[test]
    fn config_validation() {
        let valid = BlockConfiguration {
            group_number: 1,
            block_number: 1,
            total_entry_count: 3,
            total_mystery_count: 2,
            mystery_phase_duration: 3600,
            mystery_start_price_lamports: 2_000_000,
            reveal_period_duration: 7200,
            minimum_price_lamports: 500_000,
            has_auction: false,
            duration: 1800,
            final_start_price_lamports: 1_000_000,
            whitelist_duration: 0,
        };
        assert!(valid.validate(5_000).is_ok());

        let mut config = valid;
        config.total_entry_count = 0;
        assert!(config.validate(5_000).is_err());

        let mut config = valid;
        config.total_mystery_count = 4;
        assert!(config.validate(5_000).is_err());

        let mut config = valid;
        config.minimum_price_lamports = 3_000_000;
        assert!(config.validate(5_000).is_err());

        let mut config = valid;
        config.has_auction = true;
        config.duration = 0;
        assert!(config.validate(5_000).is_err());

        let mut config = valid;
        config.final_start_price_lamports = 400_000;
        assert!(config.validate(5_000).is_err());

        // Minimum price below the bid account rent floor.
        assert!(valid.validate(600_000).is_err());
    }

    #[test]
    fn space_covers_bitmap() {
        assert_eq!(Block::bitmap_len(1), 2);
        assert_eq!(Block::bitmap_len(8), 2);
        assert_eq!(Block::bitmap_len(9), 3);
        assert!(Block::space_for(300) > Block::space_for(1));
    }
}
