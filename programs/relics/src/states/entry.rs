use anchor_lang::prelude::*;

use crate::states::Block;

//
// ──────────────────────────────────────────────────────────────────────────────
// Entry Account
// ──────────────────────────────────────────────────────────────────────────────
//

pub const ENTRY_LEVEL_COUNT: usize = 10;
pub const ENTRY_STAT_COUNT: usize = 20;
pub const MAX_ENTRY_LEVEL: u8 = 8;

/// Per-level presentation and earning parameters of an entry.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelMetadata {
    /// Form at this level.
    pub form: u8,

    /// Attack and defense skill; top 4 bits attack, bottom 4 defense.
    pub skill: u8,

    /// Specials added at this level.
    pub special1: u8,
    pub special2: u8,

    /// Number of stake-earned lamports per Ki awarded.  E.g. 1000 means one
    /// Ki per 1000 lamports earned by staking.  0 means the entry earns no
    /// Ki at this level.
    pub ki_factor: u32,

    /// Name at this level; the token metadata name limit is 32 bytes.
    pub name: [u8; 32],

    /// Image uri at this level; the token metadata uri limit is 200 bytes.
    pub uri: [u8; 200],
}

impl Default for LevelMetadata {
    fn default() -> Self {
        Self {
            form: 0,
            skill: 0,
            special1: 0,
            special2: 0,
            ki_factor: 0,
            name: [0; 32],
            uri: [0; 200],
        }
    }
}

impl LevelMetadata {
    pub const LEN: usize = 1 + 1 + 1 + 1 + 4 + 32 + 200;

    /// The name as a str, trailing NULs stripped.
    pub fn name_str(&self) -> &str {
        trimmed_str(&self.name)
    }

    /// The uri as a str, trailing NULs stripped.
    pub fn uri_str(&self) -> &str {
        trimmed_str(&self.uri)
    }
}

fn trimmed_str(bytes: &[u8]) -> &str {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    core::str::from_utf8(&bytes[..end]).unwrap_or("")
}

/// The in-band metadata of an entry.  All zeroes until the admin supplies
/// the revealed values, whose hash must match the entry's commitment.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Current level; displayed to users as level + 1.
    pub level: u8,

    /// Ki needed to reach level 1.  Each subsequent level costs 50% more
    /// than the previous one.
    pub level_1_ki: u64,

    /// Metadata for each level.
    pub level_metadata: [LevelMetadata; ENTRY_LEVEL_COUNT],

    /// Current stats.
    pub stats: [u16; ENTRY_STAT_COUNT],
}

impl Default for EntryMetadata {
    fn default() -> Self {
        Self {
            level: 0,
            level_1_ki: 0,
            level_metadata: [LevelMetadata::default(); ENTRY_LEVEL_COUNT],
            stats: [0; ENTRY_STAT_COUNT],
        }
    }
}

impl EntryMetadata {
    pub const LEN: usize = 1 + 8 + LevelMetadata::LEN * ENTRY_LEVEL_COUNT + 2 * ENTRY_STAT_COUNT;
}

/// Auction bookkeeping for an entry whose block sells unsold reveals by
/// auction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryAuction {
    /// When the auction began (the entry's reveal time), 0 if none started.
    pub begin_timestamp: i64,

    /// Current highest bid, 0 if no bids have been received.
    pub highest_bid_lamports: u64,

    /// Bid account address of the highest bid.  Stored because the bid
    /// account's lamports balance alone cannot identify the winner: anyone
    /// can transfer lamports into an account after it is created.
    pub winning_bid: Pubkey,
}

impl EntryAuction {
    pub const LEN: usize = 8 + 8 + 32;
}

/// Staking bookkeeping, live while the entry is staked.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryStaked {
    /// The stake account held by this entry, all zeroes if none.
    pub stake_account: Pubkey,

    /// Delegated lamports at the time of the last commission charge.
    pub last_commission_charge_stake_account_lamports: u64,

    /// Delegated lamports at the time of the last Ki harvest.
    pub last_ki_harvest_stake_account_lamports: u64,
}

impl EntryStaked {
    pub const LEN: usize = 32 + 8 + 8;
}

/// A single catalog entry, at the PDA derived from `(ENTRY_SEED, mint)`.
#[account]
#[derive(Default, Debug)]
pub struct Entry {
    /// Index of this entry within its block.
    pub entry_index: u16,

    /// The block this entry belongs to.
    pub block: Pubkey,

    /// Copied from the block for direct lookup.
    pub group_number: u32,
    pub block_number: u32,

    /// The entry token mint.
    pub mint: Pubkey,

    /// The program's token account holding the entry token while unsold.
    pub token: Pubkey,

    /// The token metadata account of the entry mint.
    pub metaplex_metadata: Pubkey,

    // Economic parameters copied from the block configuration, so that sale
    // and auction paths never need the block account once the entry is
    // revealed.
    pub minimum_price_lamports: u64,
    pub has_auction: bool,
    pub duration: u32,
    pub non_auction_start_price_lamports: u64,

    /// Before reveal: SHA-256 of (SHA-256 of the entry metadata ‖ 8 byte
    /// salt).  After reveal: all zeroes.
    pub reveal_sha256: [u8; 32],

    /// When the entry was revealed, 0 before.
    pub reveal_timestamp: i64,

    /// Lamports the entry was purchased for; nonzero means owned.  Mystery
    /// proceeds sit in the authority account until reveal (or refund);
    /// post-reveal proceeds go directly to the admin.
    pub purchase_price_lamports: u64,

    /// Set once a mystery purchase has been refunded, to prevent a second
    /// refund of the same entry.
    pub refund_awarded: bool,

    pub auction: EntryAuction,

    pub staked: EntryStaked,

    /// Commission snapshot for this entry, rolled forward from the block on
    /// every commission charge, so a block commission change never applies
    /// retroactively to earnings already banked.
    pub commission: u16,

    pub metadata: EntryMetadata,
}

impl Entry {
    pub const LEN: usize = 8
        + 2
        + 32
        + 4
        + 4
        + 32 * 3
        + 8
        + 1
        + 4
        + 8
        + 32
        + 8
        + 8
        + 1
        + EntryAuction::LEN
        + EntryStaked::LEN
        + 2
        + EntryMetadata::LEN;

    pub fn is_revealed(&self) -> bool {
        self.reveal_sha256 == [0u8; 32]
    }

    pub fn is_owned(&self) -> bool {
        self.purchase_price_lamports > 0
    }

    pub fn is_staked(&self) -> bool {
        self.staked.stake_account != Pubkey::default()
    }

    /// Assumes the entry is revealed.
    fn in_normal_auction(&self, now: i64) -> bool {
        self.has_auction
            && self.auction.begin_timestamp != 0
            && self.auction.begin_timestamp + self.duration as i64 > now
    }

    /// Derives the entry's lifecycle state from stored fields and the clock.
    ///
    /// `block` is needed only to evaluate reveal criteria, so callers that
    /// reject every unrevealed state may pass `None`; with `None`, all
    /// unrevealed entries report as pre-reveal.
    pub fn state(&self, block: Option<&Block>, now: i64) -> EntryState {
        if self.is_revealed() {
            if self.is_owned() {
                if self.is_staked() {
                    EntryState::OwnedAndStaked
                } else {
                    EntryState::Owned
                }
            } else if self.in_normal_auction(now) {
                EntryState::InNormalAuction
            } else if self.auction.highest_bid_lamports > 0 {
                EntryState::WaitingToBeClaimed
            } else {
                EntryState::Unowned
            }
        } else if block.map(|b| b.is_revealable(now)).unwrap_or(false) {
            if self.is_owned() {
                EntryState::WaitingForRevealOwned
            } else {
                EntryState::WaitingForRevealUnowned
            }
        } else if self.is_owned() {
            EntryState::PreRevealOwned
        } else {
            EntryState::PreRevealUnowned
        }
    }

    /// Ki to burn to advance from the current level, in deci-Ki (Ki tokens
    /// carry one decimal place on chain).
    pub fn level_up_ki_cost(&self) -> u64 {
        let mut cost = self.metadata.level_1_ki;
        for _ in 0..self.metadata.level {
            // 1.5x per level
            cost += cost >> 1;
        }
        cost * 10
    }
}

/// All of the states an entry can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// Not revealed yet, not owned yet.
    PreRevealUnowned,
    /// Owned, but the containing block has not met its reveal criteria.
    PreRevealOwned,
    /// Block has met its reveal criteria, entry not revealed yet; unowned.
    WaitingForRevealUnowned,
    /// Block has met its reveal criteria, entry not revealed yet; owned.
    WaitingForRevealOwned,
    /// In a normal auction.
    InNormalAuction,
    /// Past its auction with a winning bid waiting to be claimed.
    WaitingToBeClaimed,
    /// Past its auction end period, never sold.
    Unowned,
    /// Owned and revealed, not staked.
    Owned,
    /// Owned, revealed, and staked.
    OwnedAndStaked,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::BlockConfiguration;

    fn complete_block(total_mystery_count: u16, mysteries_sold: u16) -> Block {
        Block {
            config: BlockConfiguration {
                total_entry_count: 1,
                total_mystery_count,
                mystery_phase_duration: 3600,
                ..BlockConfiguration::default()
            },
            added_entries_count: 1,
            block_start_timestamp: 1_000,
            mysteries_sold_count: mysteries_sold,
            entries_added_bitmap: vec![0xFF, 0],
            ..Block::default()
        }
    }

    fn entry(revealed: bool) -> Entry {
        Entry {
            reveal_sha256: if revealed { [0; 32] } else { [0xAB; 32] },
            has_auction: true,
            duration: 600,
            ..Entry::default()
        }
    }

    #[test]
    fn unrevealed_states_follow_reveal_criteria_and_ownership() {
        let pending = complete_block(1, 0);
        let revealable = complete_block(1, 1);
        let now = 1_100;

        let mut e = entry(false);
        assert_eq!(e.state(Some(&pending), now), EntryState::PreRevealUnowned);
        assert_eq!(
            e.state(Some(&revealable), now),
            EntryState::WaitingForRevealUnowned
        );

        e.purchase_price_lamports = 1_000_000;
        assert_eq!(e.state(Some(&pending), now), EntryState::PreRevealOwned);
        assert_eq!(
            e.state(Some(&revealable), now),
            EntryState::WaitingForRevealOwned
        );

        // The mystery phase timing out also makes the block revealable.
        assert_eq!(
            e.state(Some(&pending), 1_000 + 3601),
            EntryState::WaitingForRevealOwned
        );
    }

    #[test]
    fn revealed_states_follow_auction_and_ownership() {
        let block = complete_block(0, 0);

        let mut e = entry(true);
        e.reveal_timestamp = 2_000;
        e.auction.begin_timestamp = 2_000;

        // Within the auction window.
        assert_eq!(e.state(Some(&block), 2_100), EntryState::InNormalAuction);

        // Window over, no bids.
        assert_eq!(e.state(Some(&block), 2_600), EntryState::Unowned);

        // Window over, bids outstanding.
        e.auction.highest_bid_lamports = 1_000_000;
        assert_eq!(e.state(Some(&block), 2_600), EntryState::WaitingToBeClaimed);

        // Owned trumps auction bookkeeping.
        e.purchase_price_lamports = 1_000_000;
        assert_eq!(e.state(Some(&block), 2_600), EntryState::Owned);

        e.staked.stake_account = Pubkey::new_unique();
        assert_eq!(e.state(Some(&block), 2_600), EntryState::OwnedAndStaked);
    }

    #[test]
    fn non_auction_entry_is_unowned_after_reveal() {
        let block = complete_block(0, 0);
        let mut e = entry(true);
        e.has_auction = false;
        e.reveal_timestamp = 2_000;
        assert_eq!(e.state(Some(&block), 2_001), EntryState::Unowned);
    }

    #[test]
    fn state_is_total_over_predicate_combinations() {
        // Every combination of (revealed, owned, staked, revealable,
        // in-window, bids) resolves to exactly one state without panicking.
        let blocks = [complete_block(1, 0), complete_block(1, 1)];
        for block in &blocks {
            for revealed in [false, true] {
                for owned in [false, true] {
                    for staked in [false, true] {
                        for begun in [false, true] {
                            for bids in [false, true] {
                                let mut e = entry(revealed);
                                e.reveal_timestamp = if revealed { 2_000 } else { 0 };
                                e.purchase_price_lamports = if owned { 1 } else { 0 };
                                if staked {
                                    e.staked.stake_account = Pubkey::new_unique();
                                }
                                e.auction.begin_timestamp = if begun { 2_000 } else { 0 };
                                e.auction.highest_bid_lamports = if bids { 1 } else { 0 };
                                e.state(Some(block), 2_100);
                                e.state(None, 2_100);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn level_up_cost_grows_half_again_per_level() {
        let mut e = Entry::default();
        e.metadata.level_1_ki = 1_000;

        assert_eq!(e.level_up_ki_cost(), 10_000);
        e.metadata.level = 1;
        assert_eq!(e.level_up_ki_cost(), 15_000);
        e.metadata.level = 2;
        assert_eq!(e.level_up_ki_cost(), 22_500);
        e.metadata.level = 3;
        // 2250 + 1125 = 3375 Ki, in deci-Ki
        assert_eq!(e.level_up_ki_cost(), 33_750);
    }

    #[test]
    fn level_name_and_uri_trim_trailing_nuls() {
        let mut level = LevelMetadata::default();
        level.name[..5].copy_from_slice(b"Kitsu");
        level.uri[..18].copy_from_slice(b"https://x.test/a.j");
        assert_eq!(level.name_str(), "Kitsu");
        assert_eq!(level.uri_str(), "https://x.test/a.j");
    }
}
