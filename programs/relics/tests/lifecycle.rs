//! Model-level walkthroughs of the catalog lifecycle: block completion,
//! mystery sale and reveal, auctions, and commission.  These drive the pure
//! state machine and curves exactly the way the instruction handlers do,
//! without a validator harness.

use anchor_lang::prelude::Pubkey;
use anchor_lang::AnchorSerialize;

use relics::curve::{compute_minimum_bid, compute_price};
use relics::states::{Block, BlockConfiguration, Entry, EntryState};
use relics::utils::{commission_amount, entry_commit, verify_commit};
use relics::LAMPORTS_PER_SOL;

fn catalog_config() -> BlockConfiguration {
    BlockConfiguration {
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
    }
}

fn fresh_block(config: BlockConfiguration) -> Block {
    Block {
        config,
        entries_added_bitmap: vec![0; Block::bitmap_len(config.total_entry_count)],
        ..Block::default()
    }
}

/// Mirrors what `add_entries_to_block` does when the last entry lands.
fn complete_block(block: &mut Block, now: i64, epoch: u64) {
    for index in 0..block.config.total_entry_count {
        if !block.entry_added(index) {
            block.record_entry_added(index);
        }
    }
    assert!(block.is_complete());
    block.block_start_timestamp = now;
    if block.config.total_mystery_count == 0 {
        block.mystery_phase_end_timestamp = now;
    }
    block.last_commission_change_epoch = epoch;
}

fn entry_for(block: &Block, commitment: [u8; 32]) -> Entry {
    Entry {
        entry_index: 0,
        mint: Pubkey::new_unique(),
        minimum_price_lamports: block.config.minimum_price_lamports,
        has_auction: block.config.has_auction,
        duration: block.config.duration,
        non_auction_start_price_lamports: block.config.final_start_price_lamports,
        reveal_sha256: commitment,
        commission: block.commission,
        ..Entry::default()
    }
}

#[test]
fn create_and_complete_a_block() {
    let config = catalog_config();
    config.validate(5_000).unwrap();

    let mut block = fresh_block(config);
    block.record_entry_added(0);
    block.record_entry_added(1);
    assert!(!block.is_complete());
    assert_eq!(block.block_start_timestamp, 0);

    complete_block(&mut block, 10_000, 400);
    assert_eq!(block.block_start_timestamp, 10_000);
    assert_eq!(block.last_commission_change_epoch, 400);

    // Two unsold mysteries keep the block unrevealable until the phase
    // times out.
    assert!(!block.is_revealable(10_000 + 3600));
    assert!(block.is_revealable(10_000 + 3601));
}

#[test]
fn mystery_buy_then_reveal() {
    let mut block = fresh_block(catalog_config());
    complete_block(&mut block, 10_000, 400);

    let salt = 0x5EED_CAFE;
    let mut entry = entry_for(&block, [0; 32]);
    entry.metadata.level_1_ki = 1_000;
    entry.metadata.level_metadata[0].ki_factor = 1_000;
    let metadata_bytes = entry.metadata.try_to_vec().unwrap();
    entry.reveal_sha256 = entry_commit(&metadata_bytes, salt);

    // 1800 seconds in, the mystery price sits between the floor and the
    // start price, and a 1.5 SOL cap clears it.
    let now = 10_000 + 1800;
    assert_eq!(
        entry.state(Some(&block), now),
        EntryState::PreRevealUnowned
    );
    let price = compute_price(
        block.config.mystery_phase_duration as u64,
        block.config.mystery_start_price_lamports,
        block.config.minimum_price_lamports,
        (now - block.block_start_timestamp) as u64,
    );
    assert!(price >= block.config.minimum_price_lamports);
    assert!(price <= block.config.mystery_start_price_lamports);
    assert!(price <= 1_500_000);

    // The buy: proceeds escrow, counters move, state flips to owned.
    entry.purchase_price_lamports = price;
    block.mysteries_sold_count += 1;
    assert_eq!(
        entry.state(Some(&block), now),
        EntryState::PreRevealOwned
    );

    // Selling the second mystery makes the block revealable at once.
    block.mysteries_sold_count += 1;
    block.mystery_phase_end_timestamp = now;
    assert_eq!(
        entry.state(Some(&block), now),
        EntryState::WaitingForRevealOwned
    );

    // The reveal verifies the commitment and zeroes it.
    assert!(verify_commit(&entry.reveal_sha256, &metadata_bytes, salt));
    entry.reveal_timestamp = now;
    entry.reveal_sha256 = [0; 32];
    assert_eq!(entry.state(Some(&block), now), EntryState::Owned);
}

#[test]
fn reveal_rejects_the_wrong_salt() {
    let mut block = fresh_block(catalog_config());
    complete_block(&mut block, 10_000, 400);

    let entry = {
        let mut entry = entry_for(&block, [0; 32]);
        entry.metadata.level_1_ki = 7;
        let bytes = entry.metadata.try_to_vec().unwrap();
        entry.reveal_sha256 = entry_commit(&bytes, 0xDEAD_BEEF);
        entry
    };

    let metadata_bytes = entry.metadata.try_to_vec().unwrap();
    assert!(!verify_commit(
        &entry.reveal_sha256,
        &metadata_bytes,
        0xCAFE_BABE
    ));
    // The entry stays committed.
    assert!(!entry.is_revealed());
}

#[test]
fn auction_and_winning_claim() {
    let mut config = catalog_config();
    config.total_mystery_count = 0;
    config.has_auction = true;
    config.duration = 600;

    let mut block = fresh_block(config);
    complete_block(&mut block, 10_000, 400);
    assert!(block.is_revealable(10_000));

    // Reveal at t=0 starts the auction window.
    let mut entry = entry_for(&block, [0; 32]);
    entry.reveal_sha256 = [0; 32];
    entry.reveal_timestamp = 10_000;
    entry.auction.begin_timestamp = 10_000;
    assert_eq!(
        entry.state(Some(&block), 10_100),
        EntryState::InNormalAuction
    );

    // First bid at t=100: the floor is the plain minimum; the bidder's
    // stated minimum of 600_000 wins out.
    let floor = compute_minimum_bid(600, entry.minimum_price_lamports, 0, 100);
    assert_eq!(floor, 500_000);
    let first_bid = floor.max(600_000);
    let first_bid_account = Pubkey::new_unique();
    entry.auction.highest_bid_lamports = first_bid;
    entry.auction.winning_bid = first_bid_account;

    // Second bid at t=200 must clear the ratchet above 600_000.
    let floor = compute_minimum_bid(600, entry.minimum_price_lamports, first_bid, 200);
    assert!(floor > first_bid);
    assert!(floor <= 2_000_000);
    let second_bid = floor.max(700_000);
    let second_bid_account = Pubkey::new_unique();
    entry.auction.highest_bid_lamports = second_bid;
    entry.auction.winning_bid = second_bid_account;

    // Past the end of the auction the entry waits for its winner.
    assert_eq!(
        entry.state(Some(&block), 10_601),
        EntryState::WaitingToBeClaimed
    );

    // Only the recorded winning bid may claim; the claim makes the entry
    // owned, after which the loser can still reclaim.
    assert_ne!(first_bid_account, entry.auction.winning_bid);
    entry.purchase_price_lamports = second_bid;
    assert_eq!(entry.state(Some(&block), 10_601), EntryState::Owned);
    assert!(entry.has_auction);
}

#[test]
fn commission_charge_accounting() {
    // 10 SOL staked, 0.5 SOL earned, ~5% commission.
    let delegated = 10 * LAMPORTS_PER_SOL + LAMPORTS_PER_SOL / 2;
    let watermark = 10 * LAMPORTS_PER_SOL;

    let owed = commission_amount(delegated - watermark, 0x0CCC);
    assert_eq!(owed, 24_994_277);

    // The watermark lands on the post-split delegation, so a second crank
    // against the unchanged stake finds nothing more to charge.
    let new_watermark = delegated - owed;
    assert_eq!(new_watermark, 10_475_005_723);
    let delegated_after_split = new_watermark;
    assert_eq!(
        commission_amount(delegated_after_split - new_watermark, 0x0CCC),
        0
    );
}

#[test]
fn commission_cap_enforcement() {
    let mut block = fresh_block(catalog_config());
    complete_block(&mut block, 10_000, 400);
    block.commission = 0x0100;

    // Epoch 400 is when the block completed; nothing changes until 401.
    assert!(block.try_set_commission(0x0200, 400).is_err());

    // Too large an increase.
    assert!(block.try_set_commission(0x0C00, 401).is_err());

    // An acceptable one.
    block.try_set_commission(0x0500, 401).unwrap();

    // Once per epoch.
    assert!(block.try_set_commission(0x0501, 401).is_err());
    assert!(block.try_set_commission(0x0501, 402).is_ok());
}
