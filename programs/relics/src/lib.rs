use anchor_lang::prelude::*;

declare_id!("81pTkiMiWyUaZznoLpiW4TBhruAM6kPBH5upukbncWT5");

/// The superuser: the only key allowed to bootstrap the program and rotate
/// the admin.
pub mod superuser {
    use anchor_lang::prelude::declare_id;
    declare_id!("gTcNcfNDb5JCce9jHQcQNH2ibskngyLhBMx7ubEoFro");
}

/// The validator vote account that all entry stake and the master stake are
/// delegated to.
pub mod validator_vote {
    use anchor_lang::prelude::declare_id;
    declare_id!("9nTU2qTdhnqiQv4dp1f3K8XbVoTdR8QQcWPmHWaY9bs3");
}

#[cfg(not(feature = "no-entrypoint"))]
solana_security_txt::security_txt! {
    name: "Relics",
    project_url: "https://www.relics-catalog.io",
    contacts: "email:security@relics-catalog.io",
    policy: "https://www.relics-catalog.io/security_policy.txt",
    source_code: "https://github.com/relics-catalog/relics"
}

// Each PDA class carries a distinct one-byte seed prefix, so addresses of
// different classes can never collide even where their remaining seeds would.
pub const CONFIG_SEED: &[u8] = &[1];
pub const AUTHORITY_SEED: &[u8] = &[2];
pub const MASTER_STAKE_SEED: &[u8] = &[3];
pub const KI_MINT_SEED: &[u8] = &[4];
pub const MINT_SEED: &[u8] = &[5];
pub const TOKEN_SEED: &[u8] = &[6];
pub const BID_SEED: &[u8] = &[9];
pub const BRIDGE_SEED: &[u8] = &[10];
pub const BID_MARKER_MINT_SEED: &[u8] = &[11];
pub const BID_MARKER_TOKEN_SEED: &[u8] = &[12];
pub const WHITELIST_SEED: &[u8] = &[13];
pub const BLOCK_SEED: &[u8] = &[14];
pub const ENTRY_SEED: &[u8] = &[15];

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Minimum number of lamports retained staked in the master stake account.
/// Must always be 2x the platform minimum stake delegation (plus one for good
/// measure), because the commission bridge can momentarily split the minimum
/// delegation out of the master.
pub const MASTER_STAKE_ACCOUNT_MIN_LAMPORTS: u64 = (2 * 1 + 1) * LAMPORTS_PER_SOL;

/// Commission values are binary fractions of 0xFFFF.
pub const COMMISSION_DENOMINATOR: u64 = 0xFFFF;

/// Largest allowed single increase of a block's commission, ~2% of 0xFFFF.
pub const MAX_COMMISSION_INCREASE: u16 = 1310;

/// Start prices above this threshold would make the /1000 pre-scaling of the
/// price curve lose too much precision.
pub const MAX_START_PRICE_LAMPORTS: u64 = 100_000 * LAMPORTS_PER_SOL;

pub const KI_TOKEN_NAME: &str = "Ki";
pub const KI_TOKEN_SYMBOL: &str = "KI";
pub const KI_TOKEN_METADATA_URI: &str = "https://www.relics-catalog.io/tokens/ki.json";

// Bid markers use the Metaplex fungible standard, which requires at least one
// decimal place; amounts are therefore stored on-chain as deci-tokens.
pub const BID_MARKER_TOKEN_NAME: &str = "Relics Auction Bid Marker";
pub const BID_MARKER_TOKEN_SYMBOL: &str = "RLC-BID";
pub const BID_MARKER_TOKEN_METADATA_URI: &str =
    "https://www.relics-catalog.io/tokens/bid_marker.json";

pub mod curve;
pub mod error;
pub mod instructions;
pub mod states;
pub mod utils;

use instructions::*;
use states::{BlockConfiguration, EntryMetadata};

#[program]
pub mod relics {

    use super::*;

    pub fn initialize(ctx: Context<Initialize>, admin: Pubkey) -> Result<()> {
        instructions::initialize(ctx, admin)
    }

    pub fn set_admin(ctx: Context<SetAdmin>, new_admin: Pubkey) -> Result<()> {
        instructions::set_admin(ctx, new_admin)
    }

    pub fn create_block(
        ctx: Context<CreateBlock>,
        initial_commission: u16,
        config: BlockConfiguration,
    ) -> Result<()> {
        instructions::create_block(ctx, initial_commission, config)
    }

    pub fn add_entries_to_block<'info>(
        ctx: Context<'_, '_, 'info, 'info, AddEntriesToBlock<'info>>,
        metadata_uri: String,
        second_creator: Option<Pubkey>,
        first_entry: u16,
        entry_commitments: Vec<[u8; 32]>,
    ) -> Result<()> {
        instructions::add_entries_to_block(
            ctx,
            metadata_uri,
            second_creator,
            first_entry,
            entry_commitments,
        )
    }

    pub fn set_entry_metadata(
        ctx: Context<SetEntryMetadata>,
        metadata: EntryMetadata,
    ) -> Result<()> {
        instructions::set_entry_metadata(ctx, metadata)
    }

    pub fn reveal_entries<'info>(
        ctx: Context<'_, '_, 'info, 'info, RevealEntries<'info>>,
        first_entry: u16,
        salts: Vec<u64>,
    ) -> Result<()> {
        instructions::reveal_entries(ctx, first_entry, salts)
    }

    pub fn set_block_commission(ctx: Context<SetBlockCommission>, commission: u16) -> Result<()> {
        instructions::set_block_commission(ctx, commission)
    }

    pub fn take_commission_or_delegate(ctx: Context<TakeCommissionOrDelegate>) -> Result<()> {
        instructions::take_commission_or_delegate(ctx)
    }

    pub fn buy<'info>(
        ctx: Context<'_, 'info, '_, 'info, Buy<'info>>,
        maximum_price_lamports: u64,
    ) -> Result<()> {
        instructions::buy(ctx, maximum_price_lamports)
    }

    pub fn refund(ctx: Context<Refund>) -> Result<()> {
        instructions::refund(ctx)
    }

    pub fn bid(
        ctx: Context<PlaceBid>,
        minimum_bid_lamports: u64,
        maximum_bid_lamports: u64,
    ) -> Result<()> {
        instructions::bid(ctx, minimum_bid_lamports, maximum_bid_lamports)
    }

    pub fn claim_winning(ctx: Context<ClaimWinning>) -> Result<()> {
        instructions::claim_winning(ctx)
    }

    pub fn claim_losing(ctx: Context<ClaimLosing>) -> Result<()> {
        instructions::claim_losing(ctx)
    }

    pub fn stake(ctx: Context<Stake>) -> Result<()> {
        instructions::stake(ctx)
    }

    pub fn destake(ctx: Context<Destake>, new_withdraw_authority: Pubkey) -> Result<()> {
        instructions::destake(ctx, new_withdraw_authority)
    }

    pub fn harvest(ctx: Context<Harvest>) -> Result<()> {
        instructions::harvest(ctx)
    }

    pub fn level_up(ctx: Context<LevelUp>) -> Result<()> {
        instructions::level_up(ctx)
    }

    pub fn split_master_stake(ctx: Context<SplitMasterStake>, lamports: u64) -> Result<()> {
        instructions::split_master_stake(ctx, lamports)
    }

    pub fn add_whitelist_entries<'info>(
        ctx: Context<'_, 'info, '_, 'info, AddWhitelistEntries<'info>>,
        entries: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::add_whitelist_entries(ctx, entries)
    }

    pub fn delete_whitelist<'info>(
        ctx: Context<'_, 'info, '_, 'info, DeleteWhitelist<'info>>,
    ) -> Result<()> {
        instructions::delete_whitelist(ctx)
    }
}
