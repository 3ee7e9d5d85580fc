use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{Block, Entry, EntryMetadata, ProgramConfig};
use crate::CONFIG_SEED;

#[derive(Accounts)]
pub struct SetEntryMetadata<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    #[account(
        constraint = admin.key() == config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    pub block: Account<'info, Block>,

    #[account(
        mut,
        constraint = entry.block == block.key() @ ErrorCode::InvalidEntryRange,
    )]
    pub entry: Account<'info, Entry>,
}

/// Writes the revealed metadata into an entry ahead of its reveal.  The
/// reveal itself then verifies that these bytes hash to the entry's
/// commitment; wrong metadata simply makes the reveal fail.
pub fn set_entry_metadata(ctx: Context<SetEntryMetadata>, metadata: EntryMetadata) -> Result<()> {
    let block = &ctx.accounts.block;
    let entry = &mut ctx.accounts.entry;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    let now = Clock::get()?.unix_timestamp;
    require!(block.is_revealable(now), ErrorCode::BlockNotRevealable);

    require!(!entry.is_revealed(), ErrorCode::AlreadyRevealed);

    entry.metadata = metadata;
    Ok(())
}
