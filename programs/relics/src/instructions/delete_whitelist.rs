use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{Block, ProgramConfig, Whitelist};
use crate::{CONFIG_SEED, WHITELIST_SEED};

#[derive(Accounts)]
pub struct DeleteWhitelist<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    /// Receives the whitelist account's lamports.
    #[account(
        mut,
        constraint = admin.key() == config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [WHITELIST_SEED, block.key().as_ref()],
        bump,
    )]
    pub whitelist: Account<'info, Whitelist>,

    /// The whitelist's block; may or may not exist.
    ///
    /// CHECK: deserialized below only when it exists.
    pub block: UncheckedAccount<'info>,
}

/// Deletes a whitelist, returning its lamports to the admin.  An empty
/// whitelist may always be deleted; one with entries only once its block is
/// past the whitelist phase (or the block never materialized).
pub fn delete_whitelist<'info>(
    ctx: Context<'_, 'info, '_, 'info, DeleteWhitelist<'info>>,
) -> Result<()> {
    let whitelist = &ctx.accounts.whitelist;

    if !whitelist.entries.is_empty() {
        let block_info = ctx.accounts.block.as_ref();
        if block_info.owner == &crate::ID && !block_info.data_is_empty() {
            let block = Account::<Block>::try_from(block_info)?;
            let now = Clock::get()?.unix_timestamp;
            require!(!block.in_whitelist_phase(now), ErrorCode::WhitelistInUse);
        }
    }

    let whitelist_info = ctx.accounts.whitelist.to_account_info();
    let lamports = whitelist_info.lamports();
    whitelist_info.sub_lamports(lamports)?;
    ctx.accounts.admin.to_account_info().add_lamports(lamports)?;

    Ok(())
}
