use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{ProgramConfig, Whitelist};
use crate::utils::{create_pda, rent_exempt_minimum};
use crate::{CONFIG_SEED, WHITELIST_SEED};

#[derive(Accounts)]
pub struct AddWhitelistEntries<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    #[account(
        constraint = admin.key() == config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    /// Pays for the whitelist account on first use.
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: PDA derivation enforced by seeds; created lazily below.
    #[account(
        mut,
        seeds = [WHITELIST_SEED, block.key().as_ref()],
        bump,
    )]
    pub whitelist: UncheckedAccount<'info>,

    /// The address the block will live at.  The block must not exist yet:
    /// whitelists can only grow before any sale can happen.
    ///
    /// CHECK: only its address and (non-)existence are used.
    pub block: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Appends buyers to a block's whitelist, creating the whitelist account on
/// first use.  Fails once the block itself exists, which guarantees every
/// whitelist entry precedes any sale.
pub fn add_whitelist_entries<'info>(
    ctx: Context<'_, 'info, '_, 'info, AddWhitelistEntries<'info>>,
    entries: Vec<Pubkey>,
) -> Result<()> {
    let block_info = ctx.accounts.block.to_account_info();
    require!(
        block_info.owner != &crate::ID || block_info.data_is_empty(),
        ErrorCode::BlockAlreadyExists
    );

    let whitelist_info = ctx.accounts.whitelist.as_ref();

    if whitelist_info.data_is_empty() {
        create_pda(
            whitelist_info,
            &[WHITELIST_SEED, ctx.accounts.block.key.as_ref()],
            &ctx.accounts.payer.to_account_info(),
            &ctx.accounts.system_program.to_account_info(),
            &crate::ID,
            rent_exempt_minimum(Whitelist::LEN)?,
            Whitelist::LEN as u64,
        )?;
        Whitelist::default().try_serialize(&mut &mut whitelist_info.try_borrow_mut_data()?[..])?;
    }

    let mut whitelist = Account::<Whitelist>::try_from(whitelist_info)?;
    whitelist.add(&entries)?;
    whitelist.exit(&crate::ID)?;

    msg!("Whitelisted {} buyers", entries.len());
    Ok(())
}
