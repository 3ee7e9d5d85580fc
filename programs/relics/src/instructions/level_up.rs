use anchor_lang::prelude::*;
use anchor_spl::metadata::Metadata;
use anchor_spl::token::Token;

use crate::error::ErrorCode;
use crate::states::{Entry, EntryLeveledUp, EntryState, MAX_ENTRY_LEVEL};
use crate::utils::{burn_tokens, is_token_owner, update_metadata_for_level};
use crate::{AUTHORITY_SEED, KI_MINT_SEED};

#[derive(Accounts)]
pub struct LevelUp<'info> {
    #[account(mut)]
    pub entry: Account<'info, Entry>,

    /// Owner of the entry token.
    pub token_owner: Signer<'info>,

    /// Proof of ownership: the token account holding the entry token.
    ///
    /// CHECK: decoded and checked against the entry mint and signer below.
    pub token_account: UncheckedAccount<'info>,

    /// CHECK: pinned to the entry's recorded metadata account.
    #[account(
        mut,
        address = entry.metaplex_metadata,
    )]
    pub entry_metadata: UncheckedAccount<'info>,

    /// The Ki paying for the level; burned below.
    ///
    /// CHECK: decoded and checked against the Ki mint and its owner below.
    #[account(mut)]
    pub ki_source: UncheckedAccount<'info>,

    /// Owner of the Ki source account.
    pub ki_source_owner: Signer<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [KI_MINT_SEED],
        bump,
    )]
    pub ki_mint: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub metadata_program: Program<'info, Metadata>,
}

/// Levels an owned entry up by burning Ki.  The cost is `level_1_ki`
/// growing half again per level already reached; the entry's metadata
/// switches to the new level's name and uri.
pub fn level_up(ctx: Context<LevelUp>) -> Result<()> {
    let entry = &mut ctx.accounts.entry;

    let now = Clock::get()?.unix_timestamp;
    match entry.state(None, now) {
        EntryState::Owned | EntryState::OwnedAndStaked => {}
        _ => return err!(ErrorCode::NotOwned),
    }

    require!(
        entry.metadata.level < MAX_ENTRY_LEVEL,
        ErrorCode::AlreadyAtMaxLevel
    );

    require!(
        is_token_owner(
            &ctx.accounts.token_account.to_account_info(),
            ctx.accounts.token_owner.key,
            &entry.mint,
            1,
        ),
        ErrorCode::NotOwned
    );

    let ki_to_burn = entry.level_up_ki_cost();

    require!(
        is_token_owner(
            &ctx.accounts.ki_source.to_account_info(),
            ctx.accounts.ki_source_owner.key,
            ctx.accounts.ki_mint.key,
            ki_to_burn,
        ),
        ErrorCode::InsufficientFunds
    );

    burn_tokens(
        &ctx.accounts.ki_mint.to_account_info(),
        &ctx.accounts.ki_source.to_account_info(),
        &ctx.accounts.ki_source_owner.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
        ki_to_burn,
    )?;

    entry.metadata.level += 1;

    update_metadata_for_level(
        &ctx.accounts.entry_metadata.to_account_info(),
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &ctx.accounts.metadata_program.to_account_info(),
        entry,
        entry.metadata.level,
    )?;

    emit!(EntryLeveledUp {
        mint: entry.mint,
        level: entry.metadata.level,
        ki_burned: ki_to_burn,
    });
    Ok(())
}
