use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::Token;

use crate::error::ErrorCode;
use crate::states::{Block, Entry, EntryState, KiHarvested};
use crate::utils::{harvest_ki, is_token_owner, KiMintAccounts, StakeAccount};
use crate::{AUTHORITY_SEED, KI_MINT_SEED};

#[derive(Accounts)]
pub struct Harvest<'info> {
    /// Pays the Ki token account's rent if it must be created.
    #[account(mut)]
    pub funding: Signer<'info>,

    pub block: Account<'info, Block>,

    #[account(
        mut,
        constraint = entry.block == block.key() @ ErrorCode::InvalidEntryRange,
    )]
    pub entry: Account<'info, Entry>,

    /// Owner of the entry token.
    pub token_owner: Signer<'info>,

    /// Proof of ownership: the token account holding the entry token.
    ///
    /// CHECK: decoded and checked against the entry mint and signer below.
    pub token_account: UncheckedAccount<'info>,

    /// CHECK: checked against the entry's staked stake account.
    #[account(address = entry.staked.stake_account @ ErrorCode::NotStaked)]
    pub stake_account: UncheckedAccount<'info>,

    /// Destination for the harvested Ki; created on demand.
    ///
    /// CHECK: validated by the associated token program.
    #[account(mut)]
    pub ki_destination: UncheckedAccount<'info>,

    /// CHECK: any system account may receive the Ki.
    pub ki_destination_owner: UncheckedAccount<'info>,

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
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Mints the Ki owed on a staked entry's earnings since the last harvest.
pub fn harvest(ctx: Context<Harvest>) -> Result<()> {
    let block = &ctx.accounts.block;
    let entry = &mut ctx.accounts.entry;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    let now = Clock::get()?.unix_timestamp;
    require!(
        entry.state(Some(block), now) == EntryState::OwnedAndStaked,
        ErrorCode::NotStaked
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

    let delegated =
        StakeAccount::decode(&ctx.accounts.stake_account.to_account_info())?.delegated_lamports();

    let minted = harvest_ki(
        delegated,
        entry,
        &KiMintAccounts {
            ki_mint: &ctx.accounts.ki_mint.to_account_info(),
            destination: &ctx.accounts.ki_destination.to_account_info(),
            destination_owner: &ctx.accounts.ki_destination_owner.to_account_info(),
            funding: &ctx.accounts.funding.to_account_info(),
            authority: &ctx.accounts.authority.to_account_info(),
            authority_bump: ctx.bumps.authority,
            token_program: &ctx.accounts.token_program.to_account_info(),
            ata_program: &ctx.accounts.associated_token_program.to_account_info(),
            system_program: &ctx.accounts.system_program.to_account_info(),
        },
    )?;

    if minted > 0 {
        emit!(KiHarvested {
            mint: entry.mint,
            amount: minted,
        });
    }
    Ok(())
}
