use anchor_lang::prelude::*;
use anchor_lang::solana_program::{stake, sysvar};
use anchor_spl::metadata::Metadata;
use anchor_spl::token::Token;

use crate::error::ErrorCode;
use crate::states::ProgramConfig;
use crate::utils::{
    create_metadata, create_pda, create_pda_mint, create_stake_account, delegate_stake_signed,
    rent_exempt_minimum, MetadataAccounts,
};
use crate::{
    superuser, validator_vote, AUTHORITY_SEED, BID_MARKER_MINT_SEED,
    BID_MARKER_TOKEN_METADATA_URI, BID_MARKER_TOKEN_NAME, BID_MARKER_TOKEN_SYMBOL, CONFIG_SEED,
    KI_MINT_SEED, KI_TOKEN_METADATA_URI, KI_TOKEN_NAME, KI_TOKEN_SYMBOL,
    MASTER_STAKE_ACCOUNT_MIN_LAMPORTS, MASTER_STAKE_SEED,
};

/// Bootstraps the program: the config account, the signing authority, the
/// master stake account (created at its floor and delegated to the
/// designated validator), and the Ki and bid-marker mints with their
/// metadata.  Runs exactly once, signed by the superuser.
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The superuser pays for everything created here.
    #[account(
        mut,
        address = superuser::ID @ ErrorCode::PermissionDenied,
    )]
    pub superuser: Signer<'info>,

    #[account(
        init,
        seeds = [CONFIG_SEED],
        bump,
        payer = superuser,
        space = ProgramConfig::LEN,
    )]
    pub config: Account<'info, ProgramConfig>,

    /// The program's signing authority: a zero-data program-owned PDA used
    /// wherever an authority is needed, because the program can sign for it.
    /// Mystery sale proceeds are escrowed in it as well.
    ///
    /// CHECK: PDA derivation enforced by seeds; created below.
    #[account(
        mut,
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// The master stake account, the zero-sum partner of every commission
    /// charge.  All of its authorities are held by the program authority.
    ///
    /// CHECK: PDA derivation enforced by seeds; created below with the
    /// Stake program as owner.
    #[account(
        mut,
        seeds = [MASTER_STAKE_SEED],
        bump,
    )]
    pub master_stake: UncheckedAccount<'info>,

    /// The validator vote account all stake is delegated to.
    ///
    /// CHECK: pinned address.
    #[account(address = validator_vote::ID)]
    pub validator_vote: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds; created below as a mint
    /// with one decimal place.
    #[account(
        mut,
        seeds = [KI_MINT_SEED],
        bump,
    )]
    pub ki_mint: UncheckedAccount<'info>,

    /// CHECK: validated by the Token Metadata program during the create CPI.
    #[account(mut)]
    pub ki_metadata: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds; created below as a mint
    /// with one decimal place.
    #[account(
        mut,
        seeds = [BID_MARKER_MINT_SEED],
        bump,
    )]
    pub bid_marker_mint: UncheckedAccount<'info>,

    /// CHECK: validated by the Token Metadata program during the create CPI.
    #[account(mut)]
    pub bid_marker_metadata: UncheckedAccount<'info>,

    /// Clock sysvar required by `delegate_stake`.
    pub clock: Sysvar<'info, Clock>,

    /// Rent sysvar required by `stake::Initialize`.
    pub rent: Sysvar<'info, Rent>,

    /// Stake history sysvar required by `delegate_stake`.
    ///
    /// CHECK: pinned address.
    #[account(address = sysvar::stake_history::ID)]
    pub stake_history: UncheckedAccount<'info>,

    /// Stake config account required by `delegate_stake`.
    ///
    /// CHECK: pinned address.
    #[account(address = stake::config::ID)]
    pub stake_config: UncheckedAccount<'info>,

    /// CHECK: program id only.
    #[account(address = stake::program::ID)]
    pub stake_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub metadata_program: Program<'info, Metadata>,
    pub system_program: Program<'info, System>,
}

pub fn initialize(ctx: Context<Initialize>, admin: Pubkey) -> Result<()> {
    ctx.accounts.config.admin = admin;

    let superuser = ctx.accounts.superuser.to_account_info();
    let authority = ctx.accounts.authority.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let token_program = ctx.accounts.token_program.to_account_info();
    let rent = ctx.accounts.rent.to_account_info();

    // The authority holds no data; it exists so the program has an address
    // it can sign for.
    create_pda(
        &authority,
        &[AUTHORITY_SEED],
        &superuser,
        &system_program,
        &crate::ID,
        rent_exempt_minimum(0)?,
        0,
    )?;

    // Master stake account, funded at its permanent floor and delegated
    // immediately.
    create_stake_account(
        &ctx.accounts.master_stake.to_account_info(),
        &[MASTER_STAKE_SEED],
        &superuser,
        &system_program,
        &rent,
        ctx.accounts.authority.key,
        MASTER_STAKE_ACCOUNT_MIN_LAMPORTS,
    )?;

    delegate_stake_signed(
        &ctx.accounts.master_stake.to_account_info(),
        &ctx.accounts.validator_vote.to_account_info(),
        &authority,
        ctx.bumps.authority,
        &ctx.accounts.clock.to_account_info(),
        &ctx.accounts.stake_history.to_account_info(),
        &ctx.accounts.stake_config.to_account_info(),
    )
    .map_err(|_| error!(ErrorCode::FailedToDelegate))?;

    // The Ki mint and the bid marker mint both follow the fungible metadata
    // standard, hence one decimal place.
    for (mint, mint_seeds, metadata, name, symbol, uri) in [
        (
            &ctx.accounts.ki_mint,
            KI_MINT_SEED,
            &ctx.accounts.ki_metadata,
            KI_TOKEN_NAME,
            KI_TOKEN_SYMBOL,
            KI_TOKEN_METADATA_URI,
        ),
        (
            &ctx.accounts.bid_marker_mint,
            BID_MARKER_MINT_SEED,
            &ctx.accounts.bid_marker_metadata,
            BID_MARKER_TOKEN_NAME,
            BID_MARKER_TOKEN_SYMBOL,
            BID_MARKER_TOKEN_METADATA_URI,
        ),
    ] {
        create_pda_mint(
            &mint.to_account_info(),
            &[mint_seeds],
            1,
            &authority,
            &superuser,
            &token_program,
            &system_program,
            &rent,
        )?;

        create_metadata(
            &MetadataAccounts {
                metadata: &metadata.to_account_info(),
                authority: &authority,
                authority_bump: ctx.bumps.authority,
                metadata_program: &ctx.accounts.metadata_program.to_account_info(),
                system_program: &system_program,
                rent: &rent,
            },
            &mint.to_account_info(),
            &superuser,
            name.to_string(),
            symbol.to_string(),
            uri.to_string(),
            None,
        )?;
    }

    msg!("Program initialized; admin {}", admin);
    Ok(())
}
