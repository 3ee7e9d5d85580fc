use anchor_lang::prelude::*;
use anchor_lang::solana_program::{stake as stake_program, sysvar};
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::Token;

use crate::error::ErrorCode;
use crate::states::{Block, CommissionCharged, Entry, EntryDestaked, EntryState, EntryStaked};
use crate::utils::{
    charge_commission, harvest_ki, is_token_owner, set_stake_authorities_signed, BridgeAccounts,
    KiMintAccounts, StakeAccount,
};
use crate::{AUTHORITY_SEED, BRIDGE_SEED, KI_MINT_SEED, MASTER_STAKE_SEED};

/// Accounts for releasing a staked entry's stake account back to its owner.
///
/// Outstanding Ki is harvested first (commission reduces the stake balance
/// and would otherwise shrink the harvest), then commission is charged, and
/// finally both stake authorities move to the owner-chosen address.
#[derive(Accounts)]
pub struct Destake<'info> {
    /// Fronts the bridge account's transient rent; repaid by the move.
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
    #[account(
        mut,
        address = entry.staked.stake_account @ ErrorCode::NotStaked,
    )]
    pub stake_account: UncheckedAccount<'info>,

    /// Destination for the final Ki harvest; created on demand.
    ///
    /// CHECK: validated by the associated token program.
    #[account(mut)]
    pub ki_destination: UncheckedAccount<'info>,

    /// CHECK: any system account may receive the Ki.
    pub ki_destination_owner: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [MASTER_STAKE_SEED],
        bump,
    )]
    pub master_stake: UncheckedAccount<'info>,

    /// CHECK: PDA derivation enforced by seeds; created and drained within
    /// the instruction.
    #[account(
        mut,
        seeds = [BRIDGE_SEED, entry.mint.as_ref()],
        bump,
    )]
    pub bridge_stake: UncheckedAccount<'info>,

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

    pub clock: Sysvar<'info, Clock>,

    /// CHECK: pinned address.
    #[account(address = sysvar::stake_history::ID)]
    pub stake_history: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,

    /// CHECK: program id only.
    #[account(address = stake_program::program::ID)]
    pub stake_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

pub fn destake(ctx: Context<Destake>, new_withdraw_authority: Pubkey) -> Result<()> {
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

    let stake_info = ctx.accounts.stake_account.to_account_info();
    let delegated = StakeAccount::decode(&stake_info)?.delegated_lamports();

    // Harvest before charging: the commission split reduces the stake
    // account and would otherwise eat into the final harvest.
    harvest_ki(
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

    let entry_mint = entry.mint;
    let bridge_seeds: [&[u8]; 2] = [BRIDGE_SEED, entry_mint.as_ref()];
    let charged = charge_commission(
        delegated,
        block,
        entry,
        &stake_info,
        &ctx.accounts.master_stake.to_account_info(),
        &BridgeAccounts {
            bridge: &ctx.accounts.bridge_stake.to_account_info(),
            bridge_seeds: &bridge_seeds,
            funding: &ctx.accounts.funding.to_account_info(),
            authority: &ctx.accounts.authority.to_account_info(),
            authority_bump: ctx.bumps.authority,
            clock: &ctx.accounts.clock.to_account_info(),
            stake_history: &ctx.accounts.stake_history.to_account_info(),
            system_program: &ctx.accounts.system_program.to_account_info(),
        },
    )?;

    if charged > 0 {
        emit!(CommissionCharged {
            mint: entry.mint,
            lamports: charged,
        });
    }

    // Hand the stake account to the owner-chosen authority.  Must be done
    // signed: the program authority currently holds both authorities.
    set_stake_authorities_signed(
        &stake_info,
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &new_withdraw_authority,
        &ctx.accounts.clock.to_account_info(),
    )?;

    let stake_account_key = entry.staked.stake_account;
    entry.staked = EntryStaked::default();

    emit!(EntryDestaked {
        mint: entry.mint,
        stake_account: stake_account_key,
        new_withdraw_authority,
    });
    Ok(())
}
