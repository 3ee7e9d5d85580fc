use anchor_lang::prelude::*;
use anchor_spl::metadata::Metadata;
use anchor_spl::token::Token;

use crate::error::ErrorCode;
use crate::states::{Block, BlockCompleted, Entry, ProgramConfig};
use crate::utils::{
    create_metadata, create_pda, create_pda_mint, create_pda_token_account, entry_name,
    entry_symbol, mint_tokens_signed, rent_exempt_minimum, revoke_mint_authority_signed,
    MetadataAccounts,
};
use crate::{AUTHORITY_SEED, CONFIG_SEED, ENTRY_SEED, MINT_SEED, TOKEN_SEED};

/// Provisions entries into an incomplete block.
///
/// Remaining accounts carry one writable quadruple per entry:
/// `[entry, mint, token, metadata]`, all at their derived addresses.
///
/// The instruction is idempotent and parallel-safe: indices whose bit is
/// already set in the block's bitmap are skipped, so multi-transaction
/// catalogs can replay overlapping ranges freely.  When the last bit flips,
/// the block is complete and its mystery phase begins.
#[derive(Accounts)]
pub struct AddEntriesToBlock<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    #[account(
        constraint = admin.key() == config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    /// Pays for every account created here.
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(mut)]
    pub block: Account<'info, Block>,

    /// Mint authority and metadata update authority of every entry.
    ///
    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub metadata_program: Program<'info, Metadata>,
    pub rent: Sysvar<'info, Rent>,
    pub system_program: Program<'info, System>,
}

pub fn add_entries_to_block<'info>(
    ctx: Context<'_, '_, 'info, 'info, AddEntriesToBlock<'info>>,
    metadata_uri: String,
    second_creator: Option<Pubkey>,
    first_entry: u16,
    entry_commitments: Vec<[u8; 32]>,
) -> Result<()> {
    let block = &mut ctx.accounts.block;

    // A complete block has nothing left to add; succeed so that replayed
    // batches never fail a transaction.
    if block.is_complete() {
        return Ok(());
    }

    let entry_count = entry_commitments.len();
    require!(
        first_entry as usize + entry_count <= block.config.total_entry_count as usize,
        ErrorCode::InvalidEntryRange
    );
    require!(
        ctx.remaining_accounts.len() == entry_count * 4,
        ErrorCode::InvalidEntryRange
    );

    let authority = ctx.accounts.authority.to_account_info();
    let payer = ctx.accounts.payer.to_account_info();
    let token_program = ctx.accounts.token_program.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let rent = ctx.accounts.rent.to_account_info();
    let block_key = block.key();

    for (i, commitment) in entry_commitments.iter().enumerate() {
        let entry_index = first_entry + i as u16;

        // Already added in an earlier transaction: skip.
        if block.entry_added(entry_index) {
            continue;
        }

        let accounts = &ctx.remaining_accounts[i * 4..i * 4 + 4];
        let entry_info = &accounts[0];
        let mint_info = &accounts[1];
        let token_info = &accounts[2];
        let metadata_info = &accounts[3];

        // The entry mint: decimals 0, supply pinned at one below.
        let index_bytes = entry_index.to_le_bytes();
        create_pda_mint(
            mint_info,
            &[MINT_SEED, block_key.as_ref(), &index_bytes],
            0,
            &authority,
            &payer,
            &token_program,
            &system_program,
            &rent,
        )?;

        // The program's holding account for the single token.
        create_pda_token_account(
            token_info,
            &[TOKEN_SEED, mint_info.key.as_ref()],
            mint_info,
            &authority,
            &payer,
            &token_program,
            &system_program,
        )?;

        mint_tokens_signed(
            mint_info,
            token_info,
            &authority,
            ctx.bumps.authority,
            &token_program,
            1,
        )?;

        create_metadata(
            &MetadataAccounts {
                metadata: metadata_info,
                authority: &authority,
                authority_bump: ctx.bumps.authority,
                metadata_program: &ctx.accounts.metadata_program.to_account_info(),
                system_program: &system_program,
                rent: &rent,
            },
            mint_info,
            &payer,
            entry_name(
                block.config.group_number,
                block.config.block_number,
                entry_index,
            ),
            entry_symbol(),
            metadata_uri.clone(),
            second_creator,
        )?;

        // Revoke the mint authority so the supply is permanently one.  No
        // master edition is created: the metadata program would demand mint
        // authority for it, which would hand it effective control of every
        // staked entry.
        revoke_mint_authority_signed(
            mint_info,
            &authority,
            ctx.bumps.authority,
            &token_program,
        )?;

        create_pda(
            entry_info,
            &[ENTRY_SEED, mint_info.key.as_ref()],
            &payer,
            &system_program,
            &crate::ID,
            rent_exempt_minimum(Entry::LEN)?,
            Entry::LEN as u64,
        )?;

        let entry = Entry {
            entry_index,
            block: block_key,
            group_number: block.config.group_number,
            block_number: block.config.block_number,
            mint: *mint_info.key,
            token: *token_info.key,
            metaplex_metadata: *metadata_info.key,
            minimum_price_lamports: block.config.minimum_price_lamports,
            has_auction: block.config.has_auction,
            duration: block.config.duration,
            non_auction_start_price_lamports: block.config.final_start_price_lamports,
            reveal_sha256: *commitment,
            commission: block.commission,
            ..Entry::default()
        };
        entry.try_serialize(&mut &mut entry_info.try_borrow_mut_data()?[..])?;

        block.record_entry_added(entry_index);
    }

    // If this batch completed the block, the mystery phase starts now, and
    // the commission cannot be changed again this epoch.
    if block.is_complete() {
        let clock = Clock::get()?;
        block.block_start_timestamp = clock.unix_timestamp;
        if block.config.total_mystery_count == 0 {
            block.mystery_phase_end_timestamp = clock.unix_timestamp;
        }
        block.last_commission_change_epoch = clock.epoch;

        emit!(BlockCompleted {
            block: block_key,
            group_number: block.config.group_number,
            block_number: block.config.block_number,
            block_start_timestamp: clock.unix_timestamp,
        });
    }

    Ok(())
}
