use anchor_lang::prelude::*;
use anchor_spl::metadata::Metadata;

use crate::error::ErrorCode;
use crate::states::{Block, Entry, EntryRevealed, EntryState, ProgramConfig};
use crate::utils::{update_metadata_for_level, verify_commit};
use crate::{AUTHORITY_SEED, CONFIG_SEED};

/// Reveals committed entries by disclosing their salts.
///
/// Remaining accounts carry one writable pair per entry:
/// `[entry, metadata]`.  Each entry's stored metadata must hash (with the
/// disclosed salt) to the entry's commitment; the batch fails fast on the
/// first mismatch.
///
/// Escrowed mystery proceeds are accumulated across the batch and swept to
/// the admin in a single balance move after every cross-program invoke has
/// completed, so no account touched by an invoke is modified mid-flight.
#[derive(Accounts)]
pub struct RevealEntries<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    /// Receives the swept mystery escrow.
    #[account(
        mut,
        constraint = admin.key() == config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    #[account(mut)]
    pub block: Account<'info, Block>,

    /// Escrow of all mystery proceeds of the block.
    ///
    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub metadata_program: Program<'info, Metadata>,
}

pub fn reveal_entries<'info>(
    ctx: Context<'_, '_, 'info, 'info, RevealEntries<'info>>,
    first_entry: u16,
    salts: Vec<u64>,
) -> Result<()> {
    let block = &ctx.accounts.block;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    require!(block.is_revealable(now), ErrorCode::BlockNotRevealable);

    let entry_count = salts.len();
    require!(
        first_entry as usize + entry_count <= block.config.total_entry_count as usize,
        ErrorCode::InvalidEntryRange
    );
    require!(
        ctx.remaining_accounts.len() == entry_count * 2,
        ErrorCode::InvalidEntryRange
    );

    let authority = ctx.accounts.authority.to_account_info();
    let block_key = block.key();

    // Escrow lamports owed to the admin, moved in one batch at the end.
    let mut total_lamports_to_move = 0u64;

    for (i, salt) in salts.iter().enumerate() {
        let entry_info = &ctx.remaining_accounts[i * 2];
        let metadata_info = &ctx.remaining_accounts[i * 2 + 1];

        let mut entry = Account::<Entry>::try_from(entry_info)?;
        require_keys_eq!(entry.block, block_key, ErrorCode::InvalidEntryRange);
        require!(
            entry.entry_index == first_entry + i as u16,
            ErrorCode::InvalidEntryRange
        );
        require_keys_eq!(
            *metadata_info.key,
            entry.metaplex_metadata,
            ErrorCode::InvalidEntryRange
        );

        match entry.state(Some(block), now) {
            EntryState::WaitingForRevealUnowned => {}
            EntryState::WaitingForRevealOwned => {
                // Mystery proceeds were escrowed in the authority account
                // against a possible refund; an unrefunded purchase is now
                // owed to the admin.
                if !entry.refund_awarded {
                    total_lamports_to_move += entry.purchase_price_lamports;
                }
            }
            _ => return err!(ErrorCode::AlreadyRevealed),
        }

        // The stored metadata must open the commitment under this salt.
        let metadata_bytes = entry.metadata.try_to_vec()?;
        require!(
            verify_commit(&entry.reveal_sha256, &metadata_bytes, *salt),
            ErrorCode::InvalidHash
        );

        // Present the entry at level 0.
        update_metadata_for_level(
            metadata_info,
            &authority,
            ctx.bumps.authority,
            &ctx.accounts.metadata_program.to_account_info(),
            &entry,
            0,
        )?;

        entry.reveal_timestamp = now;
        entry.reveal_sha256 = [0; 32];

        // An unsold auction entry goes straight into its auction window.
        if entry.has_auction && !entry.is_owned() {
            entry.auction.begin_timestamp = now;
        }

        emit!(EntryRevealed {
            mint: entry.mint,
            entry_index: entry.entry_index,
            reveal_timestamp: now,
        });

        entry.exit(&crate::ID)?;
    }

    // All entries revealed; sweep the escrow in one move.
    if total_lamports_to_move > 0 {
        authority.sub_lamports(total_lamports_to_move)?;
        ctx.accounts
            .admin
            .to_account_info()
            .add_lamports(total_lamports_to_move)?;
    }

    Ok(())
}
