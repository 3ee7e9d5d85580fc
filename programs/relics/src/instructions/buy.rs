use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke;
use anchor_lang::solana_program::system_instruction;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::metadata::Metadata;
use anchor_spl::token::Token;

use crate::curve::compute_price;
use crate::error::ErrorCode;
use crate::states::{Block, Entry, EntryPurchased, EntryState, ProgramConfig, Whitelist};
use crate::utils::{
    close_token_account_signed, create_associated_token_account_idempotent,
    set_primary_sale_happened, transfer_entry_token_signed,
};
use crate::{AUTHORITY_SEED, CONFIG_SEED, WHITELIST_SEED};

/// Accounts for purchasing an entry, either as a mystery (pre reveal) or
/// directly (post reveal, outside any auction).
///
/// Flow summary:
/// 1) Derive the entry's state; only `PreRevealUnowned` and `Unowned` are
///    purchasable.
/// 2) Price via the declining curve (mystery) or the post-reveal rule, and
///    check it against the buyer's `maximum_price_lamports` cap.
/// 3) During the whitelist phase, consume the buyer's whitelist entry.
/// 4) Move the price (to the authority escrow for mysteries, directly to
///    the admin otherwise), hand over the token, flag the primary sale and
///    close the holding token account.
#[derive(Accounts)]
pub struct Buy<'info> {
    /// Pays the purchase price and any account rent.
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    /// Receives post-reveal proceeds and the closed token account's
    /// lamports.
    ///
    /// CHECK: pinned to the configured admin address.
    #[account(
        mut,
        address = config.admin,
    )]
    pub admin: UncheckedAccount<'info>,

    /// Escrows mystery proceeds until reveal or refund.
    ///
    /// CHECK: PDA derivation enforced by seeds.
    #[account(
        mut,
        seeds = [AUTHORITY_SEED],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub block: Account<'info, Block>,

    /// The block's whitelist; only consulted during the whitelist phase and
    /// may not exist at all.
    ///
    /// CHECK: PDA derivation enforced by seeds; deserialized on use.
    #[account(
        mut,
        seeds = [WHITELIST_SEED, block.key().as_ref()],
        bump,
    )]
    pub whitelist: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = entry.block == block.key() @ ErrorCode::InvalidEntryRange,
    )]
    pub entry: Account<'info, Entry>,

    /// The program's holding account for the entry token; closed to the
    /// admin once the token moves out.
    ///
    /// CHECK: pinned to the entry's recorded token account.
    #[account(
        mut,
        address = entry.token,
    )]
    pub entry_token: UncheckedAccount<'info>,

    /// CHECK: pinned to the entry's recorded mint.
    #[account(address = entry.mint)]
    pub entry_mint: UncheckedAccount<'info>,

    /// Buyer-chosen destination for the token; created if missing.
    ///
    /// CHECK: validated by the associated token program.
    #[account(mut)]
    pub token_destination: UncheckedAccount<'info>,

    /// CHECK: any system account may receive the token.
    pub token_destination_owner: UncheckedAccount<'info>,

    /// CHECK: pinned to the entry's recorded metadata account.
    #[account(
        mut,
        address = entry.metaplex_metadata,
    )]
    pub entry_metadata: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub metadata_program: Program<'info, Metadata>,
    pub system_program: Program<'info, System>,
}

pub fn buy<'info>(
    ctx: Context<'_, 'info, '_, 'info, Buy<'info>>,
    maximum_price_lamports: u64,
) -> Result<()> {
    let block = &mut ctx.accounts.block;
    let entry = &mut ctx.accounts.entry;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    let now = Clock::get()?.unix_timestamp;

    // --- Derive the price and the proceeds destination from the state ---
    let (price, mystery) = match entry.state(Some(block), now) {
        EntryState::PreRevealOwned
        | EntryState::WaitingForRevealOwned
        | EntryState::Owned
        | EntryState::OwnedAndStaked => return err!(ErrorCode::AlreadyOwned),

        EntryState::WaitingForRevealUnowned => return err!(ErrorCode::EntryWaitingForReveal),

        EntryState::InNormalAuction => return err!(ErrorCode::EntryInAuction),

        EntryState::WaitingToBeClaimed => return err!(ErrorCode::EntryWaitingToBeClaimed),

        EntryState::PreRevealUnowned => {
            // A mystery.  Proceeds are escrowed in the authority account
            // until the reveal (or refunded if the reveal never happens).
            let price = compute_price(
                block.config.mystery_phase_duration as u64,
                block.config.mystery_start_price_lamports,
                block.config.minimum_price_lamports,
                (now - block.block_start_timestamp) as u64,
            );

            // One more mystery sold; the last one ends the mystery phase.
            block.mysteries_sold_count += 1;
            if block.mysteries_sold_count == block.config.total_mystery_count {
                block.mystery_phase_end_timestamp = now;
            }

            (price, true)
        }

        EntryState::Unowned => {
            // Revealed and never sold.  An auction entry that fell through
            // its auction without bids goes for the minimum price; a
            // non-auction entry follows the declining curve from its reveal.
            let price = if entry.has_auction {
                entry.minimum_price_lamports
            } else {
                compute_price(
                    entry.duration as u64,
                    entry.non_auction_start_price_lamports,
                    entry.minimum_price_lamports,
                    (now - entry.reveal_timestamp) as u64,
                )
            };

            (price, false)
        }
    };

    // The buyer may have priced the entry from a stale view of the chain.
    require!(price <= maximum_price_lamports, ErrorCode::PriceTooHigh);
    require!(
        price <= ctx.accounts.buyer.lamports(),
        ErrorCode::InsufficientFunds
    );

    // --- Whitelist enforcement during the whitelist phase ---
    if block.in_whitelist_phase(now) {
        let whitelist_info = ctx.accounts.whitelist.as_ref();
        // A missing whitelist account admits everyone, like an empty one.
        if !whitelist_info.data_is_empty() {
            let mut whitelist = Account::<Whitelist>::try_from(whitelist_info)?;
            require!(
                whitelist.check_and_consume(ctx.accounts.buyer.key),
                ErrorCode::FailedWhitelistCheck
            );
            whitelist.exit(&crate::ID)?;
        }
    }

    // --- Move the purchase price ---
    let proceeds_destination = if mystery {
        ctx.accounts.authority.to_account_info()
    } else {
        ctx.accounts.admin.to_account_info()
    };
    invoke(
        &system_instruction::transfer(
            ctx.accounts.buyer.key,
            proceeds_destination.key,
            price,
        ),
        &[
            ctx.accounts.buyer.to_account_info(),
            proceeds_destination,
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    // --- Hand over the token ---
    create_associated_token_account_idempotent(
        &ctx.accounts.token_destination.to_account_info(),
        &ctx.accounts.entry_mint.to_account_info(),
        &ctx.accounts.token_destination_owner.to_account_info(),
        &ctx.accounts.buyer.to_account_info(),
        &ctx.accounts.associated_token_program.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
    )?;

    transfer_entry_token_signed(
        &ctx.accounts.entry_token.to_account_info(),
        &ctx.accounts.token_destination.to_account_info(),
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &ctx.accounts.token_program.to_account_info(),
    )?;

    entry.purchase_price_lamports = price;

    // Not strictly necessary, but some UI presentations care.
    set_primary_sale_happened(
        &ctx.accounts.entry_metadata.to_account_info(),
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &ctx.accounts.metadata_program.to_account_info(),
    )?;

    // The holding account will never be used again; its lamports go to the
    // admin.
    close_token_account_signed(
        &ctx.accounts.entry_token.to_account_info(),
        &ctx.accounts.admin.to_account_info(),
        &ctx.accounts.authority.to_account_info(),
        ctx.bumps.authority,
        &ctx.accounts.token_program.to_account_info(),
    )?;

    emit!(EntryPurchased {
        buyer: *ctx.accounts.buyer.key,
        mint: entry.mint,
        price,
        mystery,
    });
    Ok(())
}
