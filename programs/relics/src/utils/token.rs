use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_pack::Pack;
use anchor_spl::associated_token;
use anchor_spl::token::{self, spl_token};

use crate::utils::create_pda;
use crate::AUTHORITY_SEED;

//
// Thin adapters around the SPL Token and Associated Token programs.  All
// vault-side operations are signed by the program authority PDA.
//

/// Creates a token mint at a PDA with the program authority as mint
/// authority and no freeze authority.
#[allow(clippy::too_many_arguments)]
pub fn create_pda_mint<'info>(
    mint: &AccountInfo<'info>,
    seeds: &[&[u8]],
    decimals: u8,
    authority: &AccountInfo<'info>,
    funding: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    rent: &AccountInfo<'info>,
) -> Result<()> {
    create_pda(
        mint,
        seeds,
        funding,
        system_program,
        token_program.key,
        Rent::get()?.minimum_balance(spl_token::state::Mint::LEN),
        spl_token::state::Mint::LEN as u64,
    )?;

    token::initialize_mint2(
        CpiContext::new(
            token_program.clone(),
            token::InitializeMint2 { mint: mint.clone() },
        ),
        decimals,
        authority.key,
        None,
    )
}

/// Creates a token account at a PDA, owned by `owner`.
#[allow(clippy::too_many_arguments)]
pub fn create_pda_token_account<'info>(
    token_account: &AccountInfo<'info>,
    seeds: &[&[u8]],
    mint: &AccountInfo<'info>,
    owner: &AccountInfo<'info>,
    funding: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
) -> Result<()> {
    create_pda(
        token_account,
        seeds,
        funding,
        system_program,
        token_program.key,
        Rent::get()?.minimum_balance(spl_token::state::Account::LEN),
        spl_token::state::Account::LEN as u64,
    )?;

    token::initialize_account3(CpiContext::new(
        token_program.clone(),
        token::InitializeAccount3 {
            account: token_account.clone(),
            mint: mint.clone(),
            authority: owner.clone(),
        },
    ))
}

/// Creates the associated token account for `(owner, mint)` if it does not
/// exist yet.  Replay tolerant by contract.
#[allow(clippy::too_many_arguments)]
pub fn create_associated_token_account_idempotent<'info>(
    ata: &AccountInfo<'info>,
    mint: &AccountInfo<'info>,
    owner: &AccountInfo<'info>,
    funding: &AccountInfo<'info>,
    ata_program: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
) -> Result<()> {
    associated_token::create_idempotent(CpiContext::new(
        ata_program.clone(),
        associated_token::Create {
            payer: funding.clone(),
            associated_token: ata.clone(),
            authority: owner.clone(),
            mint: mint.clone(),
            system_program: system_program.clone(),
            token_program: token_program.clone(),
        },
    ))
}

/// Mints tokens from a program-authority mint into a token account.
pub fn mint_tokens_signed<'info>(
    mint: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    token_program: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    token::mint_to(
        CpiContext::new_with_signer(
            token_program.clone(),
            token::MintTo {
                mint: mint.clone(),
                to: destination.clone(),
                authority: authority.clone(),
            },
            &[&[AUTHORITY_SEED, &[authority_bump]]],
        ),
        amount,
    )
}

/// Transfers the single entry token out of the program's holding account.
pub fn transfer_entry_token_signed<'info>(
    source: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    token_program: &AccountInfo<'info>,
) -> Result<()> {
    token::transfer(
        CpiContext::new_with_signer(
            token_program.clone(),
            token::Transfer {
                from: source.clone(),
                to: destination.clone(),
                authority: authority.clone(),
            },
            &[&[AUTHORITY_SEED, &[authority_bump]]],
        ),
        1,
    )
}

/// Burns tokens from an account whose owner signed the transaction.
pub fn burn_tokens<'info>(
    mint: &AccountInfo<'info>,
    source: &AccountInfo<'info>,
    owner: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    token::burn(
        CpiContext::new(
            token_program.clone(),
            token::Burn {
                mint: mint.clone(),
                from: source.clone(),
                authority: owner.clone(),
            },
        ),
        amount,
    )
}

/// Closes a token account held by the program authority, sending its
/// lamports to `destination`.
pub fn close_token_account_signed<'info>(
    token_account: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    token_program: &AccountInfo<'info>,
) -> Result<()> {
    token::close_account(CpiContext::new_with_signer(
        token_program.clone(),
        token::CloseAccount {
            account: token_account.clone(),
            destination: destination.clone(),
            authority: authority.clone(),
        },
        &[&[AUTHORITY_SEED, &[authority_bump]]],
    ))
}

/// Closes a token account owned by a transaction signer.
pub fn close_token_account<'info>(
    token_account: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    owner: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
) -> Result<()> {
    token::close_account(CpiContext::new(
        token_program.clone(),
        token::CloseAccount {
            account: token_account.clone(),
            destination: destination.clone(),
            authority: owner.clone(),
        },
    ))
}

/// Revokes a mint's mint authority, pinning its supply forever.
pub fn revoke_mint_authority_signed<'info>(
    mint: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    token_program: &AccountInfo<'info>,
) -> Result<()> {
    token::set_authority(
        CpiContext::new_with_signer(
            token_program.clone(),
            token::SetAuthority {
                account_or_mint: mint.clone(),
                current_authority: authority.clone(),
            },
            &[&[AUTHORITY_SEED, &[authority_bump]]],
        ),
        spl_token::instruction::AuthorityType::MintTokens,
        None,
    )
}

/// True when `token_account` is a token account of `mint`, owned by `owner`,
/// holding at least `minimum_amount` tokens.
pub fn is_token_owner(
    token_account: &AccountInfo,
    owner: &Pubkey,
    mint: &Pubkey,
    minimum_amount: u64,
) -> bool {
    if token_account.owner != &token::ID {
        return false;
    }
    let data = match token_account.try_borrow_data() {
        Ok(data) => data,
        Err(_) => return false,
    };
    let account = match spl_token::state::Account::unpack(&data) {
        Ok(account) => account,
        Err(_) => return false,
    };
    account.mint == *mint && account.owner == *owner && account.amount >= minimum_amount
}

/// Token amount held by a token account, or 0 if it cannot be decoded.
pub fn token_account_amount(token_account: &AccountInfo) -> u64 {
    let data = match token_account.try_borrow_data() {
        Ok(data) => data,
        Err(_) => return 0,
    };
    spl_token::state::Account::unpack(&data)
        .map(|account| account.amount)
        .unwrap_or(0)
}
