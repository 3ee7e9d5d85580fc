use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::{invoke, invoke_signed};
use anchor_lang::solana_program::{system_instruction, system_program};

use crate::error::ErrorCode;

/// Creates (or completes) a program derived account, idempotently.
///
/// `seeds` must rediscover exactly `target`'s address under this program
/// (the bump is derived here and appended).  The account ends up with at
/// least `lamports`, exactly `space` bytes of data, and `owner` as its
/// owner:
///
/// - a nonexistent account is created outright;
/// - an existing account with a smaller balance is topped up;
/// - a system-owned account of the wrong length is re-allocated under the
///   seeds, and a program-owned one is resized in place; any other owner
///   cannot be resized;
/// - a system-owned account is assigned to `owner` when they differ.
///
/// Returns the bump so callers can reuse the full signer seeds.
pub fn create_pda<'info>(
    target: &AccountInfo<'info>,
    seeds: &[&[u8]],
    funding: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    owner: &Pubkey,
    lamports: u64,
    space: u64,
) -> Result<u8> {
    let (address, bump) = Pubkey::find_program_address(seeds, &crate::ID);
    require_keys_eq!(address, target.key(), ErrorCode::CreateAccountFailed);

    let bump_seed = [bump];
    let mut signer_seeds: Vec<&[u8]> = seeds.to_vec();
    signer_seeds.push(&bump_seed);

    // Fresh account: one CreateAccount does everything.
    if target.lamports() == 0 && target.data_is_empty() {
        let ix = system_instruction::create_account(
            funding.key,
            target.key,
            lamports,
            space,
            owner,
        );
        invoke_signed(
            &ix,
            &[funding.clone(), target.clone(), system_program.clone()],
            &[&signer_seeds],
        )?;
        return Ok(bump);
    }

    if target.lamports() < lamports {
        let ix = system_instruction::transfer(
            funding.key,
            target.key,
            lamports - target.lamports(),
        );
        invoke(
            &ix,
            &[funding.clone(), target.clone(), system_program.clone()],
        )?;
    }

    if target.data_len() != space as usize {
        if target.owner == &system_program::ID {
            let ix = system_instruction::allocate(target.key, space);
            invoke_signed(&ix, &[target.clone(), system_program.clone()], &[&signer_seeds])?;
        } else if target.owner == &crate::ID {
            target.realloc(space as usize, false)?;
        } else {
            return err!(ErrorCode::InvalidResize);
        }
    }

    if target.owner == &system_program::ID && owner != &system_program::ID {
        let ix = system_instruction::assign(target.key, owner);
        invoke_signed(&ix, &[target.clone(), system_program.clone()], &[&signer_seeds])?;
    }

    Ok(bump)
}

/// Rent-exempt minimum for an account of `space` bytes.
pub fn rent_exempt_minimum(space: usize) -> Result<u64> {
    Ok(Rent::get()?.minimum_balance(space))
}
