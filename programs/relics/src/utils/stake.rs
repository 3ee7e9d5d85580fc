use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke, invoke_signed};
use anchor_lang::solana_program::stake::instruction::{self as stake_ix, StakeInstruction};
use anchor_lang::solana_program::stake::program as stake_program;
use anchor_lang::solana_program::stake::state::{Authorized, Lockup, StakeAuthorize};
use arrayref::array_ref;

use crate::error::ErrorCode;
use crate::utils::{create_pda, rent_exempt_minimum};
use crate::AUTHORITY_SEED;

/// Byte length of an external stake account.
pub const STAKE_ACCOUNT_DATA_LEN: usize = 200;

/// Meta values present in Initialized and Delegated stake accounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StakeMeta {
    pub rent_exempt_reserve: u64,
    pub staker: Pubkey,
    pub withdrawer: Pubkey,
    pub lockup_unix_timestamp: i64,
    pub lockup_epoch: u64,
    pub lockup_custodian: Pubkey,
}

/// Delegation values present in Delegated stake accounts.  The warmup /
/// cooldown rate is deliberately skipped as opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StakeDelegation {
    pub voter: Pubkey,
    pub stake: u64,
    pub activation_epoch: u64,
    pub deactivation_epoch: u64,
    pub credits_observed: u64,
}

/// Decoded contents of an external stake account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeAccount {
    Uninitialized,
    Initialized(StakeMeta),
    Delegated(StakeMeta, StakeDelegation),
    RewardsPool,
}

impl StakeAccount {
    /// Decodes a stake account, checking that it is owned by the stake
    /// program and correctly sized, so that nothing but a genuine stake
    /// account ever decodes.
    pub fn decode(account: &AccountInfo) -> Result<StakeAccount> {
        require_keys_eq!(
            *account.owner,
            stake_program::ID,
            ErrorCode::InvalidStakeAccount
        );
        let data = account.try_borrow_data()?;
        require!(
            data.len() == STAKE_ACCOUNT_DATA_LEN,
            ErrorCode::InvalidStakeAccount
        );

        let raw = array_ref![data, 0, STAKE_ACCOUNT_DATA_LEN];
        decode_image(raw).ok_or(error!(ErrorCode::InvalidStakeAccount))
    }

    /// Currently delegated lamports; 0 for anything but a Delegated account.
    pub fn delegated_lamports(&self) -> u64 {
        match self {
            StakeAccount::Delegated(_, delegation) => delegation.stake,
            _ => 0,
        }
    }
}

fn decode_image(raw: &[u8; STAKE_ACCOUNT_DATA_LEN]) -> Option<StakeAccount> {
    match u32::from_le_bytes(*array_ref![raw, 0, 4]) {
        0 => Some(StakeAccount::Uninitialized),
        1 => Some(StakeAccount::Initialized(decode_meta(raw))),
        2 => Some(StakeAccount::Delegated(
            decode_meta(raw),
            decode_delegation(raw),
        )),
        3 => Some(StakeAccount::RewardsPool),
        _ => None,
    }
}

fn decode_meta(raw: &[u8; STAKE_ACCOUNT_DATA_LEN]) -> StakeMeta {
    StakeMeta {
        rent_exempt_reserve: u64::from_le_bytes(*array_ref![raw, 4, 8]),
        staker: Pubkey::new_from_array(*array_ref![raw, 12, 32]),
        withdrawer: Pubkey::new_from_array(*array_ref![raw, 44, 32]),
        lockup_unix_timestamp: i64::from_le_bytes(*array_ref![raw, 76, 8]),
        lockup_epoch: u64::from_le_bytes(*array_ref![raw, 84, 8]),
        lockup_custodian: Pubkey::new_from_array(*array_ref![raw, 92, 32]),
    }
}

fn decode_delegation(raw: &[u8; STAKE_ACCOUNT_DATA_LEN]) -> StakeDelegation {
    StakeDelegation {
        voter: Pubkey::new_from_array(*array_ref![raw, 124, 32]),
        stake: u64::from_le_bytes(*array_ref![raw, 156, 8]),
        activation_epoch: u64::from_le_bytes(*array_ref![raw, 164, 8]),
        deactivation_epoch: u64::from_le_bytes(*array_ref![raw, 172, 8]),
        // 180..188 is the f64 warmup/cooldown rate, skipped
        credits_observed: u64::from_le_bytes(*array_ref![raw, 188, 8]),
    }
}

/// Queries the stake program for its minimum delegation via CPI return data.
/// Stake accounts created or split by this program must never fall below
/// this amount.
pub fn get_minimum_stake_delegation() -> Result<u64> {
    invoke(&stake_ix::get_minimum_delegation(), &[])?;

    let (_, data) =
        get_return_data().ok_or(error!(ErrorCode::FailedToGetMinimumStakeDelegation))?;
    if data.len() < 8 {
        return err!(ErrorCode::FailedToGetMinimumStakeDelegation);
    }
    Ok(u64::from_le_bytes(*array_ref![data, 0, 8]))
}

fn authority_seeds(bump: &[u8; 1]) -> [&[u8]; 2] {
    [AUTHORITY_SEED, bump]
}

/// Creates a stake account at a PDA and initializes it with both authorities
/// set to the program authority.
#[allow(clippy::too_many_arguments)]
pub fn create_stake_account<'info>(
    stake_account: &AccountInfo<'info>,
    seeds: &[&[u8]],
    funding: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    rent: &AccountInfo<'info>,
    authority: &Pubkey,
    stake_lamports: u64,
) -> Result<()> {
    let rent_minimum = rent_exempt_minimum(STAKE_ACCOUNT_DATA_LEN)?;

    create_pda(
        stake_account,
        seeds,
        funding,
        system_program,
        &stake_program::ID,
        rent_minimum + stake_lamports,
        STAKE_ACCOUNT_DATA_LEN as u64,
    )?;

    let authorized = Authorized {
        staker: *authority,
        withdrawer: *authority,
    };
    let ix = stake_ix::initialize(stake_account.key, &authorized, &Lockup::default());
    invoke(&ix, &[stake_account.clone(), rent.clone()])?;

    Ok(())
}

/// Sets both stake authorities, signed by the current withdraw authority
/// (a transaction signer).
pub fn set_stake_authorities<'info>(
    stake_account: &AccountInfo<'info>,
    current_authority: &AccountInfo<'info>,
    new_authority: &Pubkey,
    clock: &AccountInfo<'info>,
) -> Result<()> {
    for role in [StakeAuthorize::Staker, StakeAuthorize::Withdrawer] {
        let ix = stake_ix::authorize(
            stake_account.key,
            current_authority.key,
            new_authority,
            role,
            None,
        );
        invoke(
            &ix,
            &[
                stake_account.clone(),
                clock.clone(),
                current_authority.clone(),
            ],
        )?;
    }
    Ok(())
}

/// Sets both stake authorities, signed by the program authority PDA.
pub fn set_stake_authorities_signed<'info>(
    stake_account: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    new_authority: &Pubkey,
    clock: &AccountInfo<'info>,
) -> Result<()> {
    let bump = [authority_bump];
    let seeds = authority_seeds(&bump);

    for role in [StakeAuthorize::Staker, StakeAuthorize::Withdrawer] {
        let ix = stake_ix::authorize(stake_account.key, authority.key, new_authority, role, None);
        invoke_signed(
            &ix,
            &[stake_account.clone(), clock.clone(), authority.clone()],
            &[&seeds],
        )?;
    }
    Ok(())
}

/// Delegates a stake account to a vote account, signed by the program
/// authority PDA.
#[allow(clippy::too_many_arguments)]
pub fn delegate_stake_signed<'info>(
    stake_account: &AccountInfo<'info>,
    vote_account: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    clock: &AccountInfo<'info>,
    stake_history: &AccountInfo<'info>,
    stake_config: &AccountInfo<'info>,
) -> Result<()> {
    let bump = [authority_bump];
    let seeds = authority_seeds(&bump);

    let ix = stake_ix::delegate_stake(stake_account.key, authority.key, vote_account.key);
    invoke_signed(
        &ix,
        &[
            stake_account.clone(),
            vote_account.clone(),
            clock.clone(),
            stake_history.clone(),
            stake_config.clone(),
            authority.clone(),
        ],
        &[&seeds],
    )?;
    Ok(())
}

/// Deactivates a delegated stake account, signed by the program authority.
pub fn deactivate_stake_signed<'info>(
    stake_account: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    clock: &AccountInfo<'info>,
) -> Result<()> {
    let bump = [authority_bump];
    let seeds = authority_seeds(&bump);

    let ix = stake_ix::deactivate_stake(stake_account.key, authority.key);
    invoke_signed(
        &ix,
        &[stake_account.clone(), clock.clone(), authority.clone()],
        &[&seeds],
    )?;
    Ok(())
}

/// Accounts shared by every bridge move.  The bridge account is an ephemeral
/// stake account at the PDA `(BRIDGE_SEED, entry mint)`; it is re-created
/// for each move and drained again before the move completes.
pub struct BridgeAccounts<'a, 'info> {
    pub bridge: &'a AccountInfo<'info>,
    /// Seeds of the bridge PDA, without the bump.
    pub bridge_seeds: &'a [&'a [u8]],
    pub funding: &'a AccountInfo<'info>,
    pub authority: &'a AccountInfo<'info>,
    pub authority_bump: u8,
    pub clock: &'a AccountInfo<'info>,
    pub stake_history: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
}

/// Moves `lamports` of delegated stake from `from` to `to` through the
/// bridge: split into the bridge, merge the bridge into the destination,
/// then withdraw the bridge's transient rent-exempt minimum from the
/// destination back to the funding account so the bridge can be re-created
/// next time.  `lamports` must be at least the stake minimum delegation or
/// the split will fail.
pub fn move_stake_via_bridge<'info>(
    bridge: &BridgeAccounts<'_, 'info>,
    from: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    lamports: u64,
) -> Result<()> {
    let rent_minimum = rent_exempt_minimum(STAKE_ACCOUNT_DATA_LEN)?;

    create_pda(
        bridge.bridge,
        bridge.bridge_seeds,
        bridge.funding,
        bridge.system_program,
        &stake_program::ID,
        rent_minimum,
        STAKE_ACCOUNT_DATA_LEN as u64,
    )?;

    let bump = [bridge.authority_bump];
    let seeds = authority_seeds(&bump);

    // Split [lamports] from [from] into the bridge.  The split instruction
    // is built raw: the SDK helper bundles allocate/assign instructions for
    // a fresh system account, but the bridge is already a stake-owned PDA.
    let split = Instruction::new_with_bincode(
        stake_program::ID,
        &StakeInstruction::Split(lamports),
        vec![
            AccountMeta::new(*from.key, false),
            AccountMeta::new(*bridge.bridge.key, false),
            AccountMeta::new_readonly(*bridge.authority.key, true),
        ],
    );
    invoke_signed(
        &split,
        &[from.clone(), bridge.bridge.clone(), bridge.authority.clone()],
        &[&seeds],
    )?;

    // Merge the bridge into [to], draining the bridge completely.
    let merge = Instruction::new_with_bincode(
        stake_program::ID,
        &StakeInstruction::Merge,
        vec![
            AccountMeta::new(*to.key, false),
            AccountMeta::new(*bridge.bridge.key, false),
            AccountMeta::new_readonly(*bridge.clock.key, false),
            AccountMeta::new_readonly(*bridge.stake_history.key, false),
            AccountMeta::new_readonly(*bridge.authority.key, true),
        ],
    );
    invoke_signed(
        &merge,
        &[
            to.clone(),
            bridge.bridge.clone(),
            bridge.clock.clone(),
            bridge.stake_history.clone(),
            bridge.authority.clone(),
        ],
        &[&seeds],
    )?;

    // Withdraw the transient rent-exempt minimum back to the funding
    // account, leaving the move zero-sum for the caller.
    let withdraw = stake_ix::withdraw(
        to.key,
        bridge.authority.key,
        bridge.funding.key,
        rent_minimum,
        None,
    );
    invoke_signed(
        &withdraw,
        &[
            to.clone(),
            bridge.funding.clone(),
            bridge.clock.clone(),
            bridge.stake_history.clone(),
            bridge.authority.clone(),
        ],
        &[&seeds],
    )?;

    Ok(())
}

/// Splits `lamports` from the master stake account into a caller-provided
/// account, creating it as a stake-owned account first and handing its
/// authorities to `new_authority`.
#[allow(clippy::too_many_arguments)]
pub fn split_master_stake_signed<'info>(
    master_stake: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    new_authority: &Pubkey,
    lamports: u64,
    funding: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    clock: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
) -> Result<()> {
    // The target signs the transaction, so a plain CreateAccount works.
    let ix = anchor_lang::solana_program::system_instruction::create_account(
        funding.key,
        target.key,
        rent_exempt_minimum(STAKE_ACCOUNT_DATA_LEN)?,
        STAKE_ACCOUNT_DATA_LEN as u64,
        &stake_program::ID,
    );
    invoke(&ix, &[funding.clone(), target.clone(), system_program.clone()])?;

    let bump = [authority_bump];
    let seeds = authority_seeds(&bump);

    let split = Instruction::new_with_bincode(
        stake_program::ID,
        &StakeInstruction::Split(lamports),
        vec![
            AccountMeta::new(*master_stake.key, false),
            AccountMeta::new(*target.key, false),
            AccountMeta::new_readonly(*authority.key, true),
        ],
    );
    invoke_signed(
        &split,
        &[master_stake.clone(), target.clone(), authority.clone()],
        &[&seeds],
    )?;

    set_stake_authorities_signed(target, authority, authority_bump, new_authority, clock)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(state: u32) -> [u8; STAKE_ACCOUNT_DATA_LEN] {
        let mut raw = [0u8; STAKE_ACCOUNT_DATA_LEN];
        raw[0..4].copy_from_slice(&state.to_le_bytes());
        raw
    }

    fn write_meta(raw: &mut [u8; STAKE_ACCOUNT_DATA_LEN], meta: &StakeMeta) {
        raw[4..12].copy_from_slice(&meta.rent_exempt_reserve.to_le_bytes());
        raw[12..44].copy_from_slice(meta.staker.as_ref());
        raw[44..76].copy_from_slice(meta.withdrawer.as_ref());
        raw[76..84].copy_from_slice(&meta.lockup_unix_timestamp.to_le_bytes());
        raw[84..92].copy_from_slice(&meta.lockup_epoch.to_le_bytes());
        raw[92..124].copy_from_slice(meta.lockup_custodian.as_ref());
    }

    fn write_delegation(raw: &mut [u8; STAKE_ACCOUNT_DATA_LEN], delegation: &StakeDelegation) {
        raw[124..156].copy_from_slice(delegation.voter.as_ref());
        raw[156..164].copy_from_slice(&delegation.stake.to_le_bytes());
        raw[164..172].copy_from_slice(&delegation.activation_epoch.to_le_bytes());
        raw[172..180].copy_from_slice(&delegation.deactivation_epoch.to_le_bytes());
        raw[180..188].copy_from_slice(&0.25f64.to_le_bytes());
        raw[188..196].copy_from_slice(&delegation.credits_observed.to_le_bytes());
    }

    #[test]
    fn decodes_uninitialized_and_rewards_pool() {
        let raw = image(0);
        assert_eq!(decode_state(&raw), StakeAccount::Uninitialized);

        let raw = image(3);
        assert_eq!(decode_state(&raw), StakeAccount::RewardsPool);
    }

    #[test]
    fn decodes_initialized_meta() {
        let meta = StakeMeta {
            rent_exempt_reserve: 2_282_880,
            staker: Pubkey::new_unique(),
            withdrawer: Pubkey::new_unique(),
            lockup_unix_timestamp: -5,
            lockup_epoch: 9,
            lockup_custodian: Pubkey::new_unique(),
        };
        let mut raw = image(1);
        write_meta(&mut raw, &meta);

        assert_eq!(decode_state(&raw), StakeAccount::Initialized(meta));
    }

    #[test]
    fn decodes_delegation_and_skips_the_rate() {
        let meta = StakeMeta {
            rent_exempt_reserve: 2_282_880,
            staker: Pubkey::new_unique(),
            withdrawer: Pubkey::new_unique(),
            ..StakeMeta::default()
        };
        let delegation = StakeDelegation {
            voter: Pubkey::new_unique(),
            stake: 10 * crate::LAMPORTS_PER_SOL,
            activation_epoch: 400,
            deactivation_epoch: u64::MAX,
            credits_observed: 123_456,
        };
        let mut raw = image(2);
        write_meta(&mut raw, &meta);
        write_delegation(&mut raw, &delegation);

        let decoded = decode_state(&raw);
        assert_eq!(decoded, StakeAccount::Delegated(meta, delegation));
        assert_eq!(decoded.delegated_lamports(), 10 * crate::LAMPORTS_PER_SOL);
    }

    #[test]
    fn unknown_state_tag_is_rejected() {
        let raw = image(7);
        assert!(decode_image(&raw).is_none());
    }

    fn decode_state(raw: &[u8; STAKE_ACCOUNT_DATA_LEN]) -> StakeAccount {
        decode_image(raw).unwrap()
    }
}
