use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::ProgramConfig;
use crate::{superuser, CONFIG_SEED};

#[derive(Accounts)]
pub struct SetAdmin<'info> {
    #[account(address = superuser::ID @ ErrorCode::PermissionDenied)]
    pub superuser: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,
}

/// Rotates the admin key.  Superuser only.
pub fn set_admin(ctx: Context<SetAdmin>, new_admin: Pubkey) -> Result<()> {
    ctx.accounts.config.admin = new_admin;
    msg!("Admin set to {}", new_admin);
    Ok(())
}
