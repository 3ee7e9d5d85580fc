use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{Block, CommissionUpdated, ProgramConfig};
use crate::CONFIG_SEED;

#[derive(Accounts)]
pub struct SetBlockCommission<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Account<'info, ProgramConfig>,

    #[account(
        constraint = admin.key() == config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    #[account(mut)]
    pub block: Account<'info, Block>,
}

/// Changes a block's commission.  At most once per epoch and capped to a ~2%
/// increase; per entry the new value only applies after that entry's next
/// commission charge.
pub fn set_block_commission(ctx: Context<SetBlockCommission>, commission: u16) -> Result<()> {
    let block = &mut ctx.accounts.block;

    require!(block.is_complete(), ErrorCode::BlockNotComplete);

    let epoch = Clock::get()?.epoch;
    block.try_set_commission(commission, epoch)?;

    emit!(CommissionUpdated {
        block: block.key(),
        commission,
        epoch,
    });
    Ok(())
}
