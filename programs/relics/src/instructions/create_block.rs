use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::{Bid, Block, BlockConfiguration, ProgramConfig};
use crate::utils::rent_exempt_minimum;
use crate::{BLOCK_SEED, CONFIG_SEED};

#[derive(Accounts)]
#[instruction(initial_commission: u16, config: BlockConfiguration)]
pub struct CreateBlock<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub program_config: Account<'info, ProgramConfig>,

    #[account(
        constraint = admin.key() == program_config.admin @ ErrorCode::PermissionDenied,
    )]
    pub admin: Signer<'info>,

    /// Pays for the block account.
    #[account(mut)]
    pub payer: Signer<'info>,

    /// The block, sized for its entry-added bitmap.  `init` refuses to
    /// re-create an existing block.
    #[account(
        init,
        seeds = [
            BLOCK_SEED,
            &config.group_number.to_le_bytes(),
            &config.block_number.to_le_bytes(),
        ],
        bump,
        payer = payer,
        space = Block::space_for(config.total_entry_count),
    )]
    pub block: Account<'info, Block>,

    pub system_program: Program<'info, System>,
}

/// Creates a block from a validated configuration.  Entries are provisioned
/// afterwards with `add_entries_to_block`; nothing can be sold until the
/// block is complete.
pub fn create_block(
    ctx: Context<CreateBlock>,
    initial_commission: u16,
    config: BlockConfiguration,
) -> Result<()> {
    // A minimum price below the rent-exempt minimum of a bid account could
    // produce bids that are not rent exempt, hence the floor.
    config.validate(rent_exempt_minimum(Bid::LEN)?)?;

    let block = &mut ctx.accounts.block;
    block.config = config;
    block.commission = initial_commission;
    block.entries_added_bitmap = vec![0; Block::bitmap_len(config.total_entry_count)];

    msg!(
        "Block {}.{} created with {} entries",
        config.group_number,
        config.block_number,
        config.total_entry_count
    );
    Ok(())
}
