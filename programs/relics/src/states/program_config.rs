use anchor_lang::prelude::*;

/// Singleton program configuration, at the PDA derived from `CONFIG_SEED`.
///
/// Created once by the superuser; thereafter only the admin pubkey may be
/// rotated, and only by the superuser.
#[account]
#[derive(Default, Debug)]
pub struct ProgramConfig {
    /// The only key with rights to run the admin instructions (block and
    /// catalog management, reveals, commission changes, master stake splits).
    pub admin: Pubkey,
}

impl ProgramConfig {
    /// 8 byte discriminator + one pubkey.
    pub const LEN: usize = 8 + 32;
}
