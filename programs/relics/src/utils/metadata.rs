use anchor_lang::prelude::*;
use anchor_spl::metadata::mpl_token_metadata::types::{Creator, DataV2};
use anchor_spl::metadata::{
    create_metadata_accounts_v3, update_metadata_accounts_v2, CreateMetadataAccountsV3,
    UpdateMetadataAccountsV2,
};

use crate::states::Entry;
use crate::AUTHORITY_SEED;

//
// Thin adapters around the Metaplex Token Metadata program.  The program
// authority PDA is the update authority of every metadata account created
// here.
//

/// Accounts common to all metadata CPIs.
pub struct MetadataAccounts<'a, 'info> {
    pub metadata: &'a AccountInfo<'info>,
    pub authority: &'a AccountInfo<'info>,
    pub authority_bump: u8,
    pub metadata_program: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    pub rent: &'a AccountInfo<'info>,
}

/// Creates the metadata account for a mint.  The designated validator vote
/// address is always the first creator; `second_creator` optionally adds
/// one more.
#[allow(clippy::too_many_arguments)]
pub fn create_metadata<'info>(
    accounts: &MetadataAccounts<'_, 'info>,
    mint: &AccountInfo<'info>,
    funding: &AccountInfo<'info>,
    name: String,
    symbol: String,
    uri: String,
    second_creator: Option<Pubkey>,
) -> Result<()> {
    let mut creators = vec![Creator {
        address: crate::validator_vote::ID,
        verified: false,
        share: 100,
    }];
    if let Some(second) = second_creator {
        creators.push(Creator {
            address: second,
            verified: false,
            share: 0,
        });
    }

    let data = DataV2 {
        name,
        symbol,
        uri,
        seller_fee_basis_points: 0,
        creators: Some(creators),
        collection: None,
        uses: None,
    };

    create_metadata_accounts_v3(
        CpiContext::new_with_signer(
            accounts.metadata_program.clone(),
            CreateMetadataAccountsV3 {
                metadata: accounts.metadata.clone(),
                mint: mint.clone(),
                mint_authority: accounts.authority.clone(),
                payer: funding.clone(),
                update_authority: accounts.authority.clone(),
                system_program: accounts.system_program.clone(),
                rent: accounts.rent.clone(),
            },
            &[&[AUTHORITY_SEED, &[accounts.authority_bump]]],
        ),
        data,
        /* is_mutable */ true,
        /* update_authority_is_signer */ true,
        None,
    )
}

/// Rewrites an entry's metadata name and uri to the values of `level`.
pub fn update_metadata_for_level<'info>(
    metadata: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    metadata_program: &AccountInfo<'info>,
    entry: &Entry,
    level: u8,
) -> Result<()> {
    let level_metadata = &entry.metadata.level_metadata[level as usize];

    let data = DataV2 {
        name: level_metadata.name_str().to_string(),
        symbol: entry_symbol(),
        uri: level_metadata.uri_str().to_string(),
        seller_fee_basis_points: 0,
        creators: None,
        collection: None,
        uses: None,
    };

    update_metadata_accounts_v2(
        CpiContext::new_with_signer(
            metadata_program.clone(),
            UpdateMetadataAccountsV2 {
                metadata: metadata.clone(),
                update_authority: authority.clone(),
            },
            &[&[AUTHORITY_SEED, &[authority_bump]]],
        ),
        None,
        Some(data),
        None,
        None,
    )
}

/// Flags the metadata as having had its primary sale, for UI presentations
/// that care.
pub fn set_primary_sale_happened<'info>(
    metadata: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    authority_bump: u8,
    metadata_program: &AccountInfo<'info>,
) -> Result<()> {
    update_metadata_accounts_v2(
        CpiContext::new_with_signer(
            metadata_program.clone(),
            UpdateMetadataAccountsV2 {
                metadata: metadata.clone(),
                update_authority: authority.clone(),
            },
            &[&[AUTHORITY_SEED, &[authority_bump]]],
        ),
        None,
        None,
        Some(true),
        None,
    )
}

/// Display name of an entry before reveal: group.block.index, one-based for
/// presentation.
pub fn entry_name(group_number: u32, block_number: u32, entry_index: u16) -> String {
    format!(
        "Relic {}.{}.{}",
        group_number,
        block_number,
        entry_index as u32 + 1
    )
}

pub fn entry_symbol() -> String {
    "RELIC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_are_one_based() {
        assert_eq!(entry_name(1, 2, 0), "Relic 1.2.1");
        assert_eq!(entry_name(3, 1, 41), "Relic 3.1.42");
    }
}
