use anchor_lang::prelude::*;

use crate::error::ErrorCode;

/// Maximum number of entries in a whitelist.  The absolute maximum that fits
/// the 10KB PDA limit is 319.
pub const MAX_WHITELIST_ENTRIES: usize = 300;

/// Per-block buyer allowlist, at the PDA derived from
/// `(WHITELIST_SEED, block)`.
///
/// Created lazily on the first admin add, which must happen before the block
/// itself exists so that the list can never grow while sales are ongoing.
/// Entries are consumed on successful buys and the account may be deleted
/// once it is empty or the block's whitelist phase has ended.
#[account]
#[derive(Default, Debug)]
pub struct Whitelist {
    /// Whitelisted buyer addresses.  A buyer may appear more than once to be
    /// allowed more than one purchase.
    pub entries: Vec<Pubkey>,
}

impl Whitelist {
    /// Sized for the maximum entry count up front; the account is never
    /// resized.
    pub const LEN: usize = 8 + 4 + 32 * MAX_WHITELIST_ENTRIES;

    pub fn add(&mut self, new_entries: &[Pubkey]) -> Result<()> {
        require!(
            self.entries.len() + new_entries.len() <= MAX_WHITELIST_ENTRIES,
            ErrorCode::TooManyWhitelistEntries
        );
        self.entries.extend_from_slice(new_entries);
        Ok(())
    }

    /// If the whitelist has no entries the check trivially succeeds.
    /// Otherwise the buyer must be present; its first occurrence is removed
    /// so each entry admits exactly one purchase.
    pub fn check_and_consume(&mut self, buyer: &Pubkey) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        match self.entries.iter().position(|entry| entry == buyer) {
            Some(index) => {
                self.entries.swap_remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_once_per_listing() {
        let buyer = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        let mut whitelist = Whitelist::default();
        whitelist.add(&[buyer, other]).unwrap();

        assert!(whitelist.check_and_consume(&buyer));
        // Second purchase refused: the buyer's single entry was consumed.
        assert!(!whitelist.check_and_consume(&buyer));
        assert!(whitelist.check_and_consume(&other));
    }

    #[test]
    fn duplicate_listing_admits_two_purchases() {
        let buyer = Pubkey::new_unique();

        let mut whitelist = Whitelist::default();
        whitelist.add(&[buyer, buyer]).unwrap();

        assert!(whitelist.check_and_consume(&buyer));
        assert!(whitelist.check_and_consume(&buyer));
        assert!(!whitelist.check_and_consume(&buyer));
    }

    #[test]
    fn empty_whitelist_admits_everyone() {
        let mut whitelist = Whitelist::default();
        assert!(whitelist.check_and_consume(&Pubkey::new_unique()));
    }

    quickcheck::quickcheck! {
        /// Per buyer, successful consumes never exceed listings.
        fn prop_consumes_bounded_by_listings(listing_pattern: Vec<u8>, attempts: u8) -> bool {
            let buyers: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();

            let mut whitelist = Whitelist::default();
            let mut listed = [0usize; 4];
            for byte in listing_pattern.iter().take(MAX_WHITELIST_ENTRIES) {
                let which = (*byte % 4) as usize;
                if whitelist.add(&[buyers[which]]).is_err() {
                    return false;
                }
                listed[which] += 1;
            }

            // Only a fully empty whitelist admits unlisted buyers, so skip
            // the degenerate case.
            if whitelist.entries.is_empty() {
                return true;
            }

            let mut consumed = [0usize; 4];
            for attempt in 0..attempts {
                // A drained whitelist admits everyone; stop counting there.
                if whitelist.entries.is_empty() {
                    break;
                }
                let which = (attempt % 4) as usize;
                if whitelist.check_and_consume(&buyers[which]) {
                    consumed[which] += 1;
                }
            }

            (0..4).all(|which| consumed[which] <= listed[which])
        }
    }

    #[test]
    fn capacity_enforced() {
        let mut whitelist = Whitelist::default();
        let batch: Vec<Pubkey> = (0..MAX_WHITELIST_ENTRIES).map(|_| Pubkey::new_unique()).collect();
        whitelist.add(&batch).unwrap();
        assert!(whitelist.add(&[Pubkey::new_unique()]).is_err());
    }
}
