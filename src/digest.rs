//! Digest matching against a database chain.
//!
//! The image digests are computed outside the engine; this module only
//! compares them byte-for-byte against entries whose list owner type names
//! the corresponding hash algorithm.

use crate::database::DatabaseChain;
use crate::guid::{EFI_CERT_SHA1_GUID, EFI_CERT_SHA256_GUID};
use crate::MatchOutcome;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Pre-computed digests of the image under verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDigests {
    pub sha256: [u8; 32],
    pub sha1: [u8; 20],
}

impl ImageDigests {
    /// Convenience constructor hashing `data` with both supported
    /// algorithms.
    pub fn of(data: &[u8]) -> Self {
        Self {
            sha256: Sha256::digest(data).into(),
            sha1: Sha1::digest(data).into(),
        }
    }
}

/// Scan `chain` for an entry equal to one of the image digests.
///
/// Returns [`MatchOutcome::Found`] with a copy of the matching entry on the
/// first hit, in chain-then-list-then-entry order.
pub fn check_db_hash(chain: &DatabaseChain, digests: &ImageDigests) -> MatchOutcome {
    chain.scan(|entry| {
        if entry.owner_type == EFI_CERT_SHA256_GUID {
            entry.data == digests.sha256
        } else if entry.owner_type == EFI_CERT_SHA1_GUID {
            entry.data == digests.sha1
        } else {
            false
        }
    })
}
