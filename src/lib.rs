//! EFI signature-database matching.
//!
//! Loads allow ("db") and deny ("dbx") signature databases from files,
//! efivarfs variable dumps, or standalone DER certificates, and answers one
//! question about a binary: does any database entry match it? Hash entries
//! are matched by digest comparison; X.509 entries by verifying the binary's
//! detached PKCS#7 signature against the entry at an instant reconstructed
//! from the signature's own time constraints.
//!
//! The usual entry point is [`SigDbContext`]:
//!
//! ```no_run
//! use efi_sigdb::{check_db_hash, DbKind, ImageDigests, SigDbContext};
//!
//! # fn main() -> Result<(), efi_sigdb::LoadError> {
//! let mut ctx = SigDbContext::new();
//! ctx.load_system_databases()?;
//!
//! let image = std::fs::read("image.bin").unwrap();
//! let digests = ImageDigests::of(&image);
//! let denied = check_db_hash(ctx.chain(DbKind::Dbx), &digests);
//! # let _ = denied;
//! # Ok(())
//! # }
//! ```

pub mod cert;
pub mod database;
pub mod digest;
pub mod error;
pub mod guid;
pub mod loader;
pub mod pkcs7;
pub mod structures;
pub mod time;
pub mod trust;

#[cfg(test)]
pub(crate) mod testutil;

pub use cert::{check_db_cert, check_db_cert_with};
pub use database::{DatabaseChain, DbKind, SignatureDatabase, SourceKind};
pub use digest::{check_db_hash, ImageDigests};
pub use error::LoadError;
pub use loader::SigDbContext;
pub use pkcs7::{DetachedVerifier, RsaPkcs1Verifier};
pub use time::{Clock, SystemClock};
pub use trust::{TrustAnchor, TrustFlags, TrustStore};

/// The result of searching a database chain.
///
/// Search failures of any kind (undecodable input, unverifiable signatures)
/// degrade to `NotFound`; only a positive match reports `Found`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A database entry matched; carries the entry's payload bytes.
    Found(Vec<u8>),
    /// No entry in any database matched.
    NotFound,
}

impl MatchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchOutcome::Found(_))
    }
}
