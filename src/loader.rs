//! Loading database sources into the allow/deny chains.
//!
//! [`SigDbContext`] owns both chains and wraps the byte-source loader: plain
//! signature-list files, EFI variable dumps from efivarfs (4-byte attribute
//! prefix), and standalone DER certificates synthesized into a one-entry
//! list. Missing *system* databases are a warn-and-skip condition; any other
//! I/O failure is a hard setup error.

use crate::database::{DatabaseChain, DbKind, SignatureDatabase, SourceKind};
use crate::error::LoadError;
use std::fs;
use std::path::Path;

/// efivarfs path of the `db` allow-list variable.
const DB_PATH: &str = "/sys/firmware/efi/efivars/db-d719b2cb-3d3a-4596-a3bc-dad00e67656f";

/// efivarfs path of the shim machine-owner-key allow list.
const MOK_PATH: &str = "/sys/firmware/efi/efivars/MokListRT-605dab50-e046-4300-abb6-3dd810dd8b23";

/// efivarfs path of the `dbx` deny-list variable.
const DBX_PATH: &str = "/sys/firmware/efi/efivars/dbx-d719b2cb-3d3a-4596-a3bc-dad00e67656f";

/// efivarfs path of the shim machine-owner-key deny list.
const MOKX_PATH: &str = "/sys/firmware/efi/efivars/MokListXRT-605dab50-e046-4300-abb6-3dd810dd8b23";

/// The allow-chain and deny-chain a verification consults.
#[derive(Debug)]
pub struct SigDbContext {
    db: DatabaseChain,
    dbx: DatabaseChain,
}

impl Default for SigDbContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SigDbContext {
    /// Create a context with empty chains.
    pub fn new() -> Self {
        Self {
            db: DatabaseChain::new(DbKind::Db),
            dbx: DatabaseChain::new(DbKind::Dbx),
        }
    }

    /// The selected chain.
    pub fn chain(&self, which: DbKind) -> &DatabaseChain {
        match which {
            DbKind::Db => &self.db,
            DbKind::Dbx => &self.dbx,
        }
    }

    /// Add a signature-list file to the allow-chain.
    pub fn add_db_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.add_source(DbKind::Db, path.as_ref(), SourceKind::RawFile)
    }

    /// Add a signature-list file to the deny-chain.
    pub fn add_dbx_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.add_source(DbKind::Dbx, path.as_ref(), SourceKind::RawFile)
    }

    /// Add a standalone DER certificate file to the allow-chain, wrapped as
    /// a single-entry X.509 signature list.
    pub fn add_cert_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.add_source(DbKind::Db, path.as_ref(), SourceKind::SynthesizedCertificate)
    }

    /// Load one source file into the selected chain.
    ///
    /// On failure the chain is left unmodified.
    pub fn add_source(
        &mut self,
        which: DbKind,
        path: &Path,
        kind: SourceKind,
    ) -> Result<(), LoadError> {
        let data = read_source(path)?;

        if kind == SourceKind::FirmwareVariable && data.len() < 4 {
            return Err(LoadError::TruncatedVariable {
                path: path.to_path_buf(),
                len: data.len(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let database = match kind {
            SourceKind::SynthesizedCertificate => SignatureDatabase::from_certificate(name, &data),
            SourceKind::RawFile | SourceKind::FirmwareVariable => {
                SignatureDatabase::new(name, data, kind)
            }
        };

        let chain = match which {
            DbKind::Db => &mut self.db,
            DbKind::Dbx => &mut self.dbx,
        };
        chain.add(database);
        Ok(())
    }

    /// Load the firmware's own db/MokListRT allow lists and dbx/MokListXRT
    /// deny lists from efivarfs.
    ///
    /// A variable that does not exist is skipped with a warning; any other
    /// read failure is a hard error, since an unreadable mandatory database
    /// must not silently weaken the policy.
    pub fn load_system_databases(&mut self) -> Result<(), LoadError> {
        for (which, path) in [
            (DbKind::Db, DB_PATH),
            (DbKind::Db, MOK_PATH),
            (DbKind::Dbx, DBX_PATH),
            (DbKind::Dbx, MOKX_PATH),
        ] {
            match self.add_source(which, Path::new(path), SourceKind::FirmwareVariable) {
                Ok(()) => {}
                Err(err) if err.is_not_found() => {
                    log::warn!("skipping absent {} source {}", which.label(), path);
                }
                Err(err) => return Err(err),
            }
        }

        if self.db.is_empty() {
            log::warn!("no key database available");
        }
        if self.dbx.is_empty() {
            log::warn!("no key revocation database available");
        }
        Ok(())
    }
}

/// Read the whole of one source file.
fn read_source(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
