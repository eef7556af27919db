//! Signature databases and the allow/deny chains built from them.
//!
//! A [`SignatureDatabase`] owns the raw bytes of one db/dbx source. Databases
//! are collected into a [`DatabaseChain`] with prepend-only insertion: the
//! most recently added database is scanned first, and nothing is mutated
//! after insertion.

use crate::guid::{EFI_CERT_X509_GUID, OWNER_GUID_LEN};
use crate::structures::{EfiSignatureList, SignatureEntries, SignatureEntry};
use crate::MatchOutcome;

/// Size of the EFI variable attribute prefix present in firmware-variable
/// sources (e.g. files read from efivarfs).
const EFIVAR_ATTR_PREFIX: usize = 4;

/// How the raw bytes of a database were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A plain file already in signature-list format.
    RawFile,
    /// An EFI variable dump whose first 4 bytes are the variable attributes.
    FirmwareVariable,
    /// A single DER certificate wrapped into a one-entry signature list.
    SynthesizedCertificate,
}

/// Which chain a database belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    /// Allow-list ("db").
    Db,
    /// Deny-list ("dbx").
    Dbx,
}

impl DbKind {
    /// Conventional variable name, used in log output.
    pub fn label(self) -> &'static str {
        match self {
            DbKind::Db => "db",
            DbKind::Dbx => "dbx",
        }
    }
}

/// One signature database: an identifying name plus the owned raw bytes of
/// its source.
#[derive(Debug, Clone)]
pub struct SignatureDatabase {
    name: String,
    data: Vec<u8>,
    source: SourceKind,
}

impl SignatureDatabase {
    /// Wrap raw source bytes into a database node.
    ///
    /// For [`SourceKind::SynthesizedCertificate`] sources use
    /// [`SignatureDatabase::from_certificate`], which builds the wrapping
    /// signature list.
    pub fn new(name: impl Into<String>, data: Vec<u8>, source: SourceKind) -> Self {
        Self {
            name: name.into(),
            data,
            source,
        }
    }

    /// Wrap a standalone DER certificate into a single-entry X.509 signature
    /// list so the rest of the engine can treat it uniformly.
    pub fn from_certificate(name: impl Into<String>, cert_der: &[u8]) -> Self {
        let signature_size = OWNER_GUID_LEN + cert_der.len();
        let list_size = EfiSignatureList::HEADER_SIZE + signature_size;

        let mut data = Vec::with_capacity(list_size);
        data.extend_from_slice(&EFI_CERT_X509_GUID);
        data.extend_from_slice(&(list_size as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes()); // signature_header_size
        data.extend_from_slice(&(signature_size as u32).to_le_bytes());
        data.extend_from_slice(&[0u8; OWNER_GUID_LEN]); // SignatureOwner
        data.extend_from_slice(cert_der);

        Self {
            name: name.into(),
            data,
            source: SourceKind::SynthesizedCertificate,
        }
    }

    /// Identifying name (typically the source file's base name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How this database's bytes were produced.
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// The logical signature-list region of this database.
    ///
    /// Firmware-variable sources carry a 4-byte attribute prefix that is not
    /// part of the signature-list data and is excluded here.
    pub fn signature_region(&self) -> &[u8] {
        match self.source {
            SourceKind::FirmwareVariable => self.data.get(EFIVAR_ATTR_PREFIX..).unwrap_or(&[]),
            SourceKind::RawFile | SourceKind::SynthesizedCertificate => &self.data,
        }
    }

    /// Walk every entry of every signature list in this database.
    pub fn entries(&self) -> SignatureEntries<'_> {
        SignatureEntries::new(self.signature_region())
    }
}

/// An ordered collection of databases, newest-added first.
#[derive(Debug)]
pub struct DatabaseChain {
    kind: DbKind,
    databases: Vec<SignatureDatabase>,
}

impl DatabaseChain {
    /// Create an empty chain for the given selector.
    pub fn new(kind: DbKind) -> Self {
        Self {
            kind,
            databases: Vec::new(),
        }
    }

    /// Which chain this is (allow or deny).
    pub fn kind(&self) -> DbKind {
        self.kind
    }

    /// Prepend a database; it becomes the first one scanned.
    pub fn add(&mut self, database: SignatureDatabase) {
        self.databases.insert(0, database);
    }

    /// Databases in scan order (newest first).
    pub fn iter(&self) -> impl Iterator<Item = &SignatureDatabase> {
        self.databases.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Walk every entry of every database in chain order, reporting the
    /// first entry `check` accepts. The scan stops at the first match; an
    /// exhausted chain yields [`MatchOutcome::NotFound`].
    pub fn scan<F>(&self, mut check: F) -> MatchOutcome
    where
        F: FnMut(&SignatureEntry<'_>) -> bool,
    {
        for database in self.iter() {
            log::info!("searching {} {}", self.kind.label(), database.name());
            for entry in database.entries() {
                if check(&entry) {
                    return MatchOutcome::Found(entry.data.to_vec());
                }
            }
        }
        MatchOutcome::NotFound
    }
}
