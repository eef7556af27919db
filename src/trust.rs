//! Temporary trust anchors.
//!
//! Each certificate-match attempt imports one candidate entry as a trusted
//! root, runs the verification primitive against it, and tears the anchor
//! down again. The store is passed explicitly rather than being process-wide
//! state, and [`TrustAnchor`] is an RAII guard so the anchor is destroyed on
//! every exit path.

use der::Decode;
use std::cell::RefCell;
use x509_cert::Certificate;

/// Trust assigned to an imported anchor.
///
/// The engine always imports candidates as "valid CA, valid peer".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustFlags {
    pub valid_ca: bool,
    pub valid_peer: bool,
}

impl TrustFlags {
    /// The flags used for signature-database candidates.
    pub const CA_AND_PEER: Self = Self {
        valid_ca: true,
        valid_peer: true,
    };
}

/// A store of temporarily trusted roots. Single-threaded by design; the
/// engine never shares it across threads.
#[derive(Debug, Default)]
pub struct TrustStore {
    next_id: RefCell<u64>,
    anchors: RefCell<Vec<u64>>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of anchors currently registered.
    pub fn anchor_count(&self) -> usize {
        self.anchors.borrow().len()
    }

    /// Parse a DER certificate and register it as a trusted root with the
    /// given flags. The returned guard removes the anchor when dropped.
    pub fn import_anchor(
        &self,
        cert_der: &[u8],
        flags: TrustFlags,
    ) -> Result<TrustAnchor<'_>, der::Error> {
        let certificate = Certificate::from_der(cert_der)?;

        let mut next_id = self.next_id.borrow_mut();
        let id = *next_id;
        *next_id += 1;
        self.anchors.borrow_mut().push(id);

        Ok(TrustAnchor {
            store: self,
            id,
            flags,
            certificate,
        })
    }

    fn remove(&self, id: u64) {
        self.anchors.borrow_mut().retain(|a| *a != id);
    }
}

/// A registered trust anchor, scoped to one verification attempt.
#[derive(Debug)]
pub struct TrustAnchor<'a> {
    store: &'a TrustStore,
    id: u64,
    flags: TrustFlags,
    certificate: Certificate,
}

impl TrustAnchor<'_> {
    /// The parsed anchor certificate.
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// The trust assigned at import.
    pub fn flags(&self) -> TrustFlags {
        self.flags
    }
}

impl Drop for TrustAnchor<'_> {
    fn drop(&mut self) {
        self.store.remove(self.id);
    }
}
