//! Certificate matching for PKCS#7-signed images.
//!
//! A signed image carries a PKCS#7 blob whose embedded certificates and
//! optional signing-time attribute constrain when the signature could have
//! been produced. The matcher reconstructs a plausible instant from those
//! constraints and then asks each X.509 database entry, newest database
//! first, whether it verifies the signature at that instant.

use crate::database::DatabaseChain;
use crate::guid::EFI_CERT_X509_GUID;
use crate::pkcs7::{self, DetachedVerifier, RsaPkcs1Verifier};
use crate::time::{x509_time_to_unix, Clock, ValidityWindow};
use crate::trust::{TrustFlags, TrustStore};
use crate::MatchOutcome;

/// Search `chain` for an X.509 entry that verifies `blob` over `digest`.
///
/// `blob` is a detached PKCS#7 signature; `digest` is the SHA-256 of the
/// signed content. Any failure to decode or verify degrades to
/// [`MatchOutcome::NotFound`].
pub fn check_db_cert(
    chain: &DatabaseChain,
    blob: &[u8],
    digest: &[u8; 32],
    trust: &TrustStore,
    clock: &dyn Clock,
) -> MatchOutcome {
    check_db_cert_with(chain, blob, digest, trust, clock, &RsaPkcs1Verifier)
}

/// [`check_db_cert`] with an explicit verification backend.
pub fn check_db_cert_with<V: DetachedVerifier>(
    chain: &DatabaseChain,
    blob: &[u8],
    digest: &[u8; 32],
    trust: &TrustStore,
    clock: &dyn Clock,
    verifier: &V,
) -> MatchOutcome {
    let Some(signed_data) = pkcs7::decode_signed_data(blob) else {
        return MatchOutcome::NotFound;
    };

    let at_time = reconstruct_instant(&signed_data, clock);

    chain.scan(|entry| {
        if entry.owner_type != EFI_CERT_X509_GUID {
            return false;
        }
        let anchor = match trust.import_anchor(entry.data, TrustFlags::CA_AND_PEER) {
            Ok(anchor) => anchor,
            Err(err) => {
                log::debug!("skipping undecodable certificate entry: {err}");
                return false;
            }
        };
        verifier.verify_at(&signed_data, digest, &anchor, at_time)
    })
}

/// Reconstruct an instant at which the signature could plausibly have been
/// made.
///
/// Start from the widest representable window, intersect the validity of
/// every certificate embedded in the signature, then collapse both bounds
/// toward the signer-asserted signing time if one is present. The result is
/// the midpoint of whatever window remains. An inverted window is logged but
/// still used; verification against it simply fails.
fn reconstruct_instant(signed_data: &cms::signed_data::SignedData, clock: &dyn Clock) -> i64 {
    let mut window = ValidityWindow::WIDEST;

    for cert in pkcs7::embedded_certificates(signed_data) {
        let validity = &cert.tbs_certificate.validity;
        window.intersect(
            x509_time_to_unix(&validity.not_before),
            x509_time_to_unix(&validity.not_after),
        );
    }

    if let Some(ts) = pkcs7::signing_time(signed_data) {
        window.collapse_to(ts);
    }

    if window.is_inverted() {
        log::warn!(
            "signature has impossible time constraint: {} <= {}",
            window.not_after,
            window.not_before
        );
    }

    let at_time = window.midpoint();
    log::debug!(
        "verifying at reconstructed instant {at_time} (system time {})",
        clock.now_unix()
    );
    at_time
}
