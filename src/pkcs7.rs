//! PKCS#7/CMS primitives consumed by the certificate matcher.
//!
//! Covers the four operations the matcher needs: decode a signed-data blob,
//! extract its embedded certificates, extract the optional signing-time
//! attribute, and verify a detached signature against a digest at a given
//! instant (RSA PKCS#1 v1.5 over SHA-256, the only algorithm supported
//! end-to-end).

use crate::time::x509_time_to_unix;
use crate::trust::TrustAnchor;
use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::SignedData;
use const_oid::db::rfc5911::{ID_SIGNED_DATA, ID_SIGNING_TIME};
use der::asn1::{GeneralizedTime, UtcTime};
use der::{Decode, Encode};
use rsa::signature::hazmat::PrehashVerifier;
use rsa::BigUint;
use sha2::Sha256;
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::Certificate;

/// Decode a PKCS#7 blob into its signed-data payload.
///
/// Returns `None` for anything that is not well-formed signed-data; the
/// caller treats that as a non-match, not an error.
pub fn decode_signed_data(blob: &[u8]) -> Option<SignedData> {
    let content_info = match ContentInfo::from_der(blob) {
        Ok(ci) => ci,
        Err(err) => {
            log::debug!("failed to parse PKCS#7 ContentInfo: {err}");
            return None;
        }
    };

    if content_info.content_type != ID_SIGNED_DATA {
        log::debug!(
            "PKCS#7 content type {} is not signed-data",
            content_info.content_type
        );
        return None;
    }

    let signed_data_bytes = content_info.content.to_der().ok()?;
    match SignedData::from_der(&signed_data_bytes) {
        Ok(sd) => Some(sd),
        Err(err) => {
            log::debug!("failed to parse PKCS#7 SignedData: {err}");
            None
        }
    }
}

/// The certificates embedded in a signed-data structure (may be empty).
pub fn embedded_certificates(signed_data: &SignedData) -> Vec<Certificate> {
    let Some(certificates) = &signed_data.certificates else {
        return Vec::new();
    };

    certificates
        .0
        .iter()
        .filter_map(|choice| match choice {
            CertificateChoices::Certificate(cert) => Some(cert.clone()),
            _ => None,
        })
        .collect()
}

/// The signer-asserted signing time, if any signer carries one that decodes.
///
/// An attribute that fails to decode is ignored, matching the policy that a
/// bad signing-time claim simply does not narrow the window.
pub fn signing_time(signed_data: &SignedData) -> Option<i64> {
    for signer in signed_data.signer_infos.0.iter() {
        let Some(attrs) = &signer.signed_attrs else {
            continue;
        };
        for attr in attrs.iter() {
            if attr.oid != ID_SIGNING_TIME {
                continue;
            }
            let Some(value) = attr.values.iter().next() else {
                continue;
            };
            if let Ok(t) = value.decode_as::<UtcTime>() {
                return Some(t.to_date_time().unix_duration().as_secs() as i64);
            }
            if let Ok(t) = value.decode_as::<GeneralizedTime>() {
                return Some(t.to_date_time().unix_duration().as_secs() as i64);
            }
            log::debug!("undecodable signing-time attribute ignored");
        }
    }
    None
}

/// Verification of one detached signature against one trust anchor at one
/// instant. The production implementation is [`RsaPkcs1Verifier`]; tests
/// substitute their own.
pub trait DetachedVerifier {
    /// True when `signed_data` carries a signature by the anchor's key over
    /// `digest`, and the anchor is valid at `at_time`.
    fn verify_at(
        &self,
        signed_data: &SignedData,
        digest: &[u8; 32],
        anchor: &TrustAnchor<'_>,
        at_time: i64,
    ) -> bool;
}

/// RSA PKCS#1 v1.5 / SHA-256 detached-signature verification.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaPkcs1Verifier;

impl DetachedVerifier for RsaPkcs1Verifier {
    fn verify_at(
        &self,
        signed_data: &SignedData,
        digest: &[u8; 32],
        anchor: &TrustAnchor<'_>,
        at_time: i64,
    ) -> bool {
        let validity = &anchor.certificate().tbs_certificate.validity;
        let not_before = x509_time_to_unix(&validity.not_before);
        let not_after = x509_time_to_unix(&validity.not_after);
        if at_time < not_before || at_time > not_after {
            log::debug!(
                "anchor not valid at {at_time}: validity [{not_before}, {not_after}]"
            );
            return false;
        }

        let Some(key) =
            rsa_key_from_spki(&anchor.certificate().tbs_certificate.subject_public_key_info)
        else {
            return false;
        };
        let verifying_key = rsa::pkcs1v15::VerifyingKey::<Sha256>::new_unprefixed(key);

        for signer in signed_data.signer_infos.0.iter() {
            let Ok(signature) = rsa::pkcs1v15::Signature::try_from(signer.signature.as_bytes())
            else {
                continue;
            };
            if verifying_key.verify_prehash(digest, &signature).is_ok() {
                return true;
            }
        }

        log::debug!("no signer info verified against the anchor key");
        false
    }
}

/// Extract an RSA public key from a certificate's SubjectPublicKeyInfo.
fn rsa_key_from_spki(spki: &SubjectPublicKeyInfoOwned) -> Option<rsa::RsaPublicKey> {
    let pk_bytes = spki.subject_public_key.raw_bytes();
    let (modulus, exponent) = parse_rsa_public_key_der(pk_bytes)?;

    match rsa::RsaPublicKey::new(
        BigUint::from_bytes_be(modulus),
        BigUint::from_bytes_be(exponent),
    ) {
        Ok(key) => Some(key),
        Err(err) => {
            log::debug!("failed to construct RSA key: {err}");
            None
        }
    }
}

/// Parse a DER RSAPublicKey: `SEQUENCE { modulus INTEGER, exponent INTEGER }`.
///
/// Returns the raw big-endian magnitudes with any leading sign byte removed.
fn parse_rsa_public_key_der(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let rest = expect_tag(data, 0x30)?;
    let (seq, _) = split_der_value(rest)?;

    let after_mod_tag = expect_tag(seq, 0x02)?;
    let (modulus, rest) = split_der_value(after_mod_tag)?;

    let after_exp_tag = expect_tag(rest, 0x02)?;
    let (exponent, _) = split_der_value(after_exp_tag)?;

    Some((strip_sign_byte(modulus), strip_sign_byte(exponent)))
}

fn expect_tag(data: &[u8], tag: u8) -> Option<&[u8]> {
    match data.split_first() {
        Some((&first, rest)) if first == tag => Some(rest),
        _ => None,
    }
}

/// Split a DER length prefix plus value off `data`, returning the value and
/// the remaining bytes. Indefinite lengths are rejected.
fn split_der_value(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let (&first, rest) = data.split_first()?;

    let (len, rest) = if first < 0x80 {
        (first as usize, rest)
    } else if first == 0x80 {
        return None;
    } else {
        let num_bytes = (first & 0x7f) as usize;
        if num_bytes > 4 || rest.len() < num_bytes {
            return None;
        }
        let mut len = 0usize;
        for &b in &rest[..num_bytes] {
            len = (len << 8) | b as usize;
        }
        (len, &rest[num_bytes..])
    };

    if len > rest.len() {
        return None;
    }
    Some(rest.split_at(len))
}

/// Drop the leading zero DER uses to keep positive INTEGERs unsigned.
fn strip_sign_byte(int: &[u8]) -> &[u8] {
    match int.split_first() {
        Some((0x00, rest)) if !rest.is_empty() => rest,
        _ => int,
    }
}
