//! Builders for the DER structures exercised in tests.
//!
//! The certificates and signed-data blobs built here are structurally valid
//! but carry garbage key material and signatures. Matcher tests pair them
//! with a substitute verifier; only the parsing paths see them.

use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{
    CertificateSet, EncapsulatedContentInfo, SignedData, SignerIdentifier, SignerInfo, SignerInfos,
};
use const_oid::db::rfc5911::{ID_DATA, ID_SIGNED_DATA, ID_SIGNING_TIME};
use const_oid::db::rfc5912::{ID_SHA_256, RSA_ENCRYPTION, SHA_256_WITH_RSA_ENCRYPTION};
use der::asn1::{Any, BitString, GeneralizedTime, OctetString, SetOfVec, UtcTime};
use der::{DateTime, Encode};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use std::str::FromStr;
use std::time::Duration;
use x509_cert::attr::Attribute;
use x509_cert::certificate::{TbsCertificate, Version};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::Certificate;

/// RSAPublicKey with a 4-byte modulus and exponent 65537. Parses fine,
/// verifies nothing.
pub(crate) const TEST_RSA_PUBLIC_KEY_DER: &[u8] = &[
    0x30, 0x0c, // SEQUENCE
    0x02, 0x05, 0x00, 0xde, 0xad, 0xbe, 0xef, // modulus INTEGER
    0x02, 0x03, 0x01, 0x00, 0x01, // exponent INTEGER
];

fn unix_to_time(secs: i64) -> Time {
    let dt = DateTime::from_unix_duration(Duration::from_secs(secs as u64)).unwrap();
    Time::GeneralTime(GeneralizedTime::from_date_time(dt))
}

fn alg_sha256() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: ID_SHA_256,
        parameters: None,
    }
}

/// A self-contained certificate valid over `[not_before, not_after]` with
/// the garbage test key.
pub(crate) fn test_certificate(not_before: i64, not_after: i64) -> Certificate {
    certificate_with_key(not_before, not_after, TEST_RSA_PUBLIC_KEY_DER)
}

/// A certificate valid over `[not_before, not_after]` carrying
/// `public_key_der` (a DER RSAPublicKey) as its subject key.
pub(crate) fn certificate_with_key(
    not_before: i64,
    not_after: i64,
    public_key_der: &[u8],
) -> Certificate {
    let name = Name::from_str("CN=sigdb test").unwrap();

    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[0x01]).unwrap(),
        signature: AlgorithmIdentifierOwned {
            oid: SHA_256_WITH_RSA_ENCRYPTION,
            parameters: None,
        },
        issuer: name.clone(),
        validity: Validity {
            not_before: unix_to_time(not_before),
            not_after: unix_to_time(not_after),
        },
        subject: name,
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: RSA_ENCRYPTION,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(public_key_der).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };

    Certificate {
        tbs_certificate: tbs,
        signature_algorithm: AlgorithmIdentifierOwned {
            oid: SHA_256_WITH_RSA_ENCRYPTION,
            parameters: None,
        },
        signature: BitString::from_bytes(&[0x42; 16]).unwrap(),
    }
}

/// DER encoding of [`test_certificate`].
pub(crate) fn test_certificate_der(not_before: i64, not_after: i64) -> Vec<u8> {
    test_certificate(not_before, not_after)
        .to_der()
        .unwrap()
}

fn signer_info(signing_time: Option<i64>, signature: &[u8]) -> SignerInfo {
    let signed_attrs = signing_time.map(|secs| {
        let dt = DateTime::from_unix_duration(Duration::from_secs(secs as u64)).unwrap();
        let utc = UtcTime::from_date_time(dt).unwrap();
        let attr = Attribute {
            oid: ID_SIGNING_TIME,
            values: SetOfVec::try_from(vec![Any::encode_from(&utc).unwrap()]).unwrap(),
        };
        SetOfVec::try_from(vec![attr]).unwrap()
    });

    SignerInfo {
        version: CmsVersion::V1,
        sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: Name::from_str("CN=sigdb test").unwrap(),
            serial_number: SerialNumber::new(&[0x01]).unwrap(),
        }),
        digest_alg: alg_sha256(),
        signed_attrs,
        signature_algorithm: AlgorithmIdentifierOwned {
            oid: RSA_ENCRYPTION,
            parameters: None,
        },
        signature: OctetString::new(signature).unwrap(),
        unsigned_attrs: None,
    }
}

/// A DER PKCS#7 signed-data blob embedding `certs` and, optionally, a
/// signing-time attribute. The signature bytes are garbage.
pub(crate) fn signed_blob(certs: &[Certificate], signing_time: Option<i64>) -> Vec<u8> {
    signed_blob_with_signature(certs, signing_time, &[0xab; 16])
}

/// [`signed_blob`] with caller-supplied signature bytes, for tests that
/// exercise real verification.
pub(crate) fn signed_blob_with_signature(
    certs: &[Certificate],
    signing_time: Option<i64>,
    signature: &[u8],
) -> Vec<u8> {
    let certificates = if certs.is_empty() {
        None
    } else {
        let choices: Vec<_> = certs
            .iter()
            .cloned()
            .map(CertificateChoices::Certificate)
            .collect();
        Some(CertificateSet(SetOfVec::try_from(choices).unwrap()))
    };

    let signed_data = SignedData {
        version: CmsVersion::V1,
        digest_algorithms: SetOfVec::try_from(vec![alg_sha256()]).unwrap(),
        encap_content_info: EncapsulatedContentInfo {
            econtent_type: ID_DATA,
            econtent: None,
        },
        certificates,
        crls: None,
        signer_infos: SignerInfos(
            SetOfVec::try_from(vec![signer_info(signing_time, signature)]).unwrap(),
        ),
    };

    let content_info = ContentInfo {
        content_type: ID_SIGNED_DATA,
        content: Any::encode_from(&signed_data).unwrap(),
    };
    content_info.to_der().unwrap()
}
