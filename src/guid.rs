//! Owner-type GUIDs used by the EFI signature database format.
//!
//! Each `EFI_SIGNATURE_LIST` carries a `SignatureType` GUID describing the
//! payload of every entry in that list: a digest of a particular algorithm,
//! or a DER-encoded X.509 certificate. GUIDs are stored here as raw bytes in
//! their on-disk (mixed-endian) layout so they can be compared directly
//! against the wire format.

/// Length of a GUID, and of the `SignatureOwner` prefix of every entry.
pub const OWNER_GUID_LEN: usize = 16;

/// EFI_CERT_X509_GUID `{a5c059a1-94e4-4aa7-87b5-ab155c2bf072}`
///
/// Entries are DER-encoded X.509 certificates.
pub const EFI_CERT_X509_GUID: [u8; 16] = [
    0xa1, 0x59, 0xc0, 0xa5, 0xe4, 0x94, 0xa7, 0x4a, 0x87, 0xb5, 0xab, 0x15, 0x5c, 0x2b, 0xf0, 0x72,
];

/// EFI_CERT_SHA256_GUID `{c1c41626-504c-4092-aca9-41f936934328}`
///
/// Entries are 32-byte SHA-256 digests.
pub const EFI_CERT_SHA256_GUID: [u8; 16] = [
    0x26, 0x16, 0xc4, 0xc1, 0x4c, 0x50, 0x92, 0x40, 0xac, 0xa9, 0x41, 0xf9, 0x36, 0x93, 0x43, 0x28,
];

/// EFI_CERT_SHA1_GUID `{826ca512-cf10-4ac9-b187-be01496631bd}`
///
/// Entries are 20-byte SHA-1 digests.
pub const EFI_CERT_SHA1_GUID: [u8; 16] = [
    0x12, 0xa5, 0x6c, 0x82, 0x10, 0xcf, 0xc9, 0x4a, 0xb1, 0x87, 0xbe, 0x01, 0x49, 0x66, 0x31, 0xbd,
];
