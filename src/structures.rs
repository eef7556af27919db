//! Wire-format structures of the EFI signature database.
//!
//! A signature database region is a sequence of `EFI_SIGNATURE_LIST` records
//! packed back-to-back. Each list groups entries of a single owner type (all
//! SHA-256 digests, all X.509 certificates, ...) and declares its own total
//! size, optional list-header size, and per-entry size.
//!
//! Every size field in the region is attacker- or firmware-influenced and is
//! validated against the remaining buffer length before it is used to index
//! memory. Malformed trailing data truncates iteration; it never errors and
//! never reads out of bounds.

use crate::guid::OWNER_GUID_LEN;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

// ============================================================================
// EFI_SIGNATURE_LIST / EFI_SIGNATURE_DATA
// ============================================================================

/// EFI_SIGNATURE_LIST header.
///
/// The optional list header (`signature_header_size` bytes) and the entries
/// (each `signature_size` bytes) follow this fixed 28-byte header.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct EfiSignatureList {
    /// GUID identifying the payload type of every entry in this list.
    pub signature_type: [u8; OWNER_GUID_LEN],
    /// Total size of the list, including this header and all entries.
    pub signature_list_size: U32,
    /// Size of the optional list-level header preceding the entries.
    pub signature_header_size: U32,
    /// Size of each entry, including its 16-byte `SignatureOwner` prefix.
    pub signature_size: U32,
}

impl EfiSignatureList {
    /// Size of the fixed EFI_SIGNATURE_LIST header.
    pub const HEADER_SIZE: usize = core::mem::size_of::<Self>();

    /// Number of entries declared by this list.
    ///
    /// A `signature_size` that does not leave room for the owner GUID yields
    /// zero entries, and a byte count that does not divide evenly is floored
    /// so a partial trailing entry is never produced.
    pub fn signature_count(&self) -> usize {
        let list_size = self.signature_list_size.get() as usize;
        let header_size = self.signature_header_size.get() as usize;
        let sig_size = self.signature_size.get() as usize;

        if sig_size <= OWNER_GUID_LEN {
            return 0;
        }

        let data_size = list_size
            .saturating_sub(Self::HEADER_SIZE)
            .saturating_sub(header_size);
        data_size / sig_size
    }

    /// Offset of the first entry relative to the start of the list.
    pub fn first_signature_offset(&self) -> usize {
        Self::HEADER_SIZE + self.signature_header_size.get() as usize
    }

    /// Check if the list's owner type matches a GUID.
    pub fn type_matches(&self, guid_bytes: &[u8; 16]) -> bool {
        self.signature_type == *guid_bytes
    }
}

/// EFI_SIGNATURE_DATA prefix of a single entry.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct EfiSignatureData {
    /// GUID identifying the producer of this entry.
    pub signature_owner: [u8; OWNER_GUID_LEN],
    // Signature payload follows...
}

impl EfiSignatureData {
    /// Size of the EfiSignatureData prefix.
    pub const HEADER_SIZE: usize = core::mem::size_of::<Self>();
}

// ============================================================================
// Iterators
// ============================================================================

/// Iterator over the `EFI_SIGNATURE_LIST` records of one database region.
///
/// Stops at the first list whose declared size is zero, smaller than the
/// fixed header, or larger than the remaining region.
pub struct SignatureListIterator<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> SignatureListIterator<'a> {
    /// Create a new iterator over the lists in `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl<'a> Iterator for SignatureListIterator<'a> {
    type Item = (&'a EfiSignatureList, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let remaining = &self.data[self.offset..];
        if remaining.len() < EfiSignatureList::HEADER_SIZE {
            log::warn!(
                "dropping {} trailing bytes at offset {}: too short for a signature list header",
                remaining.len(),
                self.offset
            );
            return None;
        }

        let list = EfiSignatureList::ref_from_prefix(remaining).ok()?.0;

        let list_size = list.signature_list_size.get() as usize;
        if list_size < EfiSignatureList::HEADER_SIZE || list_size > remaining.len() {
            // Malformed tail; drop it rather than trusting the size field.
            log::warn!(
                "dropping malformed signature list at offset {}: declared size {}, {} bytes remain",
                self.offset,
                list_size,
                remaining.len()
            );
            return None;
        }

        let list_data = &remaining[..list_size];
        self.offset += list_size;

        Some((list, list_data))
    }
}

/// Iterator over the entries of a single signature list.
pub struct SignatureIterator<'a> {
    list: &'a EfiSignatureList,
    data: &'a [u8],
    index: usize,
}

impl<'a> SignatureIterator<'a> {
    /// Iterate the entries of `list`, whose full bytes (header included) are
    /// `data`.
    pub fn new(list: &'a EfiSignatureList, data: &'a [u8]) -> Self {
        Self {
            list,
            data,
            index: 0,
        }
    }
}

impl<'a> Iterator for SignatureIterator<'a> {
    /// Returns (SignatureOwner GUID bytes, signature payload).
    type Item = ([u8; 16], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.list.signature_count() {
            return None;
        }

        let sig_size = self.list.signature_size.get() as usize;
        let offset = self.list.first_signature_offset() + self.index * sig_size;

        if offset + sig_size > self.data.len() {
            return None;
        }

        let sig_data = &self.data[offset..offset + sig_size];
        let owner = EfiSignatureData::ref_from_prefix(sig_data).ok()?.0;
        let payload = &sig_data[EfiSignatureData::HEADER_SIZE..];

        self.index += 1;
        Some((owner.signature_owner, payload))
    }
}

/// One entry yielded by [`SignatureEntries`].
#[derive(Debug, Clone, Copy)]
pub struct SignatureEntry<'a> {
    /// Owner type of the enclosing list (hash algorithm or X.509).
    pub owner_type: [u8; 16],
    /// `SignatureOwner` GUID of this entry.
    pub signature_owner: [u8; 16],
    /// Signature payload: a fixed-size digest or a DER certificate.
    pub data: &'a [u8],
}

/// Lazy walk over every entry of every list in a database region, in
/// list-then-entry order.
pub struct SignatureEntries<'a> {
    lists: SignatureListIterator<'a>,
    current: Option<([u8; 16], SignatureIterator<'a>)>,
}

impl<'a> SignatureEntries<'a> {
    /// Walk all entries in the logical region `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lists: SignatureListIterator::new(data),
            current: None,
        }
    }
}

impl<'a> Iterator for SignatureEntries<'a> {
    type Item = SignatureEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((owner_type, entries)) = &mut self.current {
                if let Some((signature_owner, data)) = entries.next() {
                    return Some(SignatureEntry {
                        owner_type: *owner_type,
                        signature_owner,
                        data,
                    });
                }
            }

            let (list, list_data) = self.lists.next()?;
            self.current = Some((list.signature_type, SignatureIterator::new(list, list_data)));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::guid::{EFI_CERT_SHA256_GUID, EFI_CERT_X509_GUID};

    /// Append a well-formed signature list of fixed-size entries to `buf`.
    pub(crate) fn push_list(buf: &mut Vec<u8>, owner_type: [u8; 16], payloads: &[&[u8]]) {
        let sig_size = 16 + payloads[0].len();
        let list_size = EfiSignatureList::HEADER_SIZE + payloads.len() * sig_size;

        buf.extend_from_slice(&owner_type);
        buf.extend_from_slice(&(list_size as u32).to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&(sig_size as u32).to_le_bytes());

        for payload in payloads {
            buf.extend_from_slice(&[0u8; 16]); // SignatureOwner
            buf.extend_from_slice(payload);
        }
    }

    #[test]
    fn test_walk_yields_all_entries_in_order() {
        let hash_a = [0xaa; 32];
        let hash_b = [0xbb; 32];
        let cert = [0xcc; 70];

        let mut buf = Vec::new();
        push_list(&mut buf, EFI_CERT_SHA256_GUID, &[&hash_a, &hash_b]);
        push_list(&mut buf, EFI_CERT_X509_GUID, &[&cert]);

        let entries: Vec<_> = SignatureEntries::new(&buf).collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].owner_type, EFI_CERT_SHA256_GUID);
        assert_eq!(entries[0].data, &hash_a);
        assert_eq!(entries[1].data, &hash_b);
        assert_eq!(entries[2].owner_type, EFI_CERT_X509_GUID);
        assert_eq!(entries[2].data, &cert);
    }

    #[test]
    fn test_truncated_final_list_is_dropped() {
        let hash = [0x11; 32];
        let mut buf = Vec::new();
        push_list(&mut buf, EFI_CERT_SHA256_GUID, &[&hash]);

        // Second list declares more bytes than remain in the region.
        buf.extend_from_slice(&EFI_CERT_SHA256_GUID);
        buf.extend_from_slice(&4096u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&48u32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 48]);

        let entries: Vec<_> = SignatureEntries::new(&buf).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].data, &hash);
    }

    #[test]
    fn test_trailing_bytes_shorter_than_header_are_dropped() {
        let hash = [0x55; 32];
        let mut buf = Vec::new();
        push_list(&mut buf, EFI_CERT_SHA256_GUID, &[&hash]);
        buf.extend_from_slice(&[0xde, 0xad, 0xbe]);

        let entries: Vec<_> = SignatureEntries::new(&buf).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].data, &hash);
    }

    #[test]
    fn test_zero_list_size_stops_iteration() {
        let hash = [0x22; 32];
        let mut buf = Vec::new();
        push_list(&mut buf, EFI_CERT_SHA256_GUID, &[&hash]);

        buf.extend_from_slice(&EFI_CERT_SHA256_GUID);
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&48u32.to_le_bytes());

        let entries: Vec<_> = SignatureEntries::new(&buf).collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_undersized_signature_size_yields_no_entries() {
        // signature_size <= owner GUID size leaves no payload bytes and must
        // not be trusted as a divisor.
        let mut buf = Vec::new();
        buf.extend_from_slice(&EFI_CERT_SHA256_GUID);
        buf.extend_from_slice(&(EfiSignatureList::HEADER_SIZE as u32 + 32).to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 32]);

        assert_eq!(SignatureEntries::new(&buf).count(), 0);
    }

    #[test]
    fn test_non_exact_division_never_reads_past_list() {
        // 40 payload bytes with a 48-byte entry size: no complete entry.
        let mut buf = Vec::new();
        buf.extend_from_slice(&EFI_CERT_SHA256_GUID);
        buf.extend_from_slice(&(EfiSignatureList::HEADER_SIZE as u32 + 40).to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&48u32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 40]);

        assert_eq!(SignatureEntries::new(&buf).count(), 0);
    }

    #[test]
    fn test_list_header_skipped_before_entries() {
        let hash = [0x33; 32];
        let header = [0xf0; 12];
        let sig_size = 16 + 32;
        let list_size = EfiSignatureList::HEADER_SIZE + header.len() + sig_size;

        let mut buf = Vec::new();
        buf.extend_from_slice(&EFI_CERT_SHA256_GUID);
        buf.extend_from_slice(&(list_size as u32).to_le_bytes());
        buf.extend_from_slice(&(header.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(sig_size as u32).to_le_bytes());
        buf.extend_from_slice(&header);
        buf.extend_from_slice(&[0u8; 16]);
        buf.extend_from_slice(&hash);

        let entries: Vec<_> = SignatureEntries::new(&buf).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].data, &hash);
    }

    #[test]
    fn test_empty_region() {
        assert_eq!(SignatureEntries::new(&[]).count(), 0);
    }
}
