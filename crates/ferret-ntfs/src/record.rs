//! USN record and enumeration wire formats.
//!
//! The enumeration control hands back pages with a fixed layout: the first
//! 8 bytes are the file reference number to start the next request from,
//! followed by a packed run of variable-length `USN_RECORD_V2` structures.
//! This module decodes that layout byte-by-byte, validating every
//! kernel-provided length and offset before it is used to index the buffer.
//!
//! Decoding is pure and platform-neutral; the `DeviceIoControl` calls that
//! fill the buffers live in `mft.rs` and `resolver.rs`.

/// File reference number of the volume root directory on NTFS.
pub const ROOT_FRN: u64 = 0x0005_0000_0000_0005;

/// `FILE_ATTRIBUTE_DIRECTORY` bit in the record's attribute mask.
pub const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;

/// Fixed portion of a `USN_RECORD_V2` preceding the name.
pub const MIN_RECORD_LEN: usize = 60;

/// Bytes of page header (the next-start FRN) preceding the records.
pub const PAGE_HEADER_LEN: usize = 8;

/// Input structure for the bulk enumeration control (`MFT_ENUM_DATA_V0`).
///
/// 24 bytes, no padding: the field layout is consumed directly by the
/// kernel, so the struct is `#[repr(C)]` and passed by pointer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MftEnumData {
    pub start_file_reference_number: u64,
    pub low_usn: i64,
    pub high_usn: i64,
}

impl MftEnumData {
    /// Request covering the whole journal range from `start` onward.
    pub fn from_start(start: u64) -> Self {
        MftEnumData {
            start_file_reference_number: start,
            low_usn: 0,
            high_usn: i64::MAX,
        }
    }
}

/// One decoded `USN_RECORD_V2`.
///
/// Only the fields the search engine consumes are kept; timestamps, reason
/// and security fields are dropped at decode time.
#[derive(Debug, Clone)]
pub struct UsnRecord {
    /// Byte length of the on-wire record, including the name
    pub record_length: u32,

    /// This entry's MFT file reference number
    pub frn: u64,

    /// Parent directory's file reference number
    pub parent_frn: u64,

    /// Journal position of the record
    pub usn: i64,

    /// Raw attribute bitmask
    pub file_attributes: u32,

    /// Decoded UTF-16LE file name
    pub name: String,
}

impl UsnRecord {
    /// Whether the entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.file_attributes & FILE_ATTRIBUTE_DIRECTORY != 0
    }
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

fn read_i64(buf: &[u8], offset: usize) -> i64 {
    read_u64(buf, offset) as i64
}

/// Read the page header: the FRN to feed into the next enumeration request.
///
/// Returns None for pages shorter than the header (an empty page).
pub fn next_start_frn(page: &[u8]) -> Option<u64> {
    if page.len() < PAGE_HEADER_LEN {
        return None;
    }
    Some(read_i64(page, 0) as u64)
}

/// Decode the next record from `page`, advancing `offset` past it.
///
/// Records the caller cannot use are stepped over: unknown major versions
/// and records whose name range falls outside their own length. Returns
/// None once fewer than a header's worth of bytes remain, or on a corrupt
/// record length (which makes the rest of the page unwalkable).
pub fn take_record(page: &[u8], offset: &mut usize) -> Option<UsnRecord> {
    loop {
        let remaining = page.len().saturating_sub(*offset);
        if remaining <= PAGE_HEADER_LEN {
            return None;
        }

        let record = &page[*offset..];
        let record_length = read_u32(record, 0) as usize;
        if record_length < MIN_RECORD_LEN || record_length > remaining {
            // Corrupt length: nothing after this point can be framed.
            return None;
        }
        *offset += record_length;

        let record = &record[..record_length];
        let major_version = read_u16(record, 4);
        if major_version != 2 {
            continue;
        }

        let name_length = read_u16(record, 56) as usize;
        let name_offset = read_u16(record, 58) as usize;
        let Some(name_end) = name_offset.checked_add(name_length) else {
            continue;
        };
        if name_offset < MIN_RECORD_LEN || name_end > record_length {
            continue;
        }

        let units: Vec<u16> = record[name_offset..name_end]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        return Some(UsnRecord {
            record_length: record_length as u32,
            frn: read_u64(record, 8),
            parent_frn: read_u64(record, 16),
            usn: read_i64(record, 24),
            file_attributes: read_u32(record, 52),
            name: String::from_utf16_lossy(&units),
        });
    }
}

/// Iterator over the records of one page.
pub struct RecordIter<'a> {
    page: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = UsnRecord;

    fn next(&mut self) -> Option<UsnRecord> {
        take_record(self.page, &mut self.offset)
    }
}

/// Walk the records of a returned page (everything after the 8-byte header).
pub fn records(page: &[u8]) -> RecordIter<'_> {
    RecordIter {
        page,
        offset: PAGE_HEADER_LEN,
    }
}
