//! Parses the 8- or 12-byte b-tree page header that immediately follows a
//! page's body offset (100 bytes into page 1, 0 elsewhere).
//!
//! Field order: `page_type` (1), `first_freeblock` (2), `cell_count` (2),
//! `content_start` (2), `fragmented_free_bytes` (1), and, for interior
//! pages only, `rightmost_pointer` (4).

use byteorder::{BigEndian, ReadBytesExt};

use super::{Error, PageKind};
use crate::pager::PageNum;

#[derive(Debug, Clone, Copy)]
pub struct PageHeader {
    pub kind: PageKind,
    pub first_freeblock: u16,
    pub cell_count: u16,
    pub content_start: u16,
    pub fragmented_free_bytes: u8,
    pub rightmost_pointer: Option<u32>,
}

impl PageHeader {
    /// Size in bytes of this header: 8 for leaves, 12 for interiors.
    pub fn size(&self) -> usize {
        if self.kind.is_interior() {
            12
        } else {
            8
        }
    }
}

/// Parses the page header at `body_offset` within `page`. `page_number`
/// is only used to name the offending page in errors.
pub fn parse(page: &[u8], body_offset: usize, page_number: PageNum) -> Result<PageHeader, Error> {
    let mut cursor = std::io::Cursor::new(&page[body_offset..]);
    let type_byte = cursor.read_u8().map_err(|_| Error::InvalidPageType {
        page: page_number,
        byte: 0,
    })?;
    let kind = PageKind::from_byte(type_byte).ok_or(Error::InvalidPageType {
        page: page_number,
        byte: type_byte,
    })?;
    let first_freeblock = cursor
        .read_u16::<BigEndian>()
        .map_err(|_| Error::InvalidPageType { page: page_number, byte: type_byte })?;
    let cell_count = cursor
        .read_u16::<BigEndian>()
        .map_err(|_| Error::InvalidPageType { page: page_number, byte: type_byte })?;
    let content_start = cursor
        .read_u16::<BigEndian>()
        .map_err(|_| Error::InvalidPageType { page: page_number, byte: type_byte })?;
    let fragmented_free_bytes = cursor
        .read_u8()
        .map_err(|_| Error::InvalidPageType { page: page_number, byte: type_byte })?;
    let rightmost_pointer = if kind.is_interior() {
        Some(
            cursor
                .read_u32::<BigEndian>()
                .map_err(|_| Error::MissingRightmostPointer(page_number))?,
        )
    } else {
        None
    };
    Ok(PageHeader {
        kind,
        first_freeblock,
        cell_count,
        content_start,
        fragmented_free_bytes,
        rightmost_pointer,
    })
}
