//! Reads the cell pointer array and decodes individual cell bodies.
//! Cell pointers are stored in key order and are offsets into the page's
//! own byte range (not the file, and not adjusted for the page's body
//! offset — §4.3).

use byteorder::{BigEndian, ReadBytesExt};

use super::header::PageHeader;
use super::{Error, PageKind, RowId};
use crate::pager::PageNum;
use crate::varint;

/// A decoded cell. Leaf cells carry an owned copy of their payload bytes;
/// interior cells carry only the child pointer (and, for table interiors,
/// the separator key).
#[derive(Debug, Clone)]
pub enum Cell {
    LeafTable { rowid: RowId, payload: Vec<u8> },
    InteriorTable { left_child: PageNum, key: RowId },
    LeafIndex { payload: Vec<u8> },
    InteriorIndex { left_child: PageNum, payload: Vec<u8> },
}

/// Reads the `cell_count` 16-bit big-endian cell pointers that follow the
/// page header, returning each as an absolute offset into `page`. A
/// corrupted `cell_count` large enough to run the pointer array past the
/// end of the page is a decode failure, not a panic.
pub fn cell_pointers(
    page: &[u8],
    header: &PageHeader,
    body_offset: usize,
    page_number: PageNum,
) -> Result<Vec<usize>, Error> {
    let start = body_offset + header.size();
    let end = start + header.cell_count as usize * 2;
    if end > page.len() {
        return Err(Error::CellPointerArrayOutOfBounds { page: page_number });
    }
    Ok((0..header.cell_count as usize)
        .map(|i| {
            let at = start + i * 2;
            (&page[at..at + 2]).read_u16::<BigEndian>().unwrap() as usize
        })
        .collect())
}

/// Decodes the cell at `pointer` (an absolute offset into `page`, as
/// returned by `cell_pointers`).
pub fn parse_cell(
    page: &[u8],
    pointer: usize,
    kind: PageKind,
    page_number: PageNum,
) -> Result<Cell, Error> {
    if pointer >= page.len() {
        return Err(Error::CellPointerOutOfBounds { page: page_number, pointer });
    }
    let bytes = &page[pointer..];
    match kind {
        PageKind::LeafTable => {
            let (payload_size, n1) = varint::read(bytes)?;
            let (rowid, n2) = varint::read(&bytes[n1..])?;
            let consumed = n1 + n2;
            let payload = read_payload(bytes, consumed, payload_size, page_number)?;
            Ok(Cell::LeafTable { rowid: rowid as RowId, payload })
        }
        PageKind::InteriorTable => {
            let (left_child, offset) = read_left_child(bytes, page_number, pointer)?;
            let (key, _) = varint::read(&bytes[offset..])?;
            Ok(Cell::InteriorTable { left_child, key: key as RowId })
        }
        PageKind::LeafIndex => {
            let (payload_size, n1) = varint::read(bytes)?;
            let payload = read_payload(bytes, n1, payload_size, page_number)?;
            Ok(Cell::LeafIndex { payload })
        }
        PageKind::InteriorIndex => {
            let (left_child, offset) = read_left_child(bytes, page_number, pointer)?;
            let (payload_size, n1) = varint::read(&bytes[offset..])?;
            let payload = read_payload(&bytes[offset..], n1, payload_size, page_number)?;
            Ok(Cell::InteriorIndex { left_child, payload })
        }
    }
}

/// Reads the 4-byte big-endian child pointer that leads every interior
/// cell, the way `read_payload` below checks a leaf cell's declared length
/// before slicing: a cell pointer that lands within 4 bytes of the page end
/// is a decode failure (§3's cell-pointer invariant), not a panic.
fn read_left_child(bytes: &[u8], page_number: PageNum, pointer: usize) -> Result<(PageNum, usize), Error> {
    if bytes.len() < 4 {
        return Err(Error::InteriorCellTruncated {
            page: page_number,
            pointer,
            needed: 4,
            available: bytes.len(),
        });
    }
    let left_child = (&bytes[0..4]).read_u32::<BigEndian>().unwrap() as PageNum;
    Ok((left_child, 4))
}

fn read_payload(
    bytes: &[u8],
    consumed: usize,
    payload_size: u64,
    page_number: PageNum,
) -> Result<Vec<u8>, Error> {
    let available = bytes.len() - consumed;
    if payload_size as usize > available {
        return Err(Error::Overflow {
            page: page_number,
            declared: payload_size,
            available,
        });
    }
    Ok(bytes[consumed..consumed + payload_size as usize].to_vec())
}
