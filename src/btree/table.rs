//! Full-scan traversal of a table b-tree (§4.4): recursive depth-first,
//! left-to-right, yielding every row in rowid order.

use super::cell::{self, Cell};
use super::{header, Error, PageKind, RowId};
use crate::pager::{PageNum, Pager};

/// Visits every leaf record reachable from `root`, in cell-pointer order
/// within a page and left-to-right subtree order across pages. Returns
/// `(rowid, payload)` pairs; decoding the payload into a typed `Record` is
/// the record layer's job, not the walker's.
pub fn full_scan(pager: &Pager, root: PageNum) -> Result<Vec<(RowId, Vec<u8>)>, Error> {
    let mut rows = Vec::new();
    visit(pager, root, &mut rows)?;
    Ok(rows)
}

fn visit(pager: &Pager, page_number: PageNum, rows: &mut Vec<(RowId, Vec<u8>)>) -> Result<(), Error> {
    let page = pager.get_page(page_number)?;
    let body_offset = super::body_offset(page_number);
    let page_header = header::parse(&page, body_offset, page_number)?;
    let pointers = cell::cell_pointers(&page, &page_header, body_offset, page_number)?;

    match page_header.kind {
        PageKind::LeafTable => {
            for pointer in pointers {
                match cell::parse_cell(&page, pointer, PageKind::LeafTable, page_number)? {
                    Cell::LeafTable { rowid, payload } => rows.push((rowid, payload)),
                    _ => unreachable!("parse_cell honors the requested kind"),
                }
            }
            Ok(())
        }
        PageKind::InteriorTable => {
            for pointer in &pointers {
                match cell::parse_cell(&page, *pointer, PageKind::InteriorTable, page_number)? {
                    Cell::InteriorTable { left_child, .. } => visit(pager, left_child, rows)?,
                    _ => unreachable!("parse_cell honors the requested kind"),
                }
            }
            let rightmost = page_header
                .rightmost_pointer
                .ok_or(Error::MissingRightmostPointer(page_number))? as PageNum;
            visit(pager, rightmost, rows)
        }
        other => Err(Error::InvalidPageType { page: page_number, byte: page_type_byte(other) }),
    }
}

fn page_type_byte(kind: PageKind) -> u8 {
    match kind {
        PageKind::InteriorIndex => 0x02,
        PageKind::InteriorTable => 0x05,
        PageKind::LeafIndex => 0x0a,
        PageKind::LeafTable => 0x0d,
    }
}
