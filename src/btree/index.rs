//! Equality seek over an index b-tree (§4.4): descends in key-sorted
//! order, collecting the rowids of every cell whose key equals the target.

use std::cmp::Ordering;

use super::cell::{self, Cell};
use super::{header, Error, PageKind, RowId};
use crate::pager::{PageNum, Pager};
use crate::record;
use crate::value::Value;

/// Returns every rowid whose indexed key equals `target`. Rowid output
/// order is unspecified (§5).
pub fn seek(pager: &Pager, root: PageNum, target: &Value) -> Result<Vec<RowId>, Error> {
    let mut rowids = Vec::new();
    visit(pager, root, target, &mut rowids)?;
    Ok(rowids)
}

fn visit(pager: &Pager, page_number: PageNum, target: &Value, rowids: &mut Vec<RowId>) -> Result<(), Error> {
    let page = pager.get_page(page_number)?;
    let body_offset = super::body_offset(page_number);
    let page_header = header::parse(&page, body_offset, page_number)?;
    let pointers = cell::cell_pointers(&page, &page_header, body_offset, page_number)?;

    match page_header.kind {
        PageKind::LeafIndex => {
            for pointer in pointers {
                match cell::parse_cell(&page, pointer, PageKind::LeafIndex, page_number)? {
                    Cell::LeafIndex { payload } => {
                        let (key, rowid) = record::decode_index_entry(&payload, 1)?;
                        if key == *target {
                            rowids.push(rowid);
                        }
                    }
                    _ => unreachable!("parse_cell honors the requested kind"),
                }
            }
            Ok(())
        }
        PageKind::InteriorIndex => {
            let mut last_key_le_target = true;
            for pointer in &pointers {
                match cell::parse_cell(&page, *pointer, PageKind::InteriorIndex, page_number)? {
                    Cell::InteriorIndex { left_child, payload } => {
                        let (key, rowid) = record::decode_index_entry(&payload, 1)?;
                        match compare(&key, target) {
                            Some(Ordering::Equal) => {
                                rowids.push(rowid);
                                visit(pager, left_child, target, rowids)?;
                                last_key_le_target = true;
                            }
                            Some(Ordering::Greater) => {
                                visit(pager, left_child, target, rowids)?;
                                last_key_le_target = false;
                                break;
                            }
                            _ => {
                                last_key_le_target = true;
                            }
                        }
                    }
                    _ => unreachable!("parse_cell honors the requested kind"),
                }
            }
            if last_key_le_target {
                let rightmost = page_header
                    .rightmost_pointer
                    .ok_or(Error::MissingRightmostPointer(page_number))? as PageNum;
                visit(pager, rightmost, target, rowids)?;
            }
            Ok(())
        }
        other => Err(Error::InvalidPageType { page: page_number, byte: page_type_byte(other) }),
    }
}

/// Ordinary byte-string / numeric equality, not SQLite's collation-aware
/// comparison (§9 Design Notes: tests are restricted to cases where this
/// distinction does not arise).
fn compare(key: &Value, target: &Value) -> Option<Ordering> {
    key.partial_cmp(target)
}

fn page_type_byte(kind: PageKind) -> u8 {
    match kind {
        PageKind::InteriorIndex => 0x02,
        PageKind::InteriorTable => 0x05,
        PageKind::LeafIndex => 0x0a,
        PageKind::LeafTable => 0x0d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encodes one leaf-index cell: a text key plus a 1-byte integer rowid
    /// (`rowid` must fit in an i8, which is enough for these tests).
    fn build_cell(key: &str, rowid: i64) -> Vec<u8> {
        let key_serial = (13 + 2 * key.len()) as u8;
        let mut record = vec![3u8, key_serial, 1u8];
        record.extend_from_slice(key.as_bytes());
        record.push(rowid as i8 as u8);
        let payload_size = record.len() as u8;
        let mut cell = vec![payload_size];
        cell.extend(record);
        cell
    }

    /// Builds a two-page file: page 1 is a minimal leaf table page
    /// carrying the real database header, page 2 is a single leaf-index
    /// page holding `entries`. Cell placement order does not need to match
    /// key order since a leaf page scan checks every cell for equality.
    fn leaf_index_page_db(entries: &[(&str, i64)]) -> Vec<u8> {
        let page_size = 512usize;
        let cells: Vec<Vec<u8>> = entries.iter().map(|(k, r)| build_cell(k, *r)).collect();

        let mut page = vec![0u8; page_size];
        let mut offsets = Vec::with_capacity(cells.len());
        let mut end = page_size;
        for cell in &cells {
            end -= cell.len();
            page[end..end + cell.len()].copy_from_slice(cell);
            offsets.push(end as u16);
        }

        page[0] = 0x0a; // leaf index
        page[3..5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
        page[5..7].copy_from_slice(&(end as u16).to_be_bytes());
        for (i, offset) in offsets.iter().enumerate() {
            let at = 8 + i * 2;
            page[at..at + 2].copy_from_slice(&offset.to_be_bytes());
        }

        let mut db_header = vec![0u8; 100];
        db_header[0..16].copy_from_slice(b"SQLite format 3\0");
        db_header[16..18].copy_from_slice(&(page_size as u16).to_be_bytes());
        db_header[100] = 0x0d; // minimal empty leaf table page 1
        let mut file = db_header;
        file.extend_from_slice(&page);
        file
    }

    #[test]
    fn finds_all_rowids_matching_an_equal_key() {
        let bytes = leaf_index_page_db(&[("apple", 3), ("banana", 5), ("apple", 11)]);
        let path = std::env::temp_dir().join(format!("index_seek_test_{}.db", std::process::id()));
        std::fs::write(&path, &bytes).unwrap();
        let pager = Pager::open(&path).unwrap();
        let mut rowids = seek(&pager, 2, &Value::Text("apple".into())).unwrap();
        std::fs::remove_file(&path).ok();
        rowids.sort();
        assert_eq!(rowids, vec![3, 11]);
    }

    #[test]
    fn finds_nothing_for_an_absent_key() {
        let bytes = leaf_index_page_db(&[("apple", 3), ("banana", 5)]);
        let path = std::env::temp_dir().join(format!("index_seek_test2_{}.db", std::process::id()));
        std::fs::write(&path, &bytes).unwrap();
        let pager = Pager::open(&path).unwrap();
        let rowids = seek(&pager, 2, &Value::Text("cherry".into())).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(rowids.is_empty());
    }
}
