//! Manages pages from a SQLite 3 file, as defined at
//! <https://www.sqlite.org/fileformat.html>. Supports a read-only subset of
//! the format: only b-tree pages are ever requested, and the pager never
//! writes back to the file.
//!
//! Pages are loaded on demand and cached for the life of the query, since a
//! single invocation may revisit the same interior page while descending
//! into several children (schema lookup, then table scan, then index seek).

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::vfs::DbAttachment;

/// Page numbers are 1-based, matching SQLite's own numbering.
pub type PageNum = usize;

const MAX_PAGE_NUM: PageNum = 1_000_000;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("database file error: {0}")]
    Vfs(#[from] crate::vfs::Error),
    #[error("page number {0} is beyond what this engine supports")]
    PageNumberBeyondLimits(PageNum),
}

/// Returns the byte offset, within a page's own region, at which the
/// b-tree page body begins. Page 1 carries the 100-byte database header as
/// a prefix; every other page's body starts at offset 0.
pub fn body_offset(page_number: PageNum) -> usize {
    if page_number == 1 {
        crate::vfs::HEADER_BYTES
    } else {
        0
    }
}

pub struct Pager {
    db: RefCell<DbAttachment>,
    page_size: u32,
    cache: RefCell<HashMap<PageNum, Rc<Vec<u8>>>>,
}

impl Pager {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let mut db = DbAttachment::open(path)?;
        let header = db.read_header()?;
        Ok(Pager {
            db: RefCell::new(db),
            page_size: header.page_size,
            cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Reads a page, seeking to its absolute file offset on every cache
    /// miss. `page_number` is 1-based.
    pub fn get_page(&self, page_number: PageNum) -> Result<Rc<Vec<u8>>, Error> {
        if page_number == 0 || page_number > MAX_PAGE_NUM {
            return Err(Error::PageNumberBeyondLimits(page_number));
        }
        if let Some(cached) = self.cache.borrow().get(&page_number) {
            return Ok(Rc::clone(cached));
        }
        let offset = (page_number - 1) as u64 * self.page_size as u64;
        let mut buf = vec![0u8; self.page_size as usize];
        self.db.borrow_mut().read_at(offset, &mut buf)?;
        let page = Rc::new(buf);
        self.cache
            .borrow_mut()
            .insert(page_number, Rc::clone(&page));
        Ok(page)
    }
}
