use log::{debug, info, warn};

use crate::domain::{Address, AddressBook, DateFilter, HeaderRecord, Upsert};
use crate::error::Result;
use crate::mail::HeaderSource;
use crate::mail::decoders::decode_header_block;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub blocks: usize,
    pub decoded: usize,
    pub malformed: usize,
    /// records dropped by the date filter
    pub filtered: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub book: AddressBook,
    pub stats: HarvestStats,
}

/// Fold one record into the book. Returns `false` if the date filter
/// rejected the record, in which case none of its pairs are merged.
pub fn merge(book: &mut AddressBook, record: HeaderRecord, filter: &DateFilter) -> bool {
    if !filter.admits(&record) {
        debug!("Skipping record dated {:?}: older than {:?}", record.date, filter.min_date);
        return false;
    }

    for (name, addr) in record.pairs {
        let Some(addr) = Address::normalize(&addr) else {
            continue;
        };
        let outcome = book.upsert(addr.clone(), name);
        if outcome != Upsert::Unchanged {
            debug!("{addr}: {outcome:?}");
        }
    }
    true
}

/// Fetch every header block from `source` and fold it into a fresh book.
///
/// Undecodable blocks are skipped with a warning. Any retrieval error aborts
/// the run and no partial book is returned.
pub fn harvest<S: HeaderSource>(mut source: S, filter: &DateFilter) -> Result<Harvest> {
    let blocks = source.fetch_headers(filter)?;

    let mut out = Harvest::default();
    out.stats.blocks = blocks.len();

    for block in blocks {
        match decode_header_block(&block) {
            Ok(record) => {
                out.stats.decoded += 1;
                if !merge(&mut out.book, record, filter) {
                    out.stats.filtered += 1;
                }
            }
            Err(e) => {
                out.stats.malformed += 1;
                warn!("Cannot decode message ({e}):\n{}", String::from_utf8_lossy(&block));
            }
        }
    }

    info!(
        "Harvested {} addresses from {} messages ({} malformed, {} too old)",
        out.book.len(),
        out.stats.blocks,
        out.stats.malformed,
        out.stats.filtered
    );
    Ok(out)
}
