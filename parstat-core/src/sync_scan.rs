use crate::accessor::{BlockInfoAccessor, BlockSlotAccessor};
use crate::snapshot::ScrubRecord;
use serde::Serialize;

/// How many bad indices are kept for the inline listing.
pub const BAD_LIST_LIMIT: usize = 100;

/// Per-index view for the GUI diagnostic lines.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockView {
    pub index: u32,
    pub used: bool,
    pub unsynced: bool,
    pub record: Option<ScrubRecord>,
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct SyncScan {
    pub blockmax: u32,
    pub unsynced_count: u64,
    pub bad_count: u64,
    pub bad_first_index: u32,
    pub bad_last_index: u32,
    /// The first `BAD_LIST_LIMIT` bad indices, ascending.
    pub bad_sample: Vec<u32>,
    pub rehash_pending_count: u64,
    pub informative_block_count: u64,
    /// Present records in index order; input of the histogram builder.
    #[serde(skip)]
    pub records: Vec<ScrubRecord>,
    /// Filled only when a detailed scan was requested.
    #[serde(skip)]
    pub blocks: Vec<BlockView>,
}

pub fn scan<A>(blocks: &A, blockmax: u32, detail: bool) -> SyncScan
where
    A: BlockInfoAccessor + BlockSlotAccessor,
{
    let mut out = SyncScan { blockmax, ..Default::default() };
    if detail {
        out.blocks.reserve(blockmax as usize);
    }
    for i in 0..blockmax {
        let (one_valid, one_invalid) = blocks.cross_disk_state(i);
        if one_valid && one_invalid {
            out.unsynced_count += 1;
        }

        let record = blocks.scrub_record(i);
        if let Some(r) = record {
            out.informative_block_count += 1;
            if r.bad {
                if out.bad_count == 0 {
                    out.bad_first_index = i;
                }
                out.bad_last_index = i;
                out.bad_count += 1;
                if out.bad_sample.len() < BAD_LIST_LIMIT {
                    out.bad_sample.push(i);
                }
            }
            if r.rehash {
                out.rehash_pending_count += 1;
            }
            out.records.push(r);
        }

        if detail {
            out.blocks.push(BlockView {
                index: i,
                used: one_valid,
                unsynced: one_invalid,
                record,
            });
        }
    }
    tracing::debug!(
        blockmax,
        unsynced = out.unsynced_count,
        bad = out.bad_count,
        rehash = out.rehash_pending_count,
        informative = out.informative_block_count,
        "sync state scanned"
    );
    out
}
