use crate::accessor::{BlockInfoAccessor, BlockSlotAccessor};
use crate::fragmentation::{self, FragmentationReport};
use crate::histogram::{self, ScrubHistogram, GRAPH_COLUMNS, GRAPH_ROWS};
use crate::localize::FluentLoc;
use crate::render::ReportRenderer;
use crate::snapshot::ArraySnapshot;
use crate::space::SpaceReport;
use crate::sync_scan::{self, SyncScan};
use anyhow::{bail, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Clone, Debug)]
pub struct StatusOptions {
    /// Reference time for scrub ages, unix seconds.
    pub now: i64,
    /// Emit one diagnostic line per block.
    pub gui: bool,
    pub columns: usize,
    pub rows: usize,
    pub lang: String,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            now: 0,
            gui: false,
            columns: GRAPH_COLUMNS,
            rows: GRAPH_ROWS,
            lang: "en-GB".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusOutcome {
    Reported,
    /// No block has scrub info yet; the report was shortened.
    Empty,
}

#[derive(Serialize, Clone, Debug)]
pub struct StatusSummary {
    pub fragmentation: FragmentationReport,
    pub space: SpaceReport,
    pub sync: SyncScan,
    pub histogram: Option<ScrubHistogram>,
}

impl StatusSummary {
    pub fn outcome(&self) -> StatusOutcome {
        if self.sync.informative_block_count != 0 {
            StatusOutcome::Reported
        } else {
            StatusOutcome::Empty
        }
    }
}

/// Run every analyzer over the snapshot.
pub fn summarize<A>(snap: &ArraySnapshot, blocks: &A, opts: &StatusOptions) -> StatusSummary
where
    A: BlockInfoAccessor + BlockSlotAccessor,
{
    let fragmentation = fragmentation::analyze(&snap.disks);
    let space = SpaceReport::compute(snap, &fragmentation);
    let mut sync = sync_scan::scan(blocks, snap.blockmax, opts.gui);
    let records = std::mem::take(&mut sync.records);
    let histogram = histogram::build(records, opts.now, opts.columns, opts.rows);
    if histogram.is_none() {
        tracing::warn!(blockmax = snap.blockmax, "no block has scrub info");
    }
    StatusSummary { fragmentation, space, sync, histogram }
}

/// Compute and print the status report to `out`, with diagnostics on `log`.
pub fn status<A, O, L>(
    snap: &ArraySnapshot,
    blocks: &A,
    opts: &StatusOptions,
    out: &mut O,
    log: &mut L,
) -> Result<StatusOutcome>
where
    A: BlockInfoAccessor + BlockSlotAccessor,
    O: Write,
    L: Write,
{
    if opts.columns == 0 || opts.rows == 0 {
        bail!(
            "scrub chart needs at least one column and one row, got {}x{}",
            opts.columns,
            opts.rows
        );
    }
    let loc = FluentLoc::builtin(&opts.lang)?;
    let summary = summarize(snap, blocks, opts);
    ReportRenderer::new(&loc, out, log).render(snap, &summary, opts.gui)?;
    let outcome = summary.outcome();
    tracing::info!(?outcome, disks = snap.disks.len(), "status report written");
    Ok(outcome)
}
