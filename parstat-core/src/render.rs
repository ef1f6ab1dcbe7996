//! Text report and diagnostic stream.
//!
//! Everything here formats values computed by the analyzers; nothing is
//! recomputed. The report goes to `out`, the `namespace:field:value` lines
//! go to `log`.

use crate::histogram::ScrubHistogram;
use crate::localize::FluentLoc;
use crate::snapshot::{level_name, ArraySnapshot};
use crate::status::StatusSummary;
use crate::sync_scan::{BlockView, SyncScan};
use crate::units::{block_gib, gib_tenths, percent, GIB};
use anyhow::Result;
use std::io::Write;

const TABLE_HEAD_1: &str = "   Files Fragmented Excess  Wasted  Used    Free  Use Name";
const TABLE_HEAD_2: &str = "            Files  Fragments GiB     GiB     GiB          ";
const TABLE_RULE: &str =
    " --------------------------------------------------------------------------";

fn flag(set: bool, name: &str) -> &str {
    if set {
        name
    } else {
        ""
    }
}

pub struct ReportRenderer<'a, O: Write, L: Write> {
    loc: &'a FluentLoc,
    out: &'a mut O,
    log: &'a mut L,
}

impl<'a, O: Write, L: Write> ReportRenderer<'a, O, L> {
    pub fn new(loc: &'a FluentLoc, out: &'a mut O, log: &'a mut L) -> Self {
        Self { loc, out, log }
    }

    /// Write the whole report. When no block carries scrub info, the report
    /// stops after the table and the scan summary with an "empty" notice.
    pub fn render(&mut self, snap: &ArraySnapshot, s: &StatusSummary, gui: bool) -> Result<()> {
        self.parity_log(snap)?;
        self.table(snap, s)?;
        self.totals_log(snap, s)?;
        self.scan_log(&s.sync, gui)?;

        if s.sync.informative_block_count == 0 {
            writeln!(self.out)?;
            writeln!(self.out, "{}", self.loc.msg("array-empty", &[]))?;
            self.out.flush()?;
            return Ok(());
        }

        if let Some(hist) = &s.histogram {
            self.info_log(hist)?;
            self.histogram(hist)?;
        }
        self.sync_state(&s.sync)?;
        self.rehash_state(snap, &s.sync)?;
        self.bad_blocks(&s.sync)?;
        self.out.flush()?;
        Ok(())
    }

    fn parity_log(&mut self, snap: &ArraySnapshot) -> Result<()> {
        writeln!(self.log, "summary:block_size:{}", snap.block_size)?;
        writeln!(self.log, "summary:parity_block_count:{}", snap.blockmax)?;
        for (l, p) in snap.parity.iter().enumerate() {
            let name = level_name(l);
            writeln!(self.log, "summary:parity_block_total:{}:{}", name, p.total_blocks)?;
            writeln!(self.log, "summary:parity_block_free:{}:{}", name, p.free_blocks)?;
        }
        writeln!(self.log, "summary:parity_block_free_min:{}", snap.parity_free_min())?;
        Ok(())
    }

    fn table(&mut self, snap: &ArraySnapshot, s: &StatusSummary) -> Result<()> {
        let block_size = snap.block_size as u64;
        writeln!(self.out, "{}", self.loc.msg("report-title", &[]))?;
        writeln!(self.out)?;
        writeln!(self.out, "{TABLE_HEAD_1}")?;
        writeln!(self.out, "{TABLE_HEAD_2}")?;

        let rows = snap.disks.iter().zip(&s.fragmentation.disks).zip(&s.space.disks);
        for ((disk, f), sp) in rows {
            let (w, wt) = gib_tenths(sp.wasted_bytes);
            writeln!(
                self.out,
                "{:8}{:8}{:8}{:6}.{}{:8}{:8} {:3}% {}",
                f.file_count,
                f.fragmented_file_count,
                f.excess_fragment_count,
                w,
                wt,
                f.total_file_size / GIB,
                block_gib(sp.free_blocks_equiv, block_size),
                sp.percent_used,
                disk.name
            )?;

            let n = &disk.name;
            writeln!(self.log, "summary:disk_file_count:{n}:{}", f.file_count)?;
            writeln!(self.log, "summary:disk_block_count:{n}:{}", f.block_count)?;
            let (frag, excess) = (f.fragmented_file_count, f.excess_fragment_count);
            writeln!(self.log, "summary:disk_fragmented_file_count:{n}:{frag}")?;
            writeln!(self.log, "summary:disk_excess_fragment_count:{n}:{excess}")?;
            writeln!(self.log, "summary:disk_file_size:{n}:{}", f.total_file_size)?;
            writeln!(self.log, "summary:disk_block_allocated:{n}:{}", f.block_allocated())?;
            writeln!(self.log, "summary:disk_block_total:{n}:{}", disk.total_blocks)?;
            writeln!(self.log, "summary:disk_block_free:{n}:{}", disk.free_blocks)?;
            writeln!(self.log, "summary:disk_block_max_by_space:{n}:{}", sp.max_by_space)?;
            writeln!(self.log, "summary:disk_block_max_by_parity:{n}:{}", sp.max_by_parity)?;
            writeln!(self.log, "summary:disk_block_max:{n}:{}", sp.disk_block_max)?;
        }

        let t = &s.fragmentation.totals;
        let (w, wt) = gib_tenths(s.space.wasted_bytes);
        writeln!(self.out, "{TABLE_RULE}")?;
        writeln!(
            self.out,
            "{:8}{:8}{:8}{:6}.{}{:8}{:8} {:3}%",
            t.file_count,
            t.fragmented_file_count,
            t.excess_fragment_count,
            w,
            wt,
            t.total_file_size / GIB,
            block_gib(s.space.free_blocks_equiv, block_size),
            s.space.percent_used
        )?;

        if !s.space.free_info_valid {
            writeln!(self.out)?;
            writeln!(self.out, "{}", self.loc.msg("warn-free-space", &[]))?;
        }
        Ok(())
    }

    fn totals_log(&mut self, snap: &ArraySnapshot, s: &StatusSummary) -> Result<()> {
        let t = &s.fragmentation.totals;
        writeln!(self.log, "summary:file_count:{}", t.file_count)?;
        writeln!(self.log, "summary:file_block_count:{}", t.block_count)?;
        writeln!(self.log, "summary:fragmented_file_count:{}", t.fragmented_file_count)?;
        writeln!(self.log, "summary:excess_fragment_count:{}", t.excess_fragment_count)?;
        writeln!(self.log, "summary:file_size:{}", t.total_file_size)?;
        writeln!(self.log, "summary:parity_size:{}", s.space.parity_size)?;
        writeln!(self.log, "summary:parity_size_max:{}", s.space.parity_size_max)?;
        writeln!(self.log, "summary:hash:{}", snap.hash)?;
        writeln!(self.log, "summary:prev_hash:{}", snap.prev_hash)?;
        writeln!(self.log, "summary:best_hash:{}", snap.best_hash)?;
        self.log.flush()?;
        Ok(())
    }

    fn scan_log(&mut self, scan: &SyncScan, gui: bool) -> Result<()> {
        writeln!(self.log, "block_count:{}", scan.blockmax)?;
        if gui {
            for b in &scan.blocks {
                self.block_line(b)?;
            }
        }
        writeln!(self.log, "summary:has_unsynced:{}", scan.unsynced_count)?;
        writeln!(self.log, "summary:has_rehash:{}", scan.rehash_pending_count)?;
        writeln!(
            self.log,
            "summary:has_bad:{}:{}:{}",
            scan.bad_count, scan.bad_first_index, scan.bad_last_index
        )?;
        self.log.flush()?;
        Ok(())
    }

    fn block_line(&mut self, b: &BlockView) -> Result<()> {
        let used = flag(b.used, "used");
        let unsynced = flag(b.unsynced, "unsynced");
        match b.record {
            Some(r) => writeln!(
                self.log,
                "block:{}:{}:{}:{}:{}:{}",
                b.index,
                r.time,
                used,
                unsynced,
                flag(r.bad, "bad"),
                flag(r.rehash, "rehash")
            )?,
            None => writeln!(self.log, "block_noinfo:{}:{}:{}", b.index, used, unsynced)?,
        }
        Ok(())
    }

    fn info_log(&mut self, hist: &ScrubHistogram) -> Result<()> {
        writeln!(self.log, "info_count:{}", hist.count)?;
        for (t, n) in &hist.time_runs {
            writeln!(self.log, "info_time:{t}:{n}")?;
        }
        self.log.flush()?;
        Ok(())
    }

    fn histogram(&mut self, hist: &ScrubHistogram) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out)?;
        for row in &hist.rows {
            match row.label {
                Some(pct) => write!(self.out, "{pct:3}%|")?,
                None => write!(self.out, "    |")?,
            }
            writeln!(self.out, "{}", row.glyphs)?;
        }
        let width = hist.buckets.len().saturating_sub(4);
        writeln!(
            self.out,
            "   {:3}{:^width$}{:3}",
            hist.day_oldest,
            self.loc.msg("scrub-axis", &[]),
            hist.day_newest
        )?;
        writeln!(self.out)?;

        let (o, m, n) = (
            hist.day_oldest.to_string(),
            hist.day_median.to_string(),
            hist.day_newest.to_string(),
        );
        let ages = self.loc.msg(
            "scrub-ages",
            &[("oldest", o.as_str()), ("median", m.as_str()), ("newest", n.as_str())],
        );
        writeln!(self.out, "{ages}")?;
        writeln!(self.out)?;
        Ok(())
    }

    fn sync_state(&mut self, scan: &SyncScan) -> Result<()> {
        if scan.unsynced_count == 0 {
            writeln!(self.out, "{}", self.loc.msg("sync-none", &[]))?;
            return Ok(());
        }
        let blockmax = scan.blockmax as u64;
        let pct = percent(blockmax.saturating_sub(scan.unsynced_count), blockmax).to_string();
        writeln!(self.out, "{}", self.loc.msg("sync-warning", &[]))?;
        writeln!(self.out, "{}", self.loc.msg("sync-progress", &[("percent", pct.as_str())]))?;
        Ok(())
    }

    fn rehash_state(&mut self, snap: &ArraySnapshot, scan: &SyncScan) -> Result<()> {
        let line = if scan.rehash_pending_count != 0 {
            let count = scan.informative_block_count;
            let pct = percent(count.saturating_sub(scan.rehash_pending_count), count).to_string();
            self.loc.msg("rehash-progress", &[("percent", pct.as_str())])
        } else if snap.best_hash != snap.hash {
            self.loc.msg("rehash-recommended", &[])
        } else {
            self.loc.msg("rehash-none", &[])
        };
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn bad_blocks(&mut self, scan: &SyncScan) -> Result<()> {
        if scan.bad_count == 0 {
            writeln!(self.out, "{}", self.loc.msg("bad-none", &[]))?;
            return Ok(());
        }
        let count = scan.bad_count.to_string();
        writeln!(self.out, "{}", self.loc.msg("bad-danger", &[("count", count.as_str())]))?;
        writeln!(self.out)?;

        let (first, last) = (scan.bad_first_index.to_string(), scan.bad_last_index.to_string());
        let range =
            self.loc.msg("bad-range", &[("first", first.as_str()), ("last", last.as_str())]);
        write!(self.out, "{range}")?;
        for i in &scan.bad_sample {
            write!(self.out, " {i}")?;
        }
        let rest = scan.bad_count.saturating_sub(scan.bad_sample.len() as u64);
        if rest > 0 {
            let more = rest.to_string();
            write!(self.out, " {}", self.loc.msg("bad-more", &[("more", more.as_str())]))?;
        }
        writeln!(self.out)?;
        writeln!(self.out)?;

        writeln!(self.out, "{}", self.loc.msg("bad-fix", &[]))?;
        writeln!(self.out, "{}", self.loc.msg("bad-clear", &[]))?;
        Ok(())
    }
}
