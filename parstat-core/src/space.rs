use crate::fragmentation::FragmentationReport;
use crate::snapshot::ArraySnapshot;
use crate::units::{block_bytes, percent};
use serde::Serialize;

/// Capacity accounting of one data disk against the shared parity.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiskSpace {
    pub max_by_space: u64,
    pub max_by_parity: u64,
    pub disk_block_max: u64,
    pub wasted_bytes: u64,
    pub free_blocks_equiv: u64,
    pub percent_used: u64,
}

/// The usable size of a disk is the smaller of its own space and the parity
/// space; any excess of the former is wasted.
pub fn account(
    disk_block_count: u64,
    disk_free_blocks: u64,
    shared_blockmax: u64,
    shared_parity_free_min: u64,
    block_size: u64,
) -> DiskSpace {
    let max_by_space = disk_block_count + disk_free_blocks;
    let max_by_parity = shared_blockmax + shared_parity_free_min;
    let (disk_block_max, wasted_bytes) = if max_by_space <= max_by_parity {
        (max_by_space, 0)
    } else {
        (max_by_parity, block_bytes(max_by_space - max_by_parity, block_size))
    };
    DiskSpace {
        max_by_space,
        max_by_parity,
        disk_block_max,
        wasted_bytes,
        free_blocks_equiv: disk_block_max.saturating_sub(disk_block_count),
        percent_used: percent(disk_block_count, disk_block_max),
    }
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct SpaceReport {
    pub disks: Vec<DiskSpace>,
    pub wasted_bytes: u64,
    pub free_blocks_equiv: u64,
    pub percent_used: u64,
    pub parity_free_min: u64,
    /// False until some parity level or disk reports free blocks.
    pub free_info_valid: bool,
    pub parity_size: u64,
    pub parity_size_max: u64,
}

impl SpaceReport {
    pub fn compute(snap: &ArraySnapshot, frag: &FragmentationReport) -> Self {
        let block_size = snap.block_size as u64;
        let blockmax = snap.blockmax as u64;
        let parity_free_min = snap.parity_free_min() as u64;

        let mut report = SpaceReport {
            parity_free_min,
            free_info_valid: snap.parity.iter().any(|p| p.free_blocks != 0)
                || snap.disks.iter().any(|d| d.free_blocks != 0),
            parity_size: block_bytes(blockmax, block_size),
            parity_size_max: block_bytes(blockmax + parity_free_min, block_size),
            ..Default::default()
        };
        for (disk, f) in snap.disks.iter().zip(&frag.disks) {
            let free = disk.free_blocks as u64;
            let s = account(f.block_count, free, blockmax, parity_free_min, block_size);
            report.wasted_bytes = report.wasted_bytes.saturating_add(s.wasted_bytes);
            report.free_blocks_equiv += s.free_blocks_equiv;
            report.disks.push(s);
        }
        let used = frag.totals.block_count;
        report.percent_used = percent(used, used + report.free_blocks_equiv);
        tracing::debug!(
            wasted = report.wasted_bytes,
            free_blocks = report.free_blocks_equiv,
            used_pct = report.percent_used,
            "space accounted"
        );
        report
    }
}
