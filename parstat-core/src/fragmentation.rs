use crate::snapshot::{Disk, FileEntry};
use serde::Serialize;

/// Fragmentation and usage counters for one disk, or for the whole array.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DiskFragmentation {
    pub file_count: u64,
    pub fragmented_file_count: u64,
    pub excess_fragment_count: u64,
    pub block_count: u64,
    pub total_file_size: u64,
    /// Highest parity position used by any block; `None` for a disk without blocks.
    pub latest_used_index: Option<u32>,
}

impl DiskFragmentation {
    /// Diagnostic count of allocated positions, `latest + 1`.
    pub fn block_allocated(&self) -> u64 {
        self.latest_used_index.map_or(0, |l| l as u64 + 1)
    }

    fn add(&mut self, other: &DiskFragmentation) {
        self.file_count += other.file_count;
        self.fragmented_file_count += other.fragmented_file_count;
        self.excess_fragment_count += other.excess_fragment_count;
        self.block_count += other.block_count;
        self.total_file_size += other.total_file_size;
        self.latest_used_index = self.latest_used_index.max(other.latest_used_index);
    }
}

#[derive(Serialize, Clone, Debug, Default)]
pub struct FragmentationReport {
    pub disks: Vec<DiskFragmentation>,
    pub totals: DiskFragmentation,
}

/// Number of breaks in the parity position sequence of one file.
pub fn excess_fragments(file: &FileEntry) -> u64 {
    file.blocks
        .windows(2)
        .filter(|w| w[0].parity_pos.wrapping_add(1) != w[1].parity_pos)
        .count() as u64
}

pub fn analyze_disk(disk: &Disk) -> DiskFragmentation {
    let mut out = DiskFragmentation::default();
    for file in &disk.files {
        out.file_count += 1;
        out.total_file_size += file.size;
        if file.blocks.is_empty() {
            continue;
        }
        let excess = excess_fragments(file);
        if excess > 0 {
            out.fragmented_file_count += 1;
            out.excess_fragment_count += excess;
        }
        out.block_count += file.blocks.len() as u64;
        let file_max = file.blocks.iter().map(|b| b.parity_pos).max();
        out.latest_used_index = out.latest_used_index.max(file_max);
    }
    out
}

pub fn analyze(disks: &[Disk]) -> FragmentationReport {
    let mut report = FragmentationReport::default();
    for disk in disks {
        let d = analyze_disk(disk);
        report.totals.add(&d);
        report.disks.push(d);
    }
    tracing::debug!(
        files = report.totals.file_count,
        fragmented = report.totals.fragmented_file_count,
        excess = report.totals.excess_fragment_count,
        "fragmentation analyzed"
    );
    report
}
