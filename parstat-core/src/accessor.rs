use crate::snapshot::{ArraySnapshot, ScrubRecord};

/// State of one disk at one global block index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockSlot {
    pub has_file: bool,
    pub invalid_parity: bool,
}

/// Array-wide scrub metadata, addressed by global block index.
pub trait BlockInfoAccessor {
    /// `None` means the block was never scrubbed or is unused.
    fn scrub_record(&self, index: u32) -> Option<ScrubRecord>;
}

/// Per-disk slot state, addressed by disk position and global block index.
pub trait BlockSlotAccessor {
    fn disk_count(&self) -> usize;

    fn block_slot(&self, disk: usize, index: u32) -> BlockSlot;

    /// Whether any disk has a file at `index`, and whether any disk has an
    /// invalid-parity flag there. The two need not come from the same disk.
    fn cross_disk_state(&self, index: u32) -> (bool, bool) {
        let mut one_valid = false;
        let mut one_invalid = false;
        for d in 0..self.disk_count() {
            let slot = self.block_slot(d, index);
            one_valid |= slot.has_file;
            one_invalid |= slot.invalid_parity;
        }
        (one_valid, one_invalid)
    }
}

/// Dense lookup tables built once from a snapshot, covering [0, blockmax).
pub struct SnapshotIndex {
    slots: Vec<Vec<BlockSlot>>,
    info: Vec<Option<ScrubRecord>>,
}

impl SnapshotIndex {
    pub fn new(snap: &ArraySnapshot) -> Self {
        let n = snap.blockmax as usize;
        let slots = snap
            .disks
            .iter()
            .map(|disk| {
                let mut v = vec![BlockSlot::default(); n];
                for b in disk.files.iter().flat_map(|f| f.blocks.iter()) {
                    if let Some(s) = v.get_mut(b.parity_pos as usize) {
                        s.has_file = true;
                    }
                }
                for &i in &disk.invalid_parity {
                    if let Some(s) = v.get_mut(i as usize) {
                        s.invalid_parity = true;
                    }
                }
                v
            })
            .collect();
        let mut info = vec![None; n];
        for e in &snap.info {
            if let Some(slot) = info.get_mut(e.index as usize) {
                *slot = Some(e.record());
            }
        }
        Self { slots, info }
    }
}

impl BlockInfoAccessor for SnapshotIndex {
    fn scrub_record(&self, index: u32) -> Option<ScrubRecord> {
        self.info.get(index as usize).copied().flatten()
    }
}

impl BlockSlotAccessor for SnapshotIndex {
    fn disk_count(&self) -> usize {
        self.slots.len()
    }

    fn block_slot(&self, disk: usize, index: u32) -> BlockSlot {
        self.slots
            .get(disk)
            .and_then(|v| v.get(index as usize))
            .copied()
            .unwrap_or_default()
    }
}
