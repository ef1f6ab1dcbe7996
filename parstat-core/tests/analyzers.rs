use parstat_core::accessor::{BlockSlotAccessor, SnapshotIndex};
use parstat_core::fragmentation::{analyze, analyze_disk, excess_fragments};
use parstat_core::snapshot::{ArraySnapshot, Disk, FileEntry, HashKind, InfoEntry, ParityLevel};
use parstat_core::space::{account, SpaceReport};
use parstat_core::sync_scan::{scan, BAD_LIST_LIMIT};

fn disk(name: &str, free_blocks: u32, files: Vec<FileEntry>, invalid: &[u32]) -> Disk {
    Disk {
        name: name.into(),
        total_blocks: 1000,
        free_blocks,
        files,
        invalid_parity: invalid.to_vec(),
    }
}

fn snapshot(blockmax: u32, disks: Vec<Disk>, info: Vec<InfoEntry>) -> ArraySnapshot {
    ArraySnapshot {
        block_size: 4096,
        hash: HashKind::Murmur3,
        prev_hash: HashKind::Undefined,
        best_hash: HashKind::Murmur3,
        blockmax,
        parity: vec![ParityLevel { total_blocks: 1000, free_blocks: 500 }],
        disks,
        info,
    }
}

fn info(index: u32, time: i64, bad: bool, rehash: bool) -> InfoEntry {
    InfoEntry { index, time, bad, rehash }
}

#[test]
fn consecutive_positions_are_not_fragmented() {
    assert_eq!(excess_fragments(&FileEntry::with_positions(0, &[5, 6, 7])), 0);
    assert_eq!(excess_fragments(&FileEntry::with_positions(0, &[5, 7, 8])), 1);
    assert_eq!(excess_fragments(&FileEntry::with_positions(0, &[5, 7, 9])), 2);
    assert_eq!(excess_fragments(&FileEntry::with_positions(0, &[42])), 0);
}

#[test]
fn fragmented_file_counted_once() {
    let d = disk(
        "d1",
        0,
        vec![
            FileEntry::with_positions(100, &[5, 7, 9]),
            FileEntry::with_positions(200, &[10, 11]),
            FileEntry::with_positions(300, &[]),
        ],
        &[],
    );
    let f = analyze_disk(&d);
    assert_eq!(f.file_count, 3);
    assert_eq!(f.fragmented_file_count, 1);
    assert_eq!(f.excess_fragment_count, 2);
    assert_eq!(f.block_count, 5);
    assert_eq!(f.total_file_size, 600);
    assert_eq!(f.latest_used_index, Some(11));
    assert_eq!(f.block_allocated(), 12);
}

#[test]
fn latest_used_is_max_position_not_last_block() {
    let d = disk("d1", 0, vec![FileEntry::with_positions(1, &[30, 2, 3])], &[]);
    assert_eq!(analyze_disk(&d).latest_used_index, Some(30));

    let empty = disk("d2", 0, vec![FileEntry::with_positions(0, &[])], &[]);
    let f = analyze_disk(&empty);
    assert_eq!(f.latest_used_index, None);
    assert_eq!(f.block_allocated(), 0);
}

#[test]
fn totals_sum_disks() {
    let disks = vec![
        disk("d1", 0, vec![FileEntry::with_positions(10, &[0, 2])], &[]),
        disk("d2", 0, vec![FileEntry::with_positions(20, &[1, 3, 4])], &[]),
    ];
    let r = analyze(&disks);
    assert_eq!(r.disks.len(), 2);
    assert_eq!(r.totals.file_count, 2);
    assert_eq!(r.totals.fragmented_file_count, 2);
    assert_eq!(r.totals.excess_fragment_count, 2);
    assert_eq!(r.totals.block_count, 5);
    assert_eq!(r.totals.total_file_size, 30);
}

#[test]
fn parity_bound_wastes_disk_space() {
    let s = account(100, 50, 100, 20, 4096);
    assert_eq!(s.max_by_space, 150);
    assert_eq!(s.max_by_parity, 120);
    assert_eq!(s.disk_block_max, 120);
    assert_eq!(s.wasted_bytes, 30 * 4096);
    assert_eq!(s.free_blocks_equiv, 20);
    assert_eq!(s.percent_used, 83);
}

#[test]
fn disk_bound_wastes_nothing() {
    let s = account(100, 10, 100, 20, 4096);
    assert_eq!(s.disk_block_max, 110);
    assert_eq!(s.wasted_bytes, 0);
    assert_eq!(s.free_blocks_equiv, 10);

    let equal = account(100, 20, 100, 20, 4096);
    assert_eq!(equal.wasted_bytes, 0);
    assert_eq!(equal.disk_block_max, 120);
}

#[test]
fn wasted_bytes_do_not_overflow() {
    let s = account(1 << 33, 0, 0, 0, 1 << 30);
    assert_eq!(s.wasted_bytes, 1 << 63);

    let huge = account(0, 4 * u32::MAX as u64, 0, 0, u32::MAX as u64);
    assert_eq!(huge.disk_block_max, 0);
    assert_eq!(huge.wasted_bytes, u64::MAX);
}

#[test]
fn empty_disk_reports_zero_percent() {
    let s = account(0, 0, 0, 0, 4096);
    assert_eq!(s.disk_block_max, 0);
    assert_eq!(s.percent_used, 0);
}

#[test]
fn space_report_uses_min_parity_free() {
    let mut snap = snapshot(
        10,
        vec![
            disk("d1", 100, vec![FileEntry::with_positions(1, &[0, 1, 2, 3])], &[]),
            disk("d2", 2, vec![FileEntry::with_positions(1, &[0, 1])], &[]),
        ],
        vec![],
    );
    snap.parity.push(ParityLevel { total_blocks: 1000, free_blocks: 5 });
    let frag = analyze(&snap.disks);
    let r = SpaceReport::compute(&snap, &frag);
    assert_eq!(r.parity_free_min, 5);
    // d1: space 104, parity 15 -> wasted 89 blocks, free 11
    assert_eq!(r.disks[0].wasted_bytes, 89 * 4096);
    assert_eq!(r.disks[0].free_blocks_equiv, 11);
    // d2: space 4, parity 15 -> bound by disk
    assert_eq!(r.disks[1].wasted_bytes, 0);
    assert_eq!(r.disks[1].free_blocks_equiv, 2);
    assert_eq!(r.wasted_bytes, 89 * 4096);
    assert_eq!(r.free_blocks_equiv, 13);
    assert_eq!(r.percent_used, 6 * 100 / 19);
    assert_eq!(r.parity_size, 10 * 4096);
    assert_eq!(r.parity_size_max, 15 * 4096);
    assert!(r.free_info_valid);
}

#[test]
fn free_info_invalid_when_all_zero() {
    let mut snap = snapshot(4, vec![disk("d1", 0, vec![], &[])], vec![]);
    snap.parity[0].free_blocks = 0;
    let r = SpaceReport::compute(&snap, &analyze(&snap.disks));
    assert!(!r.free_info_valid);
}

#[test]
fn unsynced_matches_across_disks() {
    // File on d1 at index 3, invalid parity flagged on d2 at the same index.
    let snap = snapshot(
        8,
        vec![
            disk("d1", 0, vec![FileEntry::with_positions(1, &[3])], &[]),
            disk("d2", 0, vec![], &[3, 6]),
        ],
        vec![],
    );
    let index = SnapshotIndex::new(&snap);
    assert!(index.block_slot(0, 3).has_file);
    assert!(!index.block_slot(0, 3).invalid_parity);
    assert!(index.block_slot(1, 3).invalid_parity);

    let s = scan(&index, snap.blockmax, false);
    // index 6 is invalid but nobody has a file there
    assert_eq!(s.unsynced_count, 1);
    assert!(s.blocks.is_empty());
}

#[test]
fn scan_counts_bad_and_rehash() {
    let snap = snapshot(
        10,
        vec![disk("d1", 0, vec![], &[])],
        vec![
            info(1, 100, false, true),
            info(4, 200, true, false),
            info(7, 300, true, true),
            info(9, 50, false, false),
        ],
    );
    let index = SnapshotIndex::new(&snap);
    let s = scan(&index, snap.blockmax, true);
    assert_eq!(s.informative_block_count, 4);
    assert_eq!(s.bad_count, 2);
    assert_eq!(s.bad_first_index, 4);
    assert_eq!(s.bad_last_index, 7);
    assert_eq!(s.bad_sample, vec![4, 7]);
    assert_eq!(s.rehash_pending_count, 2);
    assert_eq!(s.records.len(), 4);
    assert_eq!(s.records[0].time, 100);
    assert_eq!(s.blocks.len(), 10);
    assert!(s.blocks[0].record.is_none());
    assert_eq!(s.blocks[4].record.map(|r| r.bad), Some(true));
}

#[test]
fn record_at_time_zero_is_still_a_record() {
    let snap = snapshot(3, vec![disk("d1", 0, vec![], &[])], vec![info(0, 0, false, false)]);
    let s = scan(&SnapshotIndex::new(&snap), snap.blockmax, false);
    assert_eq!(s.informative_block_count, 1);
    assert_eq!(s.records[0].time, 0);
}

#[test]
fn bad_sample_is_capped() {
    let infos = (0..300).map(|i| info(i, 10, true, false)).collect();
    let snap = snapshot(300, vec![disk("d1", 0, vec![], &[])], infos);
    let s = scan(&SnapshotIndex::new(&snap), snap.blockmax, false);
    assert_eq!(s.bad_count, 300);
    assert_eq!(s.bad_sample.len(), BAD_LIST_LIMIT);
    assert_eq!(s.bad_sample[99], 99);
    assert_eq!(s.bad_last_index, 299);
}

#[test]
fn snapshot_validation_rejects_bad_input() {
    let mut snap = snapshot(4, vec![disk("d1", 0, vec![], &[]), disk("d1", 0, vec![], &[])], vec![]);
    assert!(snap.validate().is_err());

    snap.disks.pop();
    assert!(snap.validate().is_ok());

    snap.info = vec![info(4, 1, false, false)];
    assert!(snap.validate().is_err());

    snap.info = vec![info(1, 1, false, false), info(1, 2, false, false)];
    assert!(snap.validate().is_err());

    snap.info.clear();
    snap.block_size = 0;
    assert!(snap.validate().is_err());
}
