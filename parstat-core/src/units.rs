pub const GIB: u64 = 1024 * 1024 * 1024;
pub const SECS_PER_DAY: i64 = 24 * 3600;

/// Integer percentage, `0` when `total` is zero.
pub fn percent(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (part as u128 * 100 / total as u128) as u64
}

/// Whole days between `time` and `now`, truncated toward zero.
pub fn day_ago(time: i64, now: i64) -> i64 {
    // |now - time| < 2^64, so the day count always fits back into i64
    ((now as i128 - time as i128) / SECS_PER_DAY as i128) as i64
}

/// Size in bytes of `blocks` blocks, saturating at `u64::MAX`.
pub fn block_bytes(blocks: u64, block_size: u64) -> u64 {
    u64::try_from(blocks as u128 * block_size as u128).unwrap_or(u64::MAX)
}

/// Whole GiB held by `blocks` blocks, saturating at `u64::MAX`.
pub fn block_gib(blocks: u64, block_size: u64) -> u64 {
    u64::try_from(blocks as u128 * block_size as u128 / GIB as u128).unwrap_or(u64::MAX)
}

/// Whole GiB and the first decimal digit, both truncated.
pub fn gib_tenths(bytes: u64) -> (u64, u64) {
    (bytes / GIB, (bytes % GIB) * 10 / GIB)
}
