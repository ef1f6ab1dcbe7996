//! Scrub-age distribution and its ASCII bar chart.
//!
//! Records are sorted by scrub time and split into equal-width time windows
//! between the oldest and the newest record. Each window becomes one chart
//! column; the chart approximates column heights with a full glyph (`*`) and
//! a half glyph (`+`), and the baseline row marks any non-empty column.

use crate::snapshot::ScrubRecord;
use crate::units::day_ago;
use serde::Serialize;

pub const GRAPH_COLUMNS: usize = 70;
pub const GRAPH_ROWS: usize = 15;

pub const GLYPH_FULL: char = '*';
pub const GLYPH_HALF: char = '+';
pub const GLYPH_BASE: char = '_';
pub const GLYPH_BLANK: char = ' ';

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct HistogramRow {
    /// Percentage label; `None` for unlabeled rows.
    pub label: Option<u64>,
    pub glyphs: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ScrubHistogram {
    pub count: u64,
    pub oldest: i64,
    pub median: i64,
    pub newest: i64,
    pub day_oldest: i64,
    pub day_median: i64,
    pub day_newest: i64,
    pub buckets: Vec<u64>,
    pub bar_max: u64,
    pub rows: Vec<HistogramRow>,
    /// `(time, n)` for each distinct scrub time, ascending.
    pub time_runs: Vec<(i64, u64)>,
}

/// Count sorted times into `columns` windows with closed upper limits.
///
/// A single cursor advances over `sorted`, so each time lands in exactly one
/// bucket. The last limit equals the newest time, so nothing is left over.
pub fn bucket_counts(sorted: &[i64], columns: usize) -> Vec<u64> {
    let mut buckets = vec![0u64; columns];
    let (Some(&oldest), Some(&newest)) = (sorted.first(), sorted.last()) else {
        return buckets;
    };
    let span = newest as i128 - oldest as i128;
    let mut pos = 0usize;
    for (k, bucket) in buckets.iter_mut().enumerate() {
        let limit = oldest as i128 + span * (k as i128 + 1) / columns as i128;
        while pos < sorted.len() && sorted[pos] as i128 <= limit {
            pos += 1;
            *bucket += 1;
        }
    }
    buckets
}

/// Render the glyph rows for the given bucket counts.
pub fn render_rows(buckets: &[u64], bar_max: u64, count: u64, rows: usize) -> Vec<HistogramRow> {
    let rows_u = rows as u64;
    (0..rows)
        .map(|y| {
            let label = if y == 0 {
                Some(bar_max * 100 / count.max(1))
            } else if y == rows - 1 {
                Some(0)
            } else if y == rows / 2 {
                Some(bar_max * 50 / count.max(1))
            } else {
                None
            };
            let pivot = bar_max * (rows_u - y as u64) / rows_u;
            let glyphs = buckets
                .iter()
                .map(|&b| {
                    if y == rows - 1 {
                        if b >= pivot {
                            GLYPH_FULL
                        } else if b > 0 {
                            GLYPH_HALF
                        } else {
                            GLYPH_BASE
                        }
                    } else {
                        let half_pivot = pivot.saturating_sub(bar_max / rows_u / 2);
                        if b >= pivot {
                            GLYPH_FULL
                        } else if b >= half_pivot {
                            GLYPH_HALF
                        } else {
                            GLYPH_BLANK
                        }
                    }
                })
                .collect();
            HistogramRow { label, glyphs }
        })
        .collect()
}

/// Build the histogram; `None` when there are no records.
///
/// Takes ownership of the record buffer, which is dropped before returning.
pub fn build(
    mut records: Vec<ScrubRecord>,
    now: i64,
    columns: usize,
    rows: usize,
) -> Option<ScrubHistogram> {
    if records.is_empty() || columns == 0 || rows == 0 {
        return None;
    }
    records.sort_by_key(|r| r.time);
    let times: Vec<i64> = records.iter().map(|r| r.time).collect();
    drop(records);

    let count = times.len() as u64;
    let oldest = times[0];
    let median = times[times.len() / 2];
    let newest = times[times.len() - 1];

    let mut time_runs: Vec<(i64, u64)> = Vec::new();
    for &t in &times {
        match time_runs.last_mut() {
            Some((last, n)) if *last == t => *n += 1,
            _ => time_runs.push((t, 1)),
        }
    }

    let buckets = bucket_counts(&times, columns);
    let bar_max = buckets.iter().copied().max().unwrap_or(0);
    let rows = render_rows(&buckets, bar_max, count, rows);

    Some(ScrubHistogram {
        count,
        oldest,
        median,
        newest,
        day_oldest: day_ago(oldest, now),
        day_median: day_ago(median, now),
        day_newest: day_ago(newest, now),
        buckets,
        bar_max,
        rows,
        time_runs,
    })
}
