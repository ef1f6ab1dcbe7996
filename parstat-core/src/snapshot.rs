use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Hash algorithm identifiers carried by the array state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    #[default]
    Undefined,
    Murmur3,
    Spooky2,
    Metro,
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Murmur3 => write!(f, "murmur3"),
            Self::Spooky2 => write!(f, "spooky2"),
            Self::Metro => write!(f, "metro"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParityLevel {
    pub total_blocks: u32,
    pub free_blocks: u32,
}

/// Name of a parity level as used in the diagnostic stream (0-based level).
pub fn level_name(level: usize) -> String {
    match level {
        0 => "parity".to_string(),
        l => format!("{}-parity", l + 1),
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockAssignment {
    pub parity_pos: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FileEntry {
    #[serde(default)]
    pub path: String,
    pub size: u64,
    #[serde(default)]
    pub blocks: Vec<BlockAssignment>,
}

impl FileEntry {
    /// Build a file from a list of parity positions, mostly useful in tests.
    pub fn with_positions(size: u64, positions: &[u32]) -> Self {
        Self {
            path: String::new(),
            size,
            blocks: positions.iter().map(|&parity_pos| BlockAssignment { parity_pos }).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Disk {
    pub name: String,
    pub total_blocks: u32,
    pub free_blocks: u32,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Indices whose data changed on this disk since parity was last computed.
    #[serde(default)]
    pub invalid_parity: Vec<u32>,
}

/// Scrub metadata of one global block. Absence is `None` at the accessor level.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrubRecord {
    pub time: i64,
    pub bad: bool,
    pub rehash: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct InfoEntry {
    pub index: u32,
    pub time: i64,
    #[serde(default)]
    pub bad: bool,
    #[serde(default)]
    pub rehash: bool,
}

impl InfoEntry {
    pub fn record(&self) -> ScrubRecord {
        ScrubRecord {
            time: self.time,
            bad: self.bad,
            rehash: self.rehash,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ArraySnapshot {
    pub block_size: u32,
    #[serde(default)]
    pub hash: HashKind,
    #[serde(default)]
    pub prev_hash: HashKind,
    #[serde(default)]
    pub best_hash: HashKind,
    /// Highest allocated parity index across all levels.
    pub blockmax: u32,
    pub parity: Vec<ParityLevel>,
    pub disks: Vec<Disk>,
    #[serde(default)]
    pub info: Vec<InfoEntry>,
}

impl ArraySnapshot {
    /// Read and validate a JSON snapshot document.
    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("open {:?}", path))?;
        let snap: ArraySnapshot = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse snapshot {:?}", path))?;
        snap.validate()?;
        Ok(snap)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            bail!("block_size must be non-zero");
        }
        if self.parity.is_empty() {
            bail!("at least one parity level is required");
        }
        let mut names = HashSet::new();
        for d in &self.disks {
            if !names.insert(d.name.as_str()) {
                bail!("duplicate disk name: {:?}", d.name);
            }
        }
        let mut seen = HashSet::new();
        for e in &self.info {
            if e.index >= self.blockmax {
                bail!("info index {} beyond blockmax {}", e.index, self.blockmax);
            }
            if !seen.insert(e.index) {
                bail!("duplicate info entry for block {}", e.index);
            }
        }
        Ok(())
    }

    /// Smallest free-block count across parity levels; the binding parity constraint.
    pub fn parity_free_min(&self) -> u32 {
        self.parity.iter().map(|p| p.free_blocks).min().unwrap_or(0)
    }
}
