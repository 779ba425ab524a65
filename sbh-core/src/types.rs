use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The fixed nucleotide alphabet reads are drawn from
pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Index of the anchor read, the first read of the true assembly
pub const ANCHOR: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadSetError {
    #[error("Read set is empty")]
    Empty,

    #[error("Read length {0} is too short, at least 2 bases are required")]
    ReadTooShort(usize),

    #[error("Read {index} has length {found}, expected {expected}")]
    UnequalLength { index: usize, expected: usize, found: usize },

    #[error("Read {index} contains invalid base '{base}'")]
    InvalidBase { index: usize, base: char },

    #[error("Read {index} duplicates read {first}")]
    DuplicateRead { index: usize, first: usize },
}

pub type ReadSetResult<T> = Result<T, ReadSetError>;

/// Ordered set of distinct, equal-length reads over `{A, C, G, T}`.
///
/// Read 0 is the anchor every constructed path starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ReadSet {
    reads: Vec<String>,
    read_len: usize,
}

impl ReadSet {
    pub fn new(reads: Vec<String>) -> ReadSetResult<Self> {
        let read_len = reads.first().map(String::len).ok_or(ReadSetError::Empty)?;
        if read_len < 2 {
            return Err(ReadSetError::ReadTooShort(read_len));
        }

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(reads.len());
        for (index, read) in reads.iter().enumerate() {
            if read.len() != read_len {
                return Err(ReadSetError::UnequalLength {
                    index,
                    expected: read_len,
                    found: read.len(),
                });
            }
            if let Some(&base) = read.as_bytes().iter().find(|b| !NUCLEOTIDES.contains(b)) {
                return Err(ReadSetError::InvalidBase { index, base: base as char });
            }
            if let Some(&first) = seen.get(read.as_str()) {
                return Err(ReadSetError::DuplicateRead { index, first });
            }
            seen.insert(read.as_str(), index);
        }

        Ok(Self { reads, read_len })
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    /// Always false for a validated set, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Common length `k` of every read
    pub fn read_len(&self) -> usize {
        self.read_len
    }

    pub fn anchor(&self) -> &str {
        &self.reads[ANCHOR]
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.reads.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.reads.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for ReadSet {
    type Error = ReadSetError;

    fn try_from(reads: Vec<String>) -> ReadSetResult<Self> {
        Self::new(reads)
    }
}

impl From<ReadSet> for Vec<String> {
    fn from(set: ReadSet) -> Self {
        set.reads
    }
}
