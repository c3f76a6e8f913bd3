//! Tables mapping fixed-length k-mers to the facts gathered about them while counting.
//!
//! Keys are slices borrowed from the sequences being counted, so a table never copies a k-mer.
//! Two strategies are provided behind the `KmerStore` trait:
//! - `SparseKmerTable`: an ordered map with no empty slots, favouring memory over speed.
//! - `DenseKmerTable`: a hash map reserved up front from the expected number of k-mers,
//!   favouring speed over memory.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use log::warn;
use rustc_hash::FxHashMap;

/// Facts about a single distinct k-mer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KmerRecord {
    /// K-mer was observed in set A.
    pub present_in_a: bool,

    /// Sum of the weights of every occurrence of the k-mer in set B.
    pub weight_in_b: f64,
}

impl Default for KmerRecord {
    /// A newly observed k-mer is absent from A and carries no weight from B.
    fn default() -> Self {
        KmerRecord {
            present_in_a: false,
            weight_in_b: 0.0,
        }
    }
}

impl KmerRecord {
    /// Record an occurrence in A. Presence is never cleared once set.
    #[inline]
    pub fn mark_present_in_a(&mut self) {
        self.present_in_a = true;
    }

    /// Record an occurrence in B from a sequence with the given weight.
    #[inline]
    pub fn add_weight_in_b(&mut self, weight: f64) {
        self.weight_in_b += weight;
    }
}

/// Keyed storage of k-mer records, borrowing its keys for `'a`.
pub trait KmerStore<'a> {
    /// Create an empty table for k-mers of the given length with room for about `capacity` k-mers.
    ///
    /// The capacity is only a hint; tables grow as required.
    fn with_capacity(kmer_length: usize, capacity: usize) -> Self
    where
        Self: Sized;

    /// Length of the k-mers held by the table.
    fn kmer_length(&self) -> usize;

    /// Return the record for a k-mer, creating a default record if the k-mer has not been seen.
    fn get_or_create(&mut self, kmer: &'a [u8]) -> &mut KmerRecord;

    /// Return the record for a k-mer if it has been seen.
    fn get(&self, kmer: &[u8]) -> Option<&KmerRecord>;

    /// Number of distinct k-mers in the table.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all k-mers and their records in an unspecified order.
    fn iter(&self) -> impl Iterator<Item = (&[u8], &KmerRecord)>;
}

/// Supported table strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableType {
    Sparse,
    Dense,
}

impl FromStr for TableType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sparse" => Ok(TableType::Sparse),
            "dense" => Ok(TableType::Dense),
            _ => bail!("Unknown hash table type `{}`; expected `sparse` or `dense`", s),
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::Sparse => write!(f, "sparse"),
            TableType::Dense => write!(f, "dense"),
        }
    }
}

/// Memory-compact table backed by an ordered map.
#[derive(Clone, Debug, Default)]
pub struct SparseKmerTable<'a> {
    kmer_length: usize,
    records: BTreeMap<&'a [u8], KmerRecord>,
}

impl<'a> KmerStore<'a> for SparseKmerTable<'a> {
    fn with_capacity(kmer_length: usize, _capacity: usize) -> Self {
        // a B-tree allocates per node, so there is nothing to reserve up front
        SparseKmerTable {
            kmer_length,
            records: BTreeMap::new(),
        }
    }

    fn kmer_length(&self) -> usize {
        self.kmer_length
    }

    fn get_or_create(&mut self, kmer: &'a [u8]) -> &mut KmerRecord {
        debug_assert_eq!(kmer.len(), self.kmer_length);
        self.records.entry(kmer).or_default()
    }

    fn get(&self, kmer: &[u8]) -> Option<&KmerRecord> {
        self.records.get(kmer)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn iter(&self) -> impl Iterator<Item = (&[u8], &KmerRecord)> {
        self.records.iter().map(|(kmer, record)| (*kmer, record))
    }
}

/// Speed-optimised table backed by a hash map using the Fx hasher.
#[derive(Clone, Debug)]
pub struct DenseKmerTable<'a> {
    kmer_length: usize,
    records: FxHashMap<&'a [u8], KmerRecord>,
}

impl<'a> KmerStore<'a> for DenseKmerTable<'a> {
    fn with_capacity(kmer_length: usize, capacity: usize) -> Self {
        let mut records: FxHashMap<&'a [u8], KmerRecord> = FxHashMap::default();

        // an oversized hint only costs rehashing later, never the run
        if records.try_reserve(capacity).is_err() {
            warn!(
                "Unable to reserve space for {} k-mers; hash table will grow as k-mers are added.",
                capacity
            );
        }

        DenseKmerTable {
            kmer_length,
            records,
        }
    }

    fn kmer_length(&self) -> usize {
        self.kmer_length
    }

    fn get_or_create(&mut self, kmer: &'a [u8]) -> &mut KmerRecord {
        debug_assert_eq!(kmer.len(), self.kmer_length);
        self.records.entry(kmer).or_default()
    }

    fn get(&self, kmer: &[u8]) -> Option<&KmerRecord> {
        self.records.get(kmer)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn iter(&self) -> impl Iterator<Item = (&[u8], &KmerRecord)> {
        self.records.iter().map(|(kmer, record)| (*kmer, record))
    }
}
