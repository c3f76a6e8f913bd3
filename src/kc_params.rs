//! This module defines the `KcParams` struct, which encapsulates the parameters required to
//! compute the k-mer compression score: the k-mer length, whether only the forward strand is
//! counted, how the k-mer table is sized and implemented, and the read count and read length
//! that define the baseline for the inverse compression rate.

use anyhow::{bail, Result};

use crate::kmer_table::TableType;

/// Default divisor applied to the number of k-mer windows when sizing the k-mer table.
pub const DEFAULT_FUDGE_FACTOR: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct KcParams {
    kmer_length: usize,
    strand_specific: bool,
    table_type: TableType,
    fudge_factor: f64,
    num_reads: u64,
    read_length: u64,
}

impl KcParams {
    pub fn new(
        kmer_length: usize,
        strand_specific: bool,
        table_type: TableType,
        fudge_factor: f64,
        num_reads: u64,
        read_length: u64,
    ) -> Result<Self> {
        if kmer_length == 0 {
            bail!("K-mer length must be positive");
        }

        if !fudge_factor.is_finite() || fudge_factor <= 0.0 {
            bail!(
                "Hash table fudge factor must be a positive number, but is {}",
                fudge_factor
            );
        }

        Ok(KcParams {
            kmer_length,
            strand_specific,
            table_type,
            fudge_factor,
            num_reads,
            read_length,
        })
    }

    pub fn k(&self) -> usize {
        self.kmer_length
    }

    pub fn strand_specific(&self) -> bool {
        self.strand_specific
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn fudge_factor(&self) -> f64 {
        self.fudge_factor
    }

    pub fn num_reads(&self) -> u64 {
        self.num_reads
    }

    pub fn read_length(&self) -> u64 {
        self.read_length
    }
}
