//! Reduction of a populated k-mer table to the k-mer compression score and its components.
//!
//! Degenerate denominators (no weight in B, or a zero read count or read length) are not
//! special-cased: the affected ratio is NaN or infinite and is reported as such.

use std::io::Write;

use anyhow::Result;
use log::warn;

use crate::kmer_table::KmerStore;

/// Scores describing how well set A reproduces the content of set B.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KcScores {
    pub weighted_kmer_recall: f64,
    pub inverse_compression_rate: f64,
    pub kmer_compression_score: f64,
}

impl KcScores {
    pub fn new(weighted_kmer_recall: f64, inverse_compression_rate: f64) -> Self {
        KcScores {
            weighted_kmer_recall,
            inverse_compression_rate,
            kmer_compression_score: weighted_kmer_recall - inverse_compression_rate,
        }
    }

    /// Write scores as `name<TAB>value` lines.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "weighted_kmer_recall\t{}", self.weighted_kmer_recall)?;
        writeln!(writer, "inverse_compression_rate\t{}", self.inverse_compression_rate)?;
        writeln!(writer, "kmer_compression_score\t{}", self.kmer_compression_score)?;

        Ok(())
    }
}

/// Fraction of the weight in B carried by k-mers that are also present in A.
pub fn weighted_kmer_recall<'a, S: KmerStore<'a>>(table: &S) -> f64 {
    let mut numer = 0.0;
    let mut denom = 0.0;
    for (_, record) in table.iter() {
        if record.present_in_a {
            numer += record.weight_in_b;
        }
        denom += record.weight_in_b;
    }

    if denom == 0.0 {
        warn!("Set B carries no k-mer weight; weighted k-mer recall is undefined.");
    }

    numer / denom
}

/// Number of bases in A relative to the number of bases in the reads.
pub fn inverse_compression_rate(num_bases_in_a: u64, num_reads: u64, read_length: u64) -> f64 {
    let num_read_bases = num_reads as f64 * read_length as f64;
    if num_read_bases == 0.0 {
        warn!("Read count or read length is zero; inverse compression rate is undefined.");
    }

    num_bases_in_a as f64 / num_read_bases
}

/// Compute all scores for a populated k-mer table.
pub fn kc_scores<'a, S: KmerStore<'a>>(
    table: &S,
    num_bases_in_a: u64,
    num_reads: u64,
    read_length: u64,
) -> KcScores {
    KcScores::new(
        weighted_kmer_recall(table),
        inverse_compression_rate(num_bases_in_a, num_reads, read_length),
    )
}
