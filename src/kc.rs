//! This module computes the k-mer compression score of an assembly (set A) against a set of
//! reference sequences with known abundances (set B).
//!
//! It provides functionality to:
//! - Size and build a k-mer table of the configured type.
//! - Record which k-mers are present in A and how much abundance-weighted mass each carries in B.
//! - Reduce the table to the weighted k-mer recall, inverse compression rate, and k-mer
//!   compression score.
//!
//! The main entry point is the `kmer_compression` function.

use anyhow::{bail, Result};
use log::info;
use num_format::{Locale, ToFormattedString};

use crate::counting::{count_kmers_in_a, count_kmers_in_b, estimate_table_size};
use crate::kc_params::KcParams;
use crate::kmer_table::{DenseKmerTable, KmerStore, SparseKmerTable, TableType};
use crate::metrics::{kc_scores, KcScores};
use crate::seq_io::SequenceSet;

/// Calculate the k-mer compression score of A relative to B, where `weights` gives the
/// abundance of each sequence in B.
pub fn kmer_compression(
    a: &SequenceSet,
    b: &SequenceSet,
    weights: &[f64],
    params: &KcParams,
) -> Result<KcScores> {
    if weights.len() != b.len() {
        bail!(
            "Set B has {} sequences, but {} weights were provided",
            b.len(),
            weights.len()
        );
    }

    // reverse strands are only materialised when they will be scanned
    let (a_rc, b_rc) = if params.strand_specific() {
        (Vec::new(), Vec::new())
    } else {
        info!("Reverse complementing the sequences.");
        (a.reverse_complements(), b.reverse_complements())
    };

    let a_strands = Strands {
        forward: a.seqs(),
        reverse: &a_rc,
    };
    let b_strands = Strands {
        forward: b.seqs(),
        reverse: &b_rc,
    };

    let num_bases_in_a = a.num_bases();
    match params.table_type() {
        TableType::Sparse => kmer_compression_with::<SparseKmerTable>(
            a_strands,
            b_strands,
            weights,
            num_bases_in_a,
            params,
        ),
        TableType::Dense => kmer_compression_with::<DenseKmerTable>(
            a_strands,
            b_strands,
            weights,
            num_bases_in_a,
            params,
        ),
    }
}

/// Forward strands of a sequence set and, unless strand specific, their reverse complements.
#[derive(Clone, Copy)]
struct Strands<'a> {
    forward: &'a [Vec<u8>],
    reverse: &'a [Vec<u8>],
}

fn kmer_compression_with<'a, S: KmerStore<'a>>(
    a: Strands<'a>,
    b: Strands<'a>,
    weights: &[f64],
    num_bases_in_a: u64,
    params: &KcParams,
) -> Result<KcScores> {
    let k = params.k();
    let strand_specific = params.strand_specific();

    let max_entries = estimate_table_size(a.forward, b.forward, k, params.fudge_factor());
    info!(
        "Initializing the {} hash table with space for {} entries.",
        params.table_type(),
        max_entries.to_formatted_string(&Locale::en)
    );
    let mut table = S::with_capacity(k, max_entries);

    info!("Populating the hash table with {}-mers:", k);
    count_kmers_in_a(&mut table, a.forward, a.reverse, k, strand_specific)?;
    count_kmers_in_b(&mut table, b.forward, b.reverse, weights, k, strand_specific)?;
    info!(
        "Hash table contains {} entries.",
        table.len().to_formatted_string(&Locale::en)
    );

    info!("Computing k-mer recall, inverse compression rate, and k-mer compression score.");
    Ok(kc_scores(
        &table,
        num_bases_in_a,
        params.num_reads(),
        params.read_length(),
    ))
}
