//! Population of a k-mer table from the two sequence sets being compared.
//!
//! Set A contributes presence: every k-mer observed in A is flagged. Set B contributes weight:
//! every occurrence of a k-mer in a B sequence adds that sequence's weight to the k-mer. Unless
//! the run is strand specific, the reverse complement of every sequence is scanned as well.
//! Both updates are monotonic, so the passes may be run in either order.

use anyhow::{bail, Result};
use itertools::Itertools;

use crate::kmer_table::KmerStore;
use crate::progress::progress_bar_msg;
use crate::scan::valid_kmers;

/// Verify the reverse strands line up with the forward strands they were derived from.
fn check_reverse_strands(
    forward: &[Vec<u8>],
    reverse: &[Vec<u8>],
    strand_specific: bool,
    set: &str,
) -> Result<()> {
    if !strand_specific && forward.len() != reverse.len() {
        bail!(
            "Set {} has {} sequences, but {} reverse complements",
            set,
            forward.len(),
            reverse.len()
        );
    }

    Ok(())
}

/// Verify the table holds k-mers of the requested length.
fn check_kmer_length<'a, S: KmerStore<'a>>(table: &S, k: usize) -> Result<()> {
    if table.kmer_length() != k {
        bail!(
            "K-mer table holds {}-mers, but {}-mers were requested",
            table.kmer_length(),
            k
        );
    }

    Ok(())
}

/// Strands of sequence `i` to scan.
fn strands<'a>(
    forward: &'a [Vec<u8>],
    reverse: &'a [Vec<u8>],
    i: usize,
    strand_specific: bool,
) -> impl Iterator<Item = &'a [u8]> {
    let rc = if strand_specific { None } else { Some(reverse[i].as_slice()) };
    std::iter::once(forward[i].as_slice()).chain(rc)
}

/// Mark every k-mer in A, and in the reverse complement of A unless strand specific, as present.
pub fn count_kmers_in_a<'a, S: KmerStore<'a>>(
    table: &mut S,
    a: &'a [Vec<u8>],
    a_rc: &'a [Vec<u8>],
    k: usize,
    strand_specific: bool,
) -> Result<()> {
    check_kmer_length(table, k)?;
    check_reverse_strands(a, a_rc, strand_specific, "A")?;

    let progress_bar = progress_bar_msg(a.len() as u64);
    progress_bar.set_message("set A");
    for i in 0..a.len() {
        for strand in strands(a, a_rc, i, strand_specific) {
            for kmer in valid_kmers(strand, k) {
                table.get_or_create(kmer).mark_present_in_a();
            }
        }
        progress_bar.inc(1);
    }
    progress_bar.finish();

    Ok(())
}

/// Add the weight of each B sequence to every k-mer occurrence in it, and in its reverse
/// complement unless strand specific.
///
/// Occurrences are not deduplicated: a k-mer occurring `n` times in a sequence receives `n` times
/// the sequence's weight.
pub fn count_kmers_in_b<'a, S: KmerStore<'a>>(
    table: &mut S,
    b: &'a [Vec<u8>],
    b_rc: &'a [Vec<u8>],
    weights: &[f64],
    k: usize,
    strand_specific: bool,
) -> Result<()> {
    check_kmer_length(table, k)?;
    check_reverse_strands(b, b_rc, strand_specific, "B")?;

    if weights.len() != b.len() {
        bail!(
            "Set B has {} sequences, but {} weights were provided",
            b.len(),
            weights.len()
        );
    }

    let progress_bar = progress_bar_msg(b.len() as u64);
    progress_bar.set_message("set B");
    for (i, &weight) in (0..b.len()).zip_eq(weights) {
        for strand in strands(b, b_rc, i, strand_specific) {
            for kmer in valid_kmers(strand, k) {
                table.get_or_create(kmer).add_weight_in_b(weight);
            }
        }
        progress_bar.inc(1);
    }
    progress_bar.finish();

    Ok(())
}

/// Estimate the number of distinct k-mers in A and B.
///
/// Each sequence contributes its number of k-mer windows, doubled to account for the reverse
/// strand and divided by the fudge factor to account for k-mers shared between windows. A
/// sequence never contributes more than its number of windows, so fudge factors below one cannot
/// inflate the estimate past the number of k-mers actually present.
pub fn estimate_table_size(a: &[Vec<u8>], b: &[Vec<u8>], k: usize, fudge_factor: f64) -> usize {
    a.iter()
        .chain(b.iter())
        .filter(|seq| seq.len() >= k)
        .map(|seq| {
            let windows = (seq.len() + 1 - k).saturating_mul(2);
            ((0.5 + windows as f64 / fudge_factor) as usize).min(windows)
        })
        .fold(0, usize::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer_table::{DenseKmerTable, KmerRecord, SparseKmerTable};

    fn seqs(s: &[&str]) -> Vec<Vec<u8>> {
        s.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    fn sorted_records<'a, S: KmerStore<'a>>(table: &S) -> Vec<(Vec<u8>, KmerRecord)> {
        let mut records: Vec<(Vec<u8>, KmerRecord)> = table
            .iter()
            .map(|(kmer, record)| (kmer.to_vec(), *record))
            .collect();
        records.sort_by(|x, y| x.0.cmp(&y.0));
        records
    }

    fn present(weight_in_b: f64) -> KmerRecord {
        KmerRecord { present_in_a: true, weight_in_b }
    }

    fn absent(weight_in_b: f64) -> KmerRecord {
        KmerRecord { present_in_a: false, weight_in_b }
    }

    fn check_shared_kmers<'a, S: KmerStore<'a>>(a: &'a [Vec<u8>], b: &'a [Vec<u8>]) {
        let mut table = S::with_capacity(3, 4);
        count_kmers_in_a(&mut table, a, &[], 3, true).unwrap();
        count_kmers_in_b(&mut table, b, &[], &[1.0], 3, true).unwrap();

        assert_eq!(
            sorted_records(&table),
            vec![(b"ACG".to_vec(), present(1.0)), (b"CGT".to_vec(), present(1.0))]
        );
    }

    fn check_disjoint_kmers<'a, S: KmerStore<'a>>(a: &'a [Vec<u8>], b: &'a [Vec<u8>]) {
        let mut table = S::with_capacity(3, 4);
        count_kmers_in_a(&mut table, a, &[], 3, true).unwrap();
        count_kmers_in_b(&mut table, b, &[], &[2.0], 3, true).unwrap();

        assert_eq!(
            sorted_records(&table),
            vec![
                (b"ACG".to_vec(), absent(2.0)),
                (b"CGT".to_vec(), absent(2.0)),
                (b"TTT".to_vec(), present(0.0)),
            ]
        );
    }

    #[test]
    fn test_shared_kmers() {
        let a = seqs(&["ACGT"]);
        let b = seqs(&["ACGT"]);
        check_shared_kmers::<SparseKmerTable>(&a, &b);
        check_shared_kmers::<DenseKmerTable>(&a, &b);
    }

    #[test]
    fn test_disjoint_kmers() {
        let a = seqs(&["TTTT"]);
        let b = seqs(&["ACGT"]);
        check_disjoint_kmers::<SparseKmerTable>(&a, &b);
        check_disjoint_kmers::<DenseKmerTable>(&a, &b);
    }

    #[test]
    fn test_overlapping_occurrences_are_additive() {
        let b = seqs(&["AAAA", "AAN"]);
        let mut table = SparseKmerTable::with_capacity(2, 4);
        count_kmers_in_b(&mut table, &b, &[], &[0.5, 4.0], 2, true).unwrap();

        assert_eq!(sorted_records(&table), vec![(b"AA".to_vec(), absent(1.5 + 4.0))]);
    }

    #[test]
    fn test_both_strands() {
        let a = seqs(&["ACGT"]);
        let b = seqs(&["AAC"]);
        let a_rc = seqs(&["ACGT"]);
        let b_rc = seqs(&["GTT"]);

        let mut table = DenseKmerTable::with_capacity(3, 4);
        count_kmers_in_a(&mut table, &a, &a_rc, 3, false).unwrap();
        count_kmers_in_b(&mut table, &b, &b_rc, &[1.0], 3, false).unwrap();

        assert_eq!(
            sorted_records(&table),
            vec![
                (b"AAC".to_vec(), absent(1.0)),
                (b"ACG".to_vec(), present(0.0)),
                (b"CGT".to_vec(), present(0.0)),
                (b"GTT".to_vec(), absent(1.0)),
            ]
        );

        // a palindromic k-mer is counted once per strand
        let mut table = SparseKmerTable::with_capacity(4, 4);
        count_kmers_in_b(&mut table, &a, &a_rc, &[1.0], 4, false).unwrap();
        assert_eq!(sorted_records(&table), vec![(b"ACGT".to_vec(), absent(2.0))]);
    }

    #[test]
    fn test_strand_specific_ignores_reverse_strand() {
        let a = seqs(&["AAC"]);
        let a_rc = seqs(&["GTT"]);
        let mut table = SparseKmerTable::with_capacity(3, 4);
        count_kmers_in_a(&mut table, &a, &a_rc, 3, true).unwrap();
        assert_eq!(sorted_records(&table), vec![(b"AAC".to_vec(), present(0.0))]);
    }

    #[test]
    fn test_short_sequences_contribute_nothing() {
        let a = seqs(&["AC", ""]);
        let b = seqs(&["GT"]);
        let mut table = SparseKmerTable::with_capacity(3, 0);
        count_kmers_in_a(&mut table, &a, &a, 3, false).unwrap();
        count_kmers_in_b(&mut table, &b, &b, &[1.0], 3, false).unwrap();
        assert!(table.is_empty());
        assert_eq!(estimate_table_size(&a, &b, 3, 1.0), 0);
    }

    #[test]
    fn test_pass_order_is_irrelevant() {
        let a = seqs(&["ACGTTGCA", "GGNGGCCA"]);
        let b = seqs(&["TTGCANNACG", "CCAGG", "GGCC"]);
        let weights = [0.25, 1.0, 3.5];

        let mut a_then_b = SparseKmerTable::with_capacity(3, 0);
        count_kmers_in_a(&mut a_then_b, &a, &[], 3, true).unwrap();
        count_kmers_in_b(&mut a_then_b, &b, &[], &weights, 3, true).unwrap();

        let mut b_then_a = SparseKmerTable::with_capacity(3, 0);
        count_kmers_in_b(&mut b_then_a, &b, &[], &weights, 3, true).unwrap();
        count_kmers_in_a(&mut b_then_a, &a, &[], 3, true).unwrap();

        assert_eq!(sorted_records(&a_then_b), sorted_records(&b_then_a));

        // presence is never cleared by later passes
        count_kmers_in_b(&mut b_then_a, &b, &[], &weights, 3, true).unwrap();
        assert!(b_then_a.get(b"GCA").unwrap().present_in_a);
    }

    #[test]
    fn test_b_order_is_irrelevant() {
        let b = seqs(&["ACGTA", "CGTAC", "GTACG"]);
        let weights = [0.5, 0.25, 2.0];
        let mut forward = DenseKmerTable::with_capacity(3, 0);
        count_kmers_in_b(&mut forward, &b, &[], &weights, 3, true).unwrap();

        let b_rev: Vec<Vec<u8>> = b.iter().rev().cloned().collect();
        let weights_rev: Vec<f64> = weights.iter().rev().copied().collect();
        let mut reversed = DenseKmerTable::with_capacity(3, 0);
        count_kmers_in_b(&mut reversed, &b_rev, &[], &weights_rev, 3, true).unwrap();

        assert_eq!(sorted_records(&forward), sorted_records(&reversed));
    }

    #[test]
    fn test_weight_length_mismatch() {
        let b = seqs(&["ACGT", "TTTT"]);
        let mut table = SparseKmerTable::with_capacity(3, 0);
        let result = count_kmers_in_b(&mut table, &b, &[], &[1.0], 3, true);
        assert!(result.is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_reverse_strands() {
        let a = seqs(&["ACGT"]);
        let mut table = SparseKmerTable::with_capacity(3, 0);
        assert!(count_kmers_in_a(&mut table, &a, &[], 3, false).is_err());
        assert!(count_kmers_in_b(&mut table, &a, &[], &[1.0], 3, false).is_err());
        assert!(count_kmers_in_a(&mut table, &a, &[], 4, true).is_err());
    }

    #[test]
    fn test_estimate_table_size() {
        let a = seqs(&["ACGTACGT"]);
        let b = seqs(&["ACGTA", "AC"]);

        // A: 2 * 6 windows, B: 2 * 3 windows
        assert_eq!(estimate_table_size(&a, &b, 3, 1.0), 18);

        // 12 / 5 = 2.4 and 6 / 5 = 1.2 both round down
        assert_eq!(estimate_table_size(&a, &b, 3, 5.0), 3);

        // 12 / 8 = 1.5 rounds up, 6 / 8 = 0.75 rounds up
        assert_eq!(estimate_table_size(&a, &b, 3, 8.0), 3);
    }

    #[test]
    fn test_estimate_table_size_bounded_by_windows() {
        let a = seqs(&["ACGTACGT"]);
        let b = seqs(&["ACGTA", "AC"]);

        // a tiny fudge factor would otherwise request an unbounded number of slots
        assert_eq!(estimate_table_size(&a, &b, 3, 0.5), 18);
        assert_eq!(estimate_table_size(&a, &b, 3, 1e-300), 18);
        assert_eq!(estimate_table_size(&a, &b, 3, f64::MIN_POSITIVE), 18);

        let long = vec![b'A'; 1000];
        let many: Vec<Vec<u8>> = (0..100).map(|_| long.clone()).collect();
        assert_eq!(estimate_table_size(&many, &[], 25, 1e-300), 100 * 2 * 976);
    }
}
