//! Loading of sequence sets from FASTA/FASTQ files.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use needletail::parse_fastx_reader;
use needletail::sequence::complement;

/// Ordered collection of named sequences.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceSet {
    names: Vec<String>,
    seqs: Vec<Vec<u8>>,
}

impl SequenceSet {
    pub fn new(names: Vec<String>, seqs: Vec<Vec<u8>>) -> Self {
        assert_eq!(names.len(), seqs.len(), "Each sequence must have a name.");
        SequenceSet { names, seqs }
    }

    /// Read all records from a FASTA/FASTQ file, which may be compressed.
    pub fn from_fastx_file(seq_file: &Path) -> Result<Self> {
        let reader = File::open(seq_file)
            .with_context(|| format!("Failed to open {}", seq_file.display()))?;

        let mut fastx_reader = parse_fastx_reader(reader)
            .with_context(|| format!("Failed to parse {}", seq_file.display()))?;

        let mut set = SequenceSet::default();
        while let Some(rec) = fastx_reader.next() {
            let record = rec.with_context(|| format!("Invalid record in {}", seq_file.display()))?;
            set.names.push(seq_id(record.id()));
            set.seqs.push(record.seq().into_owned());
        }

        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn seqs(&self) -> &[Vec<u8>] {
        &self.seqs
    }

    /// Total number of bases across all sequences.
    pub fn num_bases(&self) -> u64 {
        self.seqs.iter().map(|seq| seq.len() as u64).sum()
    }

    /// Reverse complement of every sequence, in the same order as the set.
    pub fn reverse_complements(&self) -> Vec<Vec<u8>> {
        self.seqs.iter().map(|seq| reverse_complement(seq)).collect()
    }
}

/// Sequence identifier: the record header up to the first whitespace.
fn seq_id(header: &[u8]) -> String {
    let header = String::from_utf8_lossy(header);
    header.split_whitespace().next().unwrap_or_default().to_string()
}

/// Reverse complement of a sequence. Ambiguous bases map to themselves.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&base| complement(base)).collect()
}
