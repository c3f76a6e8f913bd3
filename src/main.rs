//! Main entry point for the kmer-compression application.
//!
//! This file handles command-line parsing, logging setup, and input loading, and orchestrates the
//! computation of the k-mer compression score of an assembly against a set of reference sequences
//! weighted by their expression. The three resulting scores are written to standard output as
//! tab-separated name/value pairs; all other messages go to the log.

use std::env;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use num_format::{Locale, ToFormattedString};

use crate::cli::Cli;
use crate::expression::{read_rsem_abundances, weights_for};
use crate::kc::kmer_compression;
use crate::kc_params::KcParams;
use crate::logging::setup_logger;
use crate::seq_io::SequenceSet;

mod cli;
pub mod counting;
pub mod expression;
pub mod kc;
pub mod kc_params;
pub mod kmer_table;
pub mod logging;
pub mod metrics;
pub mod progress;
pub mod scan;
pub mod seq_io;

/// Common initialization required by all commands.
fn init() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    info!("{} v{}", env!("CARGO_PKG_NAME"), VERSION);
    info!("{}", env::args().collect::<Vec<String>>().join(" "));
}

/// Read a sequence set and report its size.
fn load_sequences(set: &str, seq_file: &Path) -> Result<SequenceSet> {
    info!("Reading set {} from {}.", set, seq_file.display());
    let seqs = SequenceSet::from_fastx_file(seq_file)?;
    if seqs.is_empty() {
        warn!("Set {} contains no sequences.", set);
    }

    info!(
        " - {} sequences with {} bases",
        seqs.len().to_formatted_string(&Locale::en),
        seqs.num_bases().to_formatted_string(&Locale::en)
    );

    Ok(seqs)
}

fn main() -> Result<()> {
    let start = Instant::now();

    let args = Cli::parse();

    setup_logger(args.log_file.as_deref())?;

    init();

    // k-mers default to the length of a read
    let kmer_length = match args.kmer_length {
        Some(k) => k,
        None => usize::try_from(args.readlen)
            .context("Read length is too large to use as a k-mer length")?,
    };

    let params = KcParams::new(
        kmer_length,
        args.strand_specific,
        args.hash_table_type,
        args.hash_table_fudge_factor,
        args.num_reads,
        args.readlen,
    )?;

    let a = load_sequences("A", &args.a_seqs)?;
    let b = load_sequences("B", &args.b_seqs)?;

    info!("Reading expression of set B from {}.", args.b_expr.display());
    let abundances = read_rsem_abundances(&args.b_expr)?;
    let weights = weights_for(&b, &abundances)?;

    let scores = kmer_compression(&a, &b, &weights, &params)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    scores.write_tsv(&mut writer)?;
    writer.flush()?;

    info!("Elapsed time (sec): {:.2}", start.elapsed().as_secs_f32());
    info!("Done.");

    Ok(())
}
