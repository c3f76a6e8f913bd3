//! Command-line interface definition for the kmer-compression application.
//!
//! This file defines the `Cli` struct using the `clap` crate to parse and validate command-line
//! arguments. It includes options for specifying the assembly and reference sequences, the
//! expression estimates of the reference sequences, the read count and read length of the
//! sequencing data, and how k-mers are counted. Custom value parsers are provided for the k-mer
//! length, hash table type, and hash table fudge factor.
//! The CLI output is styled using the `anstyle` crate for improved readability.

use std::path::PathBuf;

use clap::Parser;

use crate::kc_params::DEFAULT_FUDGE_FACTOR;
use crate::kmer_table::TableType;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(styles=get_styles())]
#[command(disable_help_subcommand = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Assembly sequences (set A) in FASTA/FASTQ format
    #[arg(short = 'a', long, help_heading = "Inputs", value_parser = clap::value_parser!(PathBuf))]
    pub a_seqs: PathBuf,

    /// Reference sequences (set B) in FASTA/FASTQ format
    #[arg(short = 'b', long, help_heading = "Inputs", value_parser = clap::value_parser!(PathBuf))]
    pub b_seqs: PathBuf,

    /// Expression of the reference sequences, as produced by RSEM in *.isoforms.results
    #[arg(short = 'e', long, help_heading = "Inputs", value_parser = clap::value_parser!(PathBuf))]
    pub b_expr: PathBuf,

    /// Read length of the sequencing data used to build the assembly
    #[arg(
        long,
        help_heading = "Sequencing data",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub readlen: u64,

    /// Number of reads in the sequencing data used to build the assembly
    #[arg(
        long,
        help_heading = "Sequencing data",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub num_reads: u64,

    /// Length of k-mers to use [default: read length]
    #[arg(short, long, help_heading = "K-mer counting", value_parser = validate_kmer_length)]
    pub kmer_length: Option<usize>,

    /// Only count k-mers on the forward strand of each sequence
    #[arg(long, help_heading = "K-mer counting", default_value_t = false)]
    pub strand_specific: bool,

    /// Hash table implementation: 'sparse' uses less memory, 'dense' is faster
    #[arg(
        long,
        help_heading = "K-mer counting",
        default_value_t = TableType::Sparse,
        value_parser = validate_table_type
    )]
    pub hash_table_type: TableType,

    /// Expected number of k-mer windows per distinct k-mer, used to size the hash table
    #[arg(
        long,
        help_heading = "K-mer counting",
        default_value_t = DEFAULT_FUDGE_FACTOR,
        value_parser = validate_fudge_factor
    )]
    pub hash_table_fudge_factor: f64,

    /// Also write log messages to this file
    #[arg(long, value_parser = clap::value_parser!(PathBuf))]
    pub log_file: Option<PathBuf>,
}

fn validate_kmer_length(k: &str) -> Result<usize, String> {
    let k: usize = k
        .parse()
        .map_err(|_| format!("`{k}` isn't a valid k-mer length"))?;

    if k == 0 {
        return Err("k-mer length must be positive".to_string());
    }

    Ok(k)
}

fn validate_table_type(table_type: &str) -> Result<TableType, String> {
    table_type.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn validate_fudge_factor(fudge_factor: &str) -> Result<f64, String> {
    let fudge_factor: f64 = fudge_factor
        .parse()
        .map_err(|_| format!("`{fudge_factor}` isn't a valid number"))?;

    if !fudge_factor.is_finite() || fudge_factor <= 0.0 {
        return Err("hash table fudge factor must be positive".to_string());
    }

    Ok(fudge_factor)
}

fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}

#[test]
fn test_verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert()
}

#[test]
fn test_parse_args() {
    let args = Cli::try_parse_from([
        "kmer-compression", "-a", "A.fa", "-b", "B.fa", "-e", "B.isoforms.results",
        "--readlen", "76", "--num-reads", "1000",
    ])
    .unwrap();
    assert_eq!(args.readlen, 76);
    assert_eq!(args.num_reads, 1000);
    assert_eq!(args.kmer_length, None);
    assert!(!args.strand_specific);
    assert_eq!(args.hash_table_type, TableType::Sparse);
    assert_eq!(args.hash_table_fudge_factor, DEFAULT_FUDGE_FACTOR);

    let args = Cli::try_parse_from([
        "kmer-compression", "-a", "A.fa", "-b", "B.fa", "-e", "B.isoforms.results",
        "--readlen", "76", "--num-reads", "1000", "-k", "25", "--strand-specific",
        "--hash-table-type", "dense", "--hash-table-fudge-factor", "5",
    ])
    .unwrap();
    assert_eq!(args.kmer_length, Some(25));
    assert!(args.strand_specific);
    assert_eq!(args.hash_table_type, TableType::Dense);
    assert_eq!(args.hash_table_fudge_factor, 5.0);
}

#[test]
fn test_reject_invalid_args() {
    let base = [
        "kmer-compression", "-a", "A.fa", "-b", "B.fa", "-e", "B.isoforms.results",
        "--readlen", "76", "--num-reads", "1000",
    ];

    for extra in [
        ["--hash-table-type", "hopscotch"],
        ["--hash-table-fudge-factor", "0"],
        ["--kmer-length", "0"],
    ] {
        let args = base.iter().chain(extra.iter());
        assert!(Cli::try_parse_from(args).is_err());
    }
}

#[test]
fn test_reject_zero_read_length() {
    let args = Cli::try_parse_from([
        "kmer-compression", "-a", "A.fa", "-b", "B.fa", "-e", "B.isoforms.results",
        "--readlen", "0", "--num-reads", "1000",
    ]);
    assert!(args.is_err());
}
