//! Reading of per-sequence abundance estimates.
//!
//! Abundances are read from the `*.isoforms.results` table written by RSEM. The weight of a
//! sequence is its relative abundance, `tau = TPM / 1e6`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::seq_io::SequenceSet;

const ID_COLUMN: &str = "transcript_id";
const TPM_COLUMN: &str = "TPM";

/// Relative abundance of each sequence, keyed by sequence name.
pub type Abundances = FxHashMap<String, f64>;

/// Parse an RSEM isoforms results file into relative abundances.
pub fn read_rsem_abundances(expr_file: &Path) -> Result<Abundances> {
    let file = File::open(expr_file)
        .with_context(|| format!("Failed to open {}", expr_file.display()))?;
    parse_rsem_abundances(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", expr_file.display()))
}

fn parse_rsem_abundances<R: BufRead>(reader: R) -> Result<Abundances> {
    let mut lines = reader.lines();

    let header = lines.next().ok_or_else(|| anyhow!("Expression file is empty"))??;
    let columns: Vec<&str> = header.trim_end().split('\t').collect();
    let column_idx = |name: &str| {
        columns
            .iter()
            .position(|&c| c == name)
            .ok_or_else(|| anyhow!("Expression file is missing the `{}` column", name))
    };
    let id_idx = column_idx(ID_COLUMN)?;
    let tpm_idx = column_idx(TPM_COLUMN)?;

    let mut abundances = Abundances::default();
    for (line_idx, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        // header is line 1
        let line_num = line_idx + 2;
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        if fields.len() != columns.len() {
            bail!(
                "Line {} has {} columns, but the header has {}",
                line_num,
                fields.len(),
                columns.len()
            );
        }

        let tpm: f64 = fields[tpm_idx]
            .parse()
            .with_context(|| format!("Invalid TPM `{}` on line {}", fields[tpm_idx], line_num))?;
        if !tpm.is_finite() || tpm < 0.0 {
            bail!("TPM on line {} must be a non-negative number, but is {}", line_num, tpm);
        }

        let id = fields[id_idx].to_string();
        if abundances.insert(id, tpm / 1e6).is_some() {
            bail!("Sequence `{}` is listed more than once", fields[id_idx]);
        }
    }

    Ok(abundances)
}

/// Weights for each sequence in the set, aligned with the set's order.
pub fn weights_for(seqs: &SequenceSet, abundances: &Abundances) -> Result<Vec<f64>> {
    let weights = seqs
        .names()
        .iter()
        .map(|name| {
            abundances
                .get(name)
                .copied()
                .ok_or_else(|| anyhow!("No expression value for sequence `{}`", name))
        })
        .collect::<Result<Vec<f64>>>()?;

    let num_unused = num_unused_abundances(seqs, abundances);
    if num_unused > 0 {
        warn!("Expression values for {} sequences not in set B were ignored.", num_unused);
    }

    Ok(weights)
}

/// Number of abundance entries naming no sequence in the set.
fn num_unused_abundances(seqs: &SequenceSet, abundances: &Abundances) -> usize {
    let names: FxHashSet<&str> = seqs.names().iter().map(String::as_str).collect();
    abundances
        .keys()
        .filter(|id| !names.contains(id.as_str()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::NamedTempFile;

    const RSEM: &str = concat!(
        "transcript_id\tgene_id\tlength\teffective_length\texpected_count\tTPM\tFPKM\tIsoPct\n",
        "tx1\tg1\t100\t50.00\t10.00\t250000.00\t100.00\t100.00\n",
        "tx2\tg2\t200\t150.00\t30.00\t750000.00\t300.00\t100.00\n"
    );

    #[test]
    fn test_read_rsem_abundances() -> Result<()> {
        let expr_file = NamedTempFile::new()?;
        write(expr_file.path(), RSEM)?;

        let abundances = read_rsem_abundances(expr_file.path())?;
        assert_eq!(abundances.len(), 2);
        assert_eq!(abundances["tx1"], 0.25);
        assert_eq!(abundances["tx2"], 0.75);

        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let result = parse_rsem_abundances("transcript_id\tFPKM\ntx1\t1.0\n".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_rows() {
        assert!(parse_rsem_abundances("".as_bytes()).is_err());
        assert!(parse_rsem_abundances("transcript_id\tTPM\ntx1\tabc\n".as_bytes()).is_err());
        assert!(parse_rsem_abundances("transcript_id\tTPM\ntx1\t-1\n".as_bytes()).is_err());
        assert!(parse_rsem_abundances("transcript_id\tTPM\ntx1\t1\t2\n".as_bytes()).is_err());
        assert!(parse_rsem_abundances("transcript_id\tTPM\ntx1\t1\ntx1\t2\n".as_bytes()).is_err());
    }

    #[test]
    fn test_blank_lines_skipped() -> Result<()> {
        let table = "transcript_id\tTPM\n\ntx1\t1000000\n\n";
        let abundances = parse_rsem_abundances(table.as_bytes())?;
        assert_eq!(abundances["tx1"], 1.0);
        Ok(())
    }

    #[test]
    fn test_weights_for() -> Result<()> {
        let abundances = parse_rsem_abundances(RSEM.as_bytes())?;

        let set = SequenceSet::new(
            vec!["tx2".to_string(), "tx1".to_string()],
            vec![b"ACGT".to_vec(), b"GGCC".to_vec()],
        );
        assert_eq!(weights_for(&set, &abundances)?, vec![0.75, 0.25]);

        let set = SequenceSet::new(vec!["tx2".to_string()], vec![b"ACGT".to_vec()]);
        assert_eq!(weights_for(&set, &abundances)?, vec![0.75]);

        let set = SequenceSet::new(vec!["tx3".to_string()], vec![b"ACGT".to_vec()]);
        assert!(weights_for(&set, &abundances).is_err());

        Ok(())
    }

    #[test]
    fn test_num_unused_abundances() -> Result<()> {
        let abundances = parse_rsem_abundances(RSEM.as_bytes())?;

        let set = SequenceSet::new(
            vec!["tx1".to_string(), "tx2".to_string()],
            vec![b"ACGT".to_vec(), b"GGCC".to_vec()],
        );
        assert_eq!(num_unused_abundances(&set, &abundances), 0);

        // a name repeated in the set must not hide the entry it leaves unused
        let set = SequenceSet::new(
            vec!["tx1".to_string(), "tx1".to_string()],
            vec![b"ACGT".to_vec(), b"GGCC".to_vec()],
        );
        assert_eq!(weights_for(&set, &abundances)?, vec![0.25, 0.25]);
        assert_eq!(num_unused_abundances(&set, &abundances), 1);

        let set = SequenceSet::new(Vec::new(), Vec::new());
        assert_eq!(num_unused_abundances(&set, &abundances), 2);

        Ok(())
    }
}
