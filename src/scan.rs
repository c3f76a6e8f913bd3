//! Enumeration of the k-mer windows in a sequence that contain no ambiguous base.
//!
//! Windows are validated incrementally: once the window starting at `o` is known to be free of
//! ambiguous bases, the window starting at `o + 1` shares all but its last base with it, so only
//! that base needs to be inspected. A full window scan is only needed at the start of a sequence
//! and after an ambiguous base has been skipped, which keeps a scan over a sequence linear in its
//! length rather than proportional to `len * k`.

/// Returns true if the base is an unresolved nucleotide.
#[inline]
pub fn is_ambiguous(base: u8) -> bool {
    base == b'N' || base == b'n'
}

/// Position of the scanner within a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// The first `k - 1` bases of the window at this offset are known to be unambiguous.
    CheckLastBase(usize),

    /// Nothing is known about the window at this offset.
    ValidateWindow(usize),

    /// An ambiguous base was found at this absolute position; every window covering it is invalid.
    SkipAmbiguous(usize),
}

/// Find the first offset `>= start` whose k-mer contains no ambiguous base.
///
/// `end` is one past the last valid k-mer start, i.e. `seq.len() + 1 - k`, and is returned if no
/// such offset exists. When `at_beginning` is false the caller guarantees that
/// `seq[start..start + k - 1]` has already been checked, so only the last base of the window at
/// `start` is examined before falling back to a full window check.
pub fn skip_ambiguous(seq: &[u8], start: usize, end: usize, k: usize, at_beginning: bool) -> usize {
    let mut state = if at_beginning {
        ScanState::ValidateWindow(start)
    } else {
        ScanState::CheckLastBase(start)
    };

    loop {
        state = match state {
            ScanState::CheckLastBase(pos) => {
                if pos >= end {
                    return end;
                }

                if !is_ambiguous(seq[pos + k - 1]) {
                    return pos;
                }

                ScanState::SkipAmbiguous(pos + k - 1)
            }
            ScanState::ValidateWindow(pos) => {
                if pos >= end {
                    return end;
                }

                match seq[pos..pos + k].iter().position(|&b| is_ambiguous(b)) {
                    Some(l) => ScanState::SkipAmbiguous(pos + l),
                    None => return pos,
                }
            }
            ScanState::SkipAmbiguous(ambiguous_pos) => ScanState::ValidateWindow(ambiguous_pos + 1),
        };
    }
}

/// Iterator over the start offsets of all unambiguous k-mers in a sequence, in increasing order.
#[derive(Clone, Debug)]
pub struct ValidKmerStarts<'a> {
    seq: &'a [u8],
    k: usize,
    pos: usize,
    end: usize,
    at_beginning: bool,
}

impl<'a> ValidKmerStarts<'a> {
    pub fn new(seq: &'a [u8], k: usize) -> Self {
        let end = if k == 0 || seq.len() < k {
            0
        } else {
            seq.len() + 1 - k
        };

        ValidKmerStarts {
            seq,
            k,
            pos: 0,
            end,
            at_beginning: true,
        }
    }
}

impl Iterator for ValidKmerStarts<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pos >= self.end {
            return None;
        }

        let start = skip_ambiguous(self.seq, self.pos, self.end, self.k, self.at_beginning);
        if start >= self.end {
            self.pos = self.end;
            return None;
        }

        // the window at `start + 1` now shares its first k - 1 bases with a validated window
        self.at_beginning = false;
        self.pos = start + 1;

        Some(start)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end.saturating_sub(self.pos)))
    }
}

/// Iterate over all unambiguous k-mers in a sequence.
pub fn valid_kmers(seq: &[u8], k: usize) -> impl Iterator<Item = &[u8]> {
    ValidKmerStarts::new(seq, k).map(move |start| &seq[start..start + k])
}
