use std::io::{BufRead, Read};

use needletail::parse_fastx_reader;
use serde::{Deserialize, Serialize};

use crate::counting::CountingStructure;
use crate::errors::KmerQfResult;
use crate::keys::{KeyScheme, KmerKeyer};
use crate::pipeline::records::trim_line_end;

/// Approximate count of every k-mer window of a sequence, in order.
///
/// Yields `(position, count)` for each window start in `0..=len - k` and
/// nothing when the sequence is shorter than k. Cloning (or
/// [`restart`](WindowCounts::restart)) gives a fresh pass over the windows.
pub struct WindowCounts<'a, S: ?Sized> {
    sequence: &'a [u8],
    structure: &'a S,
    keyer: KmerKeyer,
    next: usize,
}

impl<'a, S: ?Sized> Clone for WindowCounts<'a, S> {
    fn clone(&self) -> Self {
        WindowCounts {
            sequence: self.sequence,
            structure: self.structure,
            keyer: self.keyer,
            next: self.next,
        }
    }
}

impl<'a, S: CountingStructure + ?Sized> WindowCounts<'a, S> {
    pub fn restart(&mut self) {
        self.next = 0;
    }

    fn remaining(&self) -> usize {
        (self.sequence.len() + 1).saturating_sub(self.next + self.keyer.k() as usize)
    }
}

impl<'a, S: CountingStructure + ?Sized> Iterator for WindowCounts<'a, S> {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.keyer.k() as usize;
        let window = self.sequence.get(self.next..self.next + k)?;
        let position = self.next;
        self.next += 1;
        Some((position, self.structure.query(self.keyer.window_key(window))))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<'a, S: CountingStructure + ?Sized> ExactSizeIterator for WindowCounts<'a, S> {}

/// Window counts of `sequence` using the default key scheme.
pub fn query_window_counts<'a, Q, S>(
    sequence: &'a Q,
    k: u32,
    structure: &'a S,
) -> KmerQfResult<WindowCounts<'a, S>>
where
    Q: AsRef<[u8]> + ?Sized,
    S: CountingStructure + ?Sized,
{
    let keyer = KmerKeyer::new(k, KeyScheme::default())?;
    Ok(query_window_counts_with(sequence, &keyer, structure))
}

pub fn query_window_counts_with<'a, Q, S>(
    sequence: &'a Q,
    keyer: &KmerKeyer,
    structure: &'a S,
) -> WindowCounts<'a, S>
where
    Q: AsRef<[u8]> + ?Sized,
    S: CountingStructure + ?Sized,
{
    WindowCounts {
        sequence: sequence.as_ref(),
        structure,
        keyer: *keyer,
        next: 0,
    }
}

/// Window counts for one read.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReadCounts {
    pub id: String,
    pub counts: Vec<u64>,
}

impl ReadCounts {
    /// Number of windows whose count is above `threshold`.
    pub fn windows_above(&self, threshold: u64) -> usize {
        self.counts.iter().filter(|c| **c > threshold).count()
    }
}

/// Window counts for every record of a FASTA/FASTQ stream.
pub fn query_fastx<R, S>(
    reader: R,
    structure: &S,
    keyer: &KmerKeyer,
) -> KmerQfResult<Vec<ReadCounts>>
where
    R: Read + Send,
    S: CountingStructure + ?Sized,
{
    let mut fastx_reader = parse_fastx_reader(reader)?;
    let mut results = Vec::new();
    while let Some(record) = fastx_reader.next() {
        let record = record?;
        let seq = record.seq();
        let counts = query_window_counts_with(&seq[..], keyer, structure)
            .map(|(_, count)| count)
            .collect();
        results.push(ReadCounts {
            id: String::from_utf8_lossy(record.id()).into_owned(),
            counts,
        });
    }
    Ok(results)
}

/// Window counts for text holding one bare sequence per line.
///
/// Lines are read as raw bytes, so bytes outside `ACGT` take the same
/// "other" code they get in [`query_window_counts`]. Reads are named by their
/// 1-based line number; blank lines are skipped.
pub fn query_lines<R, S>(
    reader: R,
    structure: &S,
    keyer: &KmerKeyer,
) -> KmerQfResult<Vec<ReadCounts>>
where
    R: BufRead,
    S: CountingStructure + ?Sized,
{
    let mut results = Vec::new();
    for (ix, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let seq = trim_line_end(&line);
        if seq.is_empty() {
            continue;
        }
        let counts = query_window_counts_with(seq, keyer, structure)
            .map(|(_, count)| count)
            .collect();
        results.push(ReadCounts {
            id: (ix + 1).to_string(),
            counts,
        });
    }
    Ok(results)
}
