use std::io::{BufRead, Split};

use serde::{Deserialize, Serialize};

use crate::errors::{KmerQfError, KmerQfResult};

/// One `kmer<TAB>count` line of build data.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Hash, Serialize)]
pub struct CountRecord {
    pub kmer: Vec<u8>,
    pub count: u64,
}

fn malformed<S: Into<String>>(line: usize, reason: S) -> KmerQfError {
    KmerQfError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

/// Parse a single tab-separated `kmer<TAB>count` line.
///
/// Fields after the count are ignored.
pub fn parse_count_record(line: &str) -> KmerQfResult<CountRecord> {
    parse_line(line.as_bytes(), 1)
}

fn parse_line(line: &[u8], line_no: usize) -> KmerQfResult<CountRecord> {
    let line = trim_line_end(line);
    let mut fields = line.split(|b| *b == b'\t');
    let kmer = match fields.next() {
        Some(kmer) if !kmer.is_empty() => kmer,
        _ => return Err(malformed(line_no, "missing k-mer field")),
    };
    let raw_count = fields
        .next()
        .ok_or_else(|| malformed(line_no, "missing count field"))?;
    let raw_count = String::from_utf8_lossy(raw_count);
    let count = raw_count
        .trim()
        .parse::<u64>()
        .map_err(|e| malformed(line_no, format!("invalid count {:?}: {}", raw_count, e)))?;
    Ok(CountRecord {
        kmer: kmer.to_vec(),
        count,
    })
}

pub(crate) fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\n'] | [rest @ .., b'\r'] = line {
        line = rest;
    }
    line
}

/// Count records read line by line from tab-separated text.
///
/// Lines are raw bytes; k-mer bytes outside `ACGT` are kept as they are.
/// Blank lines are skipped. Each malformed line yields its own error (tagged
/// with its 1-based line number) and iteration can continue past it.
pub struct CountRecords<R> {
    lines: Split<R>,
    line_no: usize,
}

impl<R: BufRead> CountRecords<R> {
    pub fn new(reader: R) -> Self {
        CountRecords {
            lines: reader.split(b'\n'),
            line_no: 0,
        }
    }

    /// Line number of the last line read.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for CountRecords<R> {
    type Item = KmerQfResult<CountRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Some(parse_line(&line, self.line_no));
        }
    }
}
