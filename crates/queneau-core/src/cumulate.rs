//! Running totals over a stream of `<label>-to-<upper>: <count>` lines.
//!
//! Lines that do not have exactly that shape are skipped. A line with the
//! right shape but a non-numeric count stops the run.

use std::io::{BufRead, Write};

use crate::error::{QueneauError, Result};

/// Split a tally line into `(upper, count)` without parsing the count.
///
/// Requires exactly one `-to-` and, after it, exactly one `": "`.
pub fn split_tally_line(line: &str) -> Option<(&str, &str)> {
    let (_, rest) = line.split_once("-to-")?;
    if rest.contains("-to-") {
        return None;
    }
    let (upper, count) = rest.split_once(": ")?;
    if count.contains(": ") {
        return None;
    }
    Some((upper, count))
}

/// Single forward pass of running totals.
#[derive(Debug, Clone, Default)]
pub struct Cumulator {
    total: u64,
    emitted: usize,
}

impl Cumulator {
    /// Start the running total at `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            total: seed,
            emitted: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Output lines produced so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Consume one input line (`line_no` is 1-based, for error messages).
    /// Returns the `<upper>: <running_total>` line, or `None` if skipped.
    pub fn feed(&mut self, line_no: usize, line: &str) -> Result<Option<String>> {
        let Some((upper, count)) = split_tally_line(line) else {
            log::debug!("line {line_no}: skipped");
            return Ok(None);
        };
        let text = count.trim();
        let count: u64 = text.parse().map_err(|_| QueneauError::MalformedCount {
            line: line_no,
            text: text.to_string(),
        })?;
        self.total = self
            .total
            .checked_add(count)
            .ok_or(QueneauError::Overflow("running total"))?;
        self.emitted += 1;
        Ok(Some(format!("{upper}: {}", self.total)))
    }

    /// Feed every line of `input`, writing each emitted line to `out`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(emitted) = self.feed(i + 1, line)? {
                writeln!(out, "{emitted}")?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Collect the running-total lines for an in-memory sequence of lines.
pub fn cumulate<I, S>(seed: u64, lines: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cumulator = Cumulator::new(seed);
    let mut out = Vec::new();
    for (i, line) in lines.into_iter().enumerate() {
        if let Some(emitted) = cumulator.feed(i + 1, line.as_ref())? {
            out.push(emitted);
        }
    }
    Ok(out)
}
