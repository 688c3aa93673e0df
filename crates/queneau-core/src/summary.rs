//! Post-processing of a finished scan: totals, samples, console lines and
//! the JSON report.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QueneauError, Result};
use crate::scan::ScanConfig;
use crate::worker::ChunkResult;

/// How many Queneau numbers are sampled from each end of the range.
pub const SAMPLE_LEN: usize = 7;

/// Total plus the first and last few Queneau numbers of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub start: u64,
    pub stop: u64,
    pub total: u64,
    /// Up to [`SAMPLE_LEN`] smallest, taken from the first chunk only.
    pub head: Vec<u64>,
    /// Up to [`SAMPLE_LEN`] largest, ascending, taken from the last chunk only.
    pub tail: Vec<u64>,
}

impl ScanSummary {
    /// Summarize chunk results given in chunk order.
    pub fn from_results(start: u64, stop: u64, results: &[ChunkResult]) -> Result<Self> {
        let total = results.iter().try_fold(0u64, |acc, r| {
            acc.checked_add(r.count)
                .ok_or(QueneauError::Overflow("scan total"))
        })?;
        let head = results
            .first()
            .map(|r| r.queneaus().take(SAMPLE_LEN).collect())
            .unwrap_or_default();
        let tail = results
            .last()
            .map(|r| {
                let mut tail: Vec<u64> = r.queneaus().rev().take(SAMPLE_LEN).collect();
                tail.reverse();
                tail
            })
            .unwrap_or_default();
        Ok(Self {
            start,
            stop,
            total,
            head,
            tail,
        })
    }

    /// `[a1, a2, ...] .... [b1, b2, ...]`
    pub fn samples_line(&self) -> String {
        format!("{} .... {}", list_literal(&self.head), list_literal(&self.tail))
    }

    /// `Queneaus from 0.00E+00 to 2.00E+06: 123`
    pub fn total_line(&self) -> String {
        format!(
            "Queneaus from {} to {}: {}",
            format_sci(self.start),
            format_sci(self.stop),
            self.total
        )
    }

    /// `<start>-to-<stop>: <total>`, the line format read by the cumulator.
    pub fn tally_line(&self) -> String {
        format!("{}-to-{}: {}", self.start, self.stop, self.total)
    }

    /// The three console lines, newline-terminated.
    pub fn render(&self, elapsed: Duration) -> String {
        format!(
            "{}\n{}\nTotal time: {} seconds\n",
            self.samples_line(),
            self.total_line(),
            elapsed.as_secs_f64()
        )
    }
}

/// Machine-readable record of one scan, written by `scan --output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub version: String,
    pub start: u64,
    pub stop: u64,
    pub chunk_size: u64,
    pub workers: usize,
    pub total: u64,
    pub chunk_counts: Vec<u64>,
    pub head: Vec<u64>,
    pub tail: Vec<u64>,
    pub elapsed_secs: f64,
}

impl ScanReport {
    pub fn new(
        config: &ScanConfig,
        results: &[ChunkResult],
        summary: &ScanSummary,
        elapsed: Duration,
    ) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            start: config.start,
            stop: config.stop,
            chunk_size: config.chunk_size,
            workers: config.worker_count(),
            total: summary.total,
            chunk_counts: results.iter().map(|r| r.count).collect(),
            head: summary.head.clone(),
            tail: summary.tail.clone(),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Scientific notation with two decimals, upper-case `E` and a signed
/// two-digit exponent: `2000000` becomes `2.00E+06`.
pub fn format_sci(value: u64) -> String {
    let raw = format!("{:.2e}", value as f64);
    let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}E{sign}{:02}", exp.unsigned_abs())
}

fn list_literal(values: &[u64]) -> String {
    let items: Vec<String> = values.iter().map(u64::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chunk_min: u64, hits: &[u64], size: usize) -> ChunkResult {
        let mut verdicts = vec![false; size];
        for &h in hits {
            verdicts[(h - chunk_min) as usize] = true;
        }
        ChunkResult {
            chunk_min,
            count: hits.len() as u64,
            verdicts,
        }
    }

    #[test]
    fn test_format_sci() {
        assert_eq!(format_sci(0), "0.00E+00");
        assert_eq!(format_sci(1000), "1.00E+03");
        assert_eq!(format_sci(2_000_000), "2.00E+06");
        assert_eq!(format_sci(7), "7.00E+00");
        assert_eq!(format_sci(123_456), "1.23E+05");
        assert_eq!(format_sci(10_000_000_000), "1.00E+10");
    }

    #[test]
    fn test_samples_from_first_and_last_chunk() {
        let results = vec![
            chunk(0, &[1, 2, 3, 5, 6, 9, 11, 14, 18], 20),
            chunk(20, &[23, 26], 20),
            chunk(40, &[41], 20),
        ];
        let s = ScanSummary::from_results(0, 60, &results).unwrap();
        assert_eq!(s.total, 12);
        assert_eq!(s.head, vec![1, 2, 3, 5, 6, 9, 11]);
        // Only the last chunk is sampled, even when it has fewer than 7.
        assert_eq!(s.tail, vec![41]);
        assert_eq!(s.samples_line(), "[1, 2, 3, 5, 6, 9, 11] .... [41]");
    }

    #[test]
    fn test_tail_keeps_the_largest_ascending() {
        let hits: Vec<u64> = (100..120).filter(|n| n % 2 == 1).collect();
        let s = ScanSummary::from_results(100, 120, &[chunk(100, &hits, 20)]).unwrap();
        assert_eq!(s.tail, vec![107, 109, 111, 113, 115, 117, 119]);
    }

    #[test]
    fn test_empty_scan_summary() {
        let s = ScanSummary::from_results(5, 5, &[]).unwrap();
        assert_eq!(s.total, 0);
        assert_eq!(s.samples_line(), "[] .... []");
    }

    #[test]
    fn test_console_lines() {
        let s = ScanSummary::from_results(0, 20, &[chunk(0, &[1, 2], 20)]).unwrap();
        assert_eq!(s.total_line(), "Queneaus from 0.00E+00 to 2.00E+01: 2");
        assert_eq!(s.tally_line(), "0-to-20: 2");
        let text = s.render(Duration::from_millis(1500));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Total time: 1.5 seconds");
    }

    #[test]
    fn test_report_json() {
        let config = ScanConfig::new(0, 40, 20).with_workers(2);
        let results = vec![chunk(0, &[1, 2], 20), chunk(20, &[23], 20)];
        let summary = ScanSummary::from_results(0, 40, &results).unwrap();
        let report = ScanReport::new(&config, &results, &summary, Duration::from_secs(2));
        assert_eq!(report.chunk_counts, vec![2, 1]);
        assert_eq!(report.workers, 2);

        let json = report.to_json().unwrap();
        let back: ScanReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!(json.contains("\"total\": 3"));
    }
}
