//! Twin counts and small-modulus residue histograms of a list of Queneau numbers.

use serde::{Deserialize, Serialize};

/// Largest modulus profiled; moduli run from 2 up to this value.
pub const MAX_MODULUS: u64 = 19;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueProfile {
    /// First value seen, if any.
    pub first: Option<u64>,
    /// Number of values profiled.
    pub count: u64,
    /// Adjacent pairs `(v, v + 1)`.
    pub twins: u64,
    /// `histograms[m - 2][r]` counts values `≡ r (mod m)`.
    pub histograms: Vec<Vec<u64>>,
}

impl ResidueProfile {
    /// Profile an ascending sequence.
    pub fn from_values<I: IntoIterator<Item = u64>>(values: I) -> Self {
        let mut histograms: Vec<Vec<u64>> =
            (2..=MAX_MODULUS).map(|m| vec![0; m as usize]).collect();
        let mut first = None;
        let mut prev: Option<u64> = None;
        let mut count = 0u64;
        let mut twins = 0u64;

        for v in values {
            first.get_or_insert(v);
            if prev.is_some_and(|p| p.checked_add(1) == Some(v)) {
                twins += 1;
            }
            for (hist, m) in histograms.iter_mut().zip(2..=MAX_MODULUS) {
                hist[(v % m) as usize] += 1;
            }
            count += 1;
            prev = Some(v);
        }

        Self {
            first,
            count,
            twins,
            histograms,
        }
    }

    /// Histogram for modulus `m`, or `None` outside `2..=MAX_MODULUS`.
    pub fn histogram(&self, m: u64) -> Option<&[u64]> {
        if !(2..=MAX_MODULUS).contains(&m) {
            return None;
        }
        self.histograms.get((m - 2) as usize).map(Vec::as_slice)
    }

    /// Text table: a header line, then one row per modulus.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} values, {} twins, first {}\n",
            self.count,
            self.twins,
            self.first.map_or_else(|| "-".to_string(), |v| v.to_string())
        );
        for (hist, m) in self.histograms.iter().zip(2..=MAX_MODULUS) {
            out.push_str(&format!("mod {m:>2}:"));
            for c in hist {
                out.push_str(&format!("{c:>7},"));
            }
            out.push('\n');
        }
        out
    }
}
