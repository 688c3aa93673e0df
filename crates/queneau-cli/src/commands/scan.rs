//! `queneau scan` - parallel search over a range with the console summary.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::time::Instant;

use queneau_core::{PrimeTable, ResidueProfile, ScanConfig, ScanReport, ScanSummary, scan};

use super::{fail, or_exit};

pub struct ScanCommandConfig<'a> {
    pub primes_path: Option<&'a str>,
    pub start: u64,
    pub stop: u64,
    pub chunk_size: u64,
    pub workers: Option<usize>,
    pub list_path: Option<&'a str>,
    pub tally_path: Option<&'a str>,
    pub output_path: Option<&'a str>,
    pub residues: bool,
}

/// Run the scan command.
pub fn run(cmd: ScanCommandConfig<'_>) {
    let config = ScanConfig {
        start: cmd.start,
        stop: cmd.stop,
        chunk_size: cmd.chunk_size,
        workers: cmd.workers,
    };
    or_exit(config.validate());

    let primes = match cmd.primes_path {
        Some(path) => or_exit(PrimeTable::load(path)),
        None => or_exit(PrimeTable::for_range(config.stop)),
    };

    let tic = Instant::now();
    let results = or_exit(scan(&config, &primes));
    let summary = or_exit(ScanSummary::from_results(config.start, config.stop, &results));
    let elapsed = tic.elapsed();

    print!("{}", summary.render(elapsed));

    if cmd.residues {
        let profile = ResidueProfile::from_values(results.iter().flat_map(|r| r.queneaus()));
        print!("{}", profile.render());
    }

    if let Some(path) = cmd.list_path {
        let write = || -> std::io::Result<()> {
            let mut out = BufWriter::new(fs::File::create(path)?);
            for n in results.iter().flat_map(|r| r.queneaus()) {
                writeln!(out, "{n}")?;
            }
            out.flush()
        };
        if let Err(e) = write() {
            fail(format!("failed to write {path}: {e}"));
        }
        eprintln!("List written to {path}");
    }

    if let Some(path) = cmd.tally_path {
        let append = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", summary.tally_line())
        };
        if let Err(e) = append() {
            fail(format!("failed to append to {path}: {e}"));
        }
    }

    if let Some(path) = cmd.output_path {
        let report = ScanReport::new(&config, &results, &summary, elapsed);
        let json = or_exit(report.to_json());
        match fs::write(path, json) {
            Ok(()) => eprintln!("Report written to {path}"),
            Err(e) => fail(format!("failed to write {path}: {e}")),
        }
    }
}
