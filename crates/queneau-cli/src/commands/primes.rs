//! `queneau primes` - write a prime table file.

use std::fs::File;
use std::io::{self, BufWriter};

use queneau_core::PrimeTable;

use super::{fail, or_exit};

/// Run the primes command.
pub fn run(limit: u64, output: Option<&str>) {
    let table = or_exit(PrimeTable::sieve_up_to(limit));
    match output {
        Some(path) => {
            let file =
                File::create(path).unwrap_or_else(|e| fail(format!("cannot create {path}: {e}")));
            or_exit(table.write_to(BufWriter::new(file)));
            eprintln!(
                "{} primes up to {} written to {path}",
                table.len(),
                table.largest()
            );
        }
        None => or_exit(table.write_to(io::stdout().lock())),
    }
}
