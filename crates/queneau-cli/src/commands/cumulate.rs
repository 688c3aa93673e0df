//! `queneau cumulate [SEED] INPUT` - running totals of tally lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use queneau_core::Cumulator;

use super::{fail, or_exit};

/// Run the cumulate command. `operands` is `[INPUT]` or `[SEED, INPUT]`.
pub fn run(operands: &[String]) {
    let (seed, input) = match operands {
        [input] => (0, input.as_str()),
        [seed, input] => {
            let seed = seed
                .trim()
                .parse::<u64>()
                .unwrap_or_else(|_| fail(format!("seed {seed:?} is not an unsigned integer")));
            (seed, input.as_str())
        }
        _ => fail("expected [SEED] INPUT"),
    };

    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        match File::open(input) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => fail(format!("cannot open {input}: {e}")),
        }
    };

    let mut cumulator = Cumulator::new(seed);
    or_exit(cumulator.run(reader, io::stdout().lock()));
    log::info!(
        "{} lines emitted, final total {}",
        cumulator.emitted(),
        cumulator.total()
    );
}
