pub mod cumulate;
pub mod primes;
pub mod scan;

use std::fmt::Display;

/// Print `Error: {e}` to stderr and exit with status 1.
pub fn fail(e: impl Display) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1);
}

/// Unwrap a core result or exit through [`fail`].
pub fn or_exit<T>(result: queneau_core::Result<T>) -> T {
    result.unwrap_or_else(|e| fail(e))
}
