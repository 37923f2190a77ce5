use anyhow::{Context, Result};
use dirsize::{exit_with, size_to_delete};
use util::read_input_lines;

const TOTAL_SPACE: u64 = 70_000_000;
const NEEDED_SPACE: u64 = 30_000_000;

fn run() -> Result<u64> {
    size_to_delete(read_input_lines(), TOTAL_SPACE, NEEDED_SPACE).context("size to delete")
}

fn main() {
    match run() {
        Ok(size) => println!("{size}"),
        Err(e) => exit_with(e),
    }
}
