use anyhow::{Context, Result};
use dirsize::{exit_with, sum_small, THRESHOLD};
use util::read_input_lines;

fn run() -> Result<u64> {
    sum_small(read_input_lines(), THRESHOLD).context("dir size")
}

fn main() {
    match run() {
        Ok(sum) => println!("{sum}"),
        Err(e) => exit_with(e),
    }
}
