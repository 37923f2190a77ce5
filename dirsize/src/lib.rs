use std::{io, process};

use nom::{character::complete::char, combinator::rest, sequence::separated_pair, IResult};
use nom_supreme::error::ErrorTree;
use thiserror::Error;
use util::{parse_final, parse_number, render_report, BadInput, Span};

pub const THRESHOLD: u64 = 100_000;

#[derive(Error, Debug)]
pub enum Error {
    #[error("reading input")]
    ReadFailure(#[from] io::Error),

    #[error("malformed entry")]
    MalformedEntry(#[from] BadInput),

    #[error("used space {used} exceeds total space {total}")]
    DiskOverfull { used: u64, total: u64 },

    #[error("{free} already free, only {needed} needed")]
    NoDeletionNeeded { free: u64, needed: u64 },

    #[error("no directory frees at least {to_free}")]
    NothingLargeEnough { to_free: u64 },

    #[error("adding {size} to {total} overflows")]
    SizeOverflow { total: u64, size: u64 },
}

fn add_size(total: u64, size: u64) -> Result<u64, Error> {
    total
        .checked_add(size)
        .ok_or(Error::SizeOverflow { total, size })
}

/// One transcript line, classified in the order the accumulator checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Up,
    Into(&'a str),
    Ignored,
    File { size: u64, name: &'a str },
}

fn file_entry(i: Span) -> IResult<Span, (u64, Span), ErrorTree<Span>> {
    separated_pair(parse_number, char(' '), rest)(i)
}

impl<'a> TryFrom<&'a str> for Line<'a> {
    type Error = BadInput;

    fn try_from(line: &'a str) -> Result<Self, Self::Error> {
        match line {
            "$ cd .." => Ok(Self::Up),
            l if l.starts_with("$ cd") => Ok(Self::Into(l["$ cd".len()..].trim_start())),
            "$ ls" => Ok(Self::Ignored),
            l if l.starts_with("dir") => Ok(Self::Ignored),
            l => {
                let (size, name) = parse_final(l, file_entry)?;
                Ok(Self::File {
                    size,
                    name: *name.fragment(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirTotals {
    pub exact_size: u64,
    pub threshold_sum: u64,
}

/// Totals for the directory whose lines start at the cursor.
///
/// Returns after consuming `$ cd ..` or when `lines` runs out, so the root
/// call ends at end of input and every directory still open is closed there.
/// `on_dir` sees each directory's exact size as it is finished, children
/// before parents.
fn accumulate<I, S, F>(
    lines: &mut I,
    threshold: u64,
    depth: usize,
    on_dir: &mut F,
) -> Result<DirTotals, Error>
where
    I: Iterator<Item = io::Result<S>>,
    S: AsRef<str>,
    F: FnMut(u64),
{
    let mut totals = DirTotals::default();

    while let Some(line) = lines.next() {
        let line = line?;
        match Line::try_from(line.as_ref())? {
            Line::Up => break,
            Line::Into(_) => {
                let child = accumulate(lines, threshold, depth + 1, on_dir)?;
                totals.exact_size = add_size(totals.exact_size, child.exact_size)?;
                totals.threshold_sum = add_size(totals.threshold_sum, child.threshold_sum)?;
            }
            Line::Ignored => continue,
            Line::File { size, .. } => totals.exact_size = add_size(totals.exact_size, size)?,
        }
    }

    let counted = totals.exact_size <= threshold;
    if counted {
        totals.threshold_sum = add_size(totals.threshold_sum, totals.exact_size)?;
    }

    #[cfg(debug_assertions)]
    eprintln!(
        "{:indent$}dir at depth {depth}: {} (counted: {counted})",
        "",
        totals.exact_size,
        indent = depth * 2
    );

    on_dir(totals.exact_size);
    Ok(totals)
}

pub fn compute_with_threshold<S>(
    mut input: impl Iterator<Item = io::Result<S>>,
    threshold: u64,
) -> Result<DirTotals, Error>
where
    S: AsRef<str>,
{
    accumulate(&mut input, threshold, 0, &mut |_| {})
}

pub fn compute<S>(input: impl Iterator<Item = io::Result<S>>) -> Result<DirTotals, Error>
where
    S: AsRef<str>,
{
    compute_with_threshold(input, THRESHOLD)
}

pub fn sum_small<S>(input: impl Iterator<Item = io::Result<S>>, threshold: u64) -> Result<u64, Error>
where
    S: AsRef<str>,
{
    Ok(compute_with_threshold(input, threshold)?.threshold_sum)
}

/// Exact sizes of every directory, children first and the root last.
pub fn dir_sizes<S>(mut input: impl Iterator<Item = io::Result<S>>) -> Result<Vec<u64>, Error>
where
    S: AsRef<str>,
{
    let mut sizes = vec![];
    accumulate(&mut input, THRESHOLD, 0, &mut |size| sizes.push(size))?;
    Ok(sizes)
}

/// Size of the smallest directory whose removal leaves `needed` free out of
/// `total`.
pub fn size_to_delete<S>(
    input: impl Iterator<Item = io::Result<S>>,
    total: u64,
    needed: u64,
) -> Result<u64, Error>
where
    S: AsRef<str>,
{
    let sizes = dir_sizes(input)?;
    let used = sizes.iter().copied().max().unwrap_or_default();

    let free = total
        .checked_sub(used)
        .ok_or(Error::DiskOverfull { used, total })?;

    let to_free = needed
        .checked_sub(free)
        .filter(|&n| n > 0)
        .ok_or(Error::NoDeletionNeeded { free, needed })?;

    sizes
        .into_iter()
        .filter(|&s| s >= to_free)
        .min()
        .ok_or(Error::NothingLargeEnough { to_free })
}

/// Prints `err` the way both binaries report failures and exits with 1.
pub fn exit_with(err: anyhow::Error) -> ! {
    if let Some(Error::MalformedEntry(bad)) = err.downcast_ref::<Error>() {
        if let Ok(report) = render_report(bad) {
            eprintln!("{report}");
        }
    }

    println!("Error: {err:#}");
    process::exit(1)
}
