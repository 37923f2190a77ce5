use std::{
    io::{self, BufRead, IsTerminal},
    str::FromStr,
    sync::mpsc::{self, Receiver},
    thread,
};

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use nom::{
    character::complete::digit1, combinator::map_res, error::ParseError, IResult, Parser,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};

pub type Span<'a> = LocatedSpan<&'a str>;

/// A line that failed to parse, with the offset where the parser gave up.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("{kind} in line `{src}`")]
pub struct BadInput {
    #[source_code]
    pub src: String,

    #[label("{kind}")]
    pub bad_bit: miette::SourceSpan,

    pub kind: String,
}

impl BadInput {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

pub fn parse_number<'a, E>(i: Span<'a>) -> IResult<Span<'a>, u64, E>
where
    E: ParseError<Span<'a>> + nom::error::FromExternalError<Span<'a>, std::num::ParseIntError>,
{
    map_res(digit1, |i: Span<'a>| u64::from_str(i.fragment()))(i)
}

/// Runs `parse_fun` over the whole of `l`, keeping the innermost failure
/// location so it can be reported with the line as source.
pub fn parse_final<'a, T, F>(l: &'a str, parse_fun: F) -> Result<T, BadInput>
where
    F: Parser<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(Span::new(l));
    line.map_err(|e| {
        let (location, kind) = innermost(e);
        BadInput {
            src: l.to_string(),
            bad_bit: miette::SourceSpan::new(location.location_offset().into(), 0.into()),
            kind,
        }
    })
}

fn innermost(e: ErrorTree<Span>) -> (Span, String) {
    match e {
        GenericErrorTree::Base { location, kind } => (location, kind.to_string()),
        GenericErrorTree::Stack { base, .. } => innermost(*base),
        GenericErrorTree::Alt(mut alts) => match alts.pop() {
            Some(alt) => innermost(alt),
            None => (Span::new(""), "no alternative matched".to_string()),
        },
    }
}

/// Renders for stderr, with colours only when stderr is a terminal.
pub fn render_report(diagnostic: &dyn Diagnostic) -> Result<String, std::fmt::Error> {
    render_report_themed(diagnostic, io::stderr().is_terminal())
}

pub fn render_report_themed(
    diagnostic: &dyn Diagnostic,
    color: bool,
) -> Result<String, std::fmt::Error> {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };

    let mut s = String::new();
    GraphicalReportHandler::new_themed(theme).render_report(&mut s, diagnostic)?;
    Ok(s)
}

/// Lazily pulls newline-stripped lines out of `reader`.
pub fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.lines()
}

pub fn read_input_lines() -> impl Iterator<Item = io::Result<String>> {
    read_lines(io::stdin().lock())
}

/// Receiving end of [`spawn_line_producer`].
pub struct LineReceiver {
    rx: Receiver<io::Result<String>>,
}

impl Iterator for LineReceiver {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}

/// Reads `reader` on its own thread and hands lines over one at a time.
///
/// The channel is a rendezvous, so the producer blocks until the previous
/// line has been taken. A read error is sent as the last item. Dropping the
/// receiver makes the next send fail, which ends the thread.
pub fn spawn_line_producer<R>(reader: R) -> LineReceiver
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(0);

    thread::spawn(move || {
        for line in reader.lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });

    LineReceiver { rx }
}
