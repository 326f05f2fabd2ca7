//! Output formatting for scan results

use crate::stats::{ScanStats, TopQuery};
use crate::utils::{format_duration, percent_decode};
use serde_json::json;
use std::borrow::Cow;
use std::io::{self, IsTerminal};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// How results are rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Colorize text output
    pub color: bool,
    /// Print percent-decoded queries
    pub decode: bool,
    /// Emit JSON instead of text
    pub json: bool,
}

impl OutputOptions {
    fn stdout(&self) -> StandardStream {
        // termcolor's Auto only looks at TERM, not at where stdout goes
        let choice = if self.color && !self.json && io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        StandardStream::stdout(choice)
    }
}

/// Print the number of distinct queries
pub fn print_distinct(count: usize, options: &OutputOptions) -> io::Result<()> {
    let mut stdout = options.stdout();
    write_distinct(&mut stdout, count, options)
}

pub fn write_distinct<W: WriteColor>(out: &mut W, count: usize, options: &OutputOptions) -> io::Result<()> {
    if options.json {
        writeln!(out, "{}", json!({ "distinct": count }))
    } else {
        writeln!(out, "{}", count)
    }
}

/// Print top queries, one `<query>\t<count>` per line
pub fn print_top(entries: &[TopQuery<'_>], options: &OutputOptions) -> io::Result<()> {
    let mut stdout = options.stdout();
    write_top(&mut stdout, entries, options)
}

pub fn write_top<W: WriteColor>(out: &mut W, entries: &[TopQuery<'_>], options: &OutputOptions) -> io::Result<()> {
    if options.json {
        let top: Vec<_> = entries
            .iter()
            .map(|e| {
                let query = String::from_utf8_lossy(&query_bytes(e, options.decode)).into_owned();
                json!({ "query": query, "count": e.count })
            })
            .collect();
        return writeln!(out, "{}", json!({ "top": top }));
    }

    for entry in entries {
        out.write_all(&query_bytes(entry, options.decode))?;
        out.write_all(b"\t")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(out, "{}", entry.count)?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

/// Query bytes as stored in the log, or percent-decoded
fn query_bytes<'a>(entry: &TopQuery<'a>, decode: bool) -> Cow<'a, [u8]> {
    if decode {
        Cow::Owned(percent_decode(entry.query.as_bytes()))
    } else {
        Cow::Borrowed(entry.query.as_bytes())
    }
}

/// One-line scan summary
pub fn format_diagnostics(stats: &ScanStats) -> String {
    let seek = stats
        .seek_time
        .map(format_duration)
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{} records read in {} (seek: {}), {} records skipped, {} records invalid, jitter={}",
        stats.read,
        format_duration(stats.scan_time),
        seek,
        stats.skipped,
        stats.invalid,
        stats.max_jitter
    )
}

/// Print the scan summary on stderr
pub fn print_diagnostics(stats: &ScanStats) {
    eprintln!("{}", format_diagnostics(stats));
}
