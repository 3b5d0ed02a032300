/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Command-line interface of the `pagerank` binary.

use crate::graph::{read_adjacency_list, Graph};
use crate::ids::{ContentIdGenerator, Sha256IdGenerator};
use crate::rank::{ParallelRankComputer, RankComputer, RankResult, SequentialRankComputer};
use anyhow::{anyhow, bail, ensure, Context, Result};
use clap::{Parser, ValueEnum};
use dsi_progress_logger::{progress_logger, ProgressLog};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// The function assigning identifiers to nodes.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdFunction {
    /// Use the content of the node.
    #[default]
    Content,
    /// Use the hex SHA-256 digest of the content of the node.
    Sha256,
}

#[derive(Parser, Debug)]
#[command(
    name = "pagerank",
    about = "Compute PageRank by power iteration with barrier-synchronized workers.",
    long_about = None
)]
pub struct CliArgs {
    /// The graph in adjacency-list format: one node per line, followed by its
    /// successors; "-" reads from standard input.
    pub graph: PathBuf,

    #[arg(short, long, default_value_t = 0.85)]
    /// The damping factor α (must be in the interval (0 . . 1)).
    pub alpha: f64,

    #[arg(short, long, default_value_t = 100)]
    /// Maximum number of iterations.
    pub iterations: usize,

    #[arg(short, long, default_value_t = 1e-6)]
    /// Stop when the ℓ₁ norm of the difference between two successive rank
    /// vectors is below this threshold.
    pub tolerance: f64,

    #[arg(short = 'j', long, default_value_t = num_cpus::get(), value_parser = num_threads_parser)]
    /// The number of workers.
    pub num_threads: usize,

    #[arg(long, conflicts_with = "num_threads")]
    /// Compute in the current thread.
    pub sequential: bool,

    #[arg(long, value_enum, default_value_t = IdFunction::Content)]
    /// How to assign identifiers to nodes.
    pub ids: IdFunction,

    #[arg(short, long)]
    /// Where to store the ranks (default: standard output).
    pub output: Option<PathBuf>,

    #[arg(long)]
    /// Decimal digits of the ranks.
    pub precision: Option<usize>,

    #[arg(long)]
    /// Output only the nodes with the largest ranks.
    pub top: Option<usize>,

    #[arg(long, value_parser = parse_duration)]
    /// How often to log progress. Default is 10s. You can use the suffixes "s"
    /// for seconds, "m" for minutes, "h" for hours, and "d" for days. If no
    /// suffix is provided it is assumed to be in milliseconds.
    pub log_interval: Option<Duration>,
}

pub fn num_threads_parser(arg: &str) -> Result<usize> {
    let num_threads = arg.parse::<usize>()?;
    ensure!(num_threads > 0, "Number of threads must be greater than 0");
    Ok(num_threads)
}

/// Parses a duration from a string.
///
/// If no suffix is given, the value is assumed to be in milliseconds. The
/// available suffixes are `s` (seconds), `m` (minutes), `h` (hours), and `d`
/// (days); for example, `1d2h3m4s567` is 1 day, 2 hours, 3 minutes, 4
/// seconds, and 567 milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    if value.is_empty() {
        bail!("Empty duration string, if you want every 0 milliseconds use `0`.");
    }
    let mut duration = Duration::from_secs(0);
    let mut acc = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            acc.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            let dur = acc.parse::<u64>()?;
            match c {
                's' => duration += Duration::from_secs(dur),
                'm' => duration += Duration::from_secs(dur * 60),
                'h' => duration += Duration::from_secs(dur * 60 * 60),
                'd' => duration += Duration::from_secs(dur * 60 * 60 * 24),
                _ => return Err(anyhow!("Invalid duration suffix: {}", c)),
            }
            acc.clear();
        }
    }
    if !acc.is_empty() {
        let dur = acc.parse::<u64>()?;
        duration += Duration::from_millis(dur);
    }
    Ok(duration)
}

/// Initializes the `env_logger` logger with a custom format including
/// timestamps with elapsed time since initialization.
pub fn init_env_logger() -> Result<()> {
    use jiff::fmt::friendly::{Designator, Spacing, SpanPrinter};
    use jiff::SpanRound;

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let start = std::time::Instant::now();
    let printer = SpanPrinter::new()
        .spacing(Spacing::None)
        .designator(Designator::Compact);
    let span_round = SpanRound::new()
        .largest(jiff::Unit::Day)
        .smallest(jiff::Unit::Millisecond)
        .days_are_24_hours();

    builder.format(move |buf, record| {
        let Ok(ts) = jiff::Timestamp::try_from(SystemTime::now()) else {
            return Err(std::io::Error::other("Failed to get timestamp"));
        };
        let style = buf.default_level_style(record.level());
        let elapsed = start.elapsed();
        let span = jiff::Span::new()
            .seconds(elapsed.as_secs() as i64)
            .milliseconds(elapsed.subsec_millis() as i64);
        let span = span.round(span_round).map_err(std::io::Error::other)?;
        writeln!(
            buf,
            "{} {} {style}{}{style:#} [{}] {} - {}",
            ts.strftime("%F %T%.3f"),
            printer.span_to_string(&span),
            record.level(),
            std::thread::current().name().unwrap_or("unnamed"),
            record.target(),
            record.args()
        )
    });
    builder.try_init()?;
    Ok(())
}

/// Reads a graph in adjacency-list format from a file, or from standard input
/// if `path` is `-`.
pub fn load_graph(path: &Path, ids: IdFunction) -> Result<Graph> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        log::info!("Reading the graph from standard input");
        Box::new(std::io::stdin().lock())
    } else {
        log::info!("Reading the graph from {}", path.display());
        Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("Could not open {}", path.display())
        })?))
    };
    match ids {
        IdFunction::Content => read_adjacency_list(reader, ContentIdGenerator),
        IdFunction::Sha256 => read_adjacency_list(reader, Sha256IdGenerator),
    }
}

/// Writes ranks as `id<TAB>rank` lines, by decreasing rank.
///
/// If `top` is specified, only that many lines are written; if `precision`
/// is specified, ranks are written with that number of decimal digits.
pub fn write_ranks(
    mut writer: impl Write,
    ranks: RankResult,
    top: Option<usize>,
    precision: Option<usize>,
) -> Result<()> {
    let pairs = ranks.into_sorted_vec();
    for (id, rank) in pairs.into_iter().take(top.unwrap_or(usize::MAX)) {
        match precision {
            Some(precision) => writeln!(writer, "{}\t{:.*}", id, precision, rank)?,
            None => writeln!(writer, "{}\t{}", id, rank)?,
        }
    }
    writer.flush()?;
    Ok(())
}

/// Creates all parent directories of the given file path.
fn create_parent_dir(file_path: &Path) -> Result<()> {
    if let Some(parent_dir) = file_path.parent() {
        std::fs::create_dir_all(parent_dir).with_context(|| {
            format!(
                "Failed to create the directory {:?}",
                parent_dir.to_string_lossy()
            )
        })?;
    }
    Ok(())
}

pub fn main<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    run(CliArgs::parse_from(args))
}

pub fn run(args: CliArgs) -> Result<()> {
    let graph = load_graph(&args.graph, args.ids)?;

    let mut pl = progress_logger![];
    if let Some(log_interval) = args.log_interval {
        pl.log_interval(log_interval);
    }

    let start = std::time::Instant::now();
    let ranks = if args.sequential {
        let computer = SequentialRankComputer;
        log::info!("Strategy: {}", computer.name());
        computer.compute_with_logging(
            &graph,
            args.alpha,
            args.iterations,
            args.tolerance,
            &mut pl,
        )?
    } else {
        let computer = ParallelRankComputer::new(args.num_threads);
        log::info!("Strategy: {}", computer.name());
        computer.compute_with_logging(
            &graph,
            args.alpha,
            args.iterations,
            args.tolerance,
            &mut pl,
        )?
    };
    log::info!("Ranks computed in {:?}", start.elapsed());

    match &args.output {
        Some(path) => {
            create_parent_dir(path)?;
            let file = File::create(path)
                .with_context(|| format!("Could not create {}", path.display()))?;
            write_ranks(BufWriter::new(file), ranks, args.top, args.precision)?;
            log::info!("Ranks stored in {}", path.display());
        }
        None => write_ranks(
            BufWriter::new(std::io::stdout().lock()),
            ranks,
            args.top,
            args.precision,
        )?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    #[test]
    fn test_parse_args() -> Result<()> {
        let args = CliArgs::try_parse_from(["pagerank", "graph.txt"])?;
        assert_eq!(args.alpha, 0.85);
        assert_eq!(args.iterations, 100);
        assert_eq!(args.ids, IdFunction::Content);
        assert!(!args.sequential);

        let args = CliArgs::try_parse_from([
            "pagerank", "-a", "0.5", "-j", "3", "--ids", "sha256", "--top", "2", "-",
        ])?;
        assert_eq!(args.alpha, 0.5);
        assert_eq!(args.num_threads, 3);
        assert_eq!(args.ids, IdFunction::Sha256);
        assert_eq!(args.top, Some(2));

        assert!(CliArgs::try_parse_from(["pagerank", "-j", "0", "graph.txt"]).is_err());
        assert!(
            CliArgs::try_parse_from(["pagerank", "-j", "2", "--sequential", "graph.txt"]).is_err()
        );
        Ok(())
    }

    #[test]
    fn test_parse_duration() -> Result<()> {
        assert_eq!(parse_duration("10s")?, Duration::from_secs(10));
        assert_eq!(
            parse_duration("1m2s500")?,
            Duration::from_millis(62_500)
        );
        assert!(parse_duration("").is_err());
        assert!(parse_duration("3x").is_err());
        Ok(())
    }

    #[test]
    fn test_write_ranks() -> Result<()> {
        let ranks = [
            (NodeId::from("a"), 0.5),
            (NodeId::from("b"), 0.1875),
            (NodeId::from("c"), 0.3125),
        ];
        let result = RankResult::assemble(ranks, 3)?;
        let mut out = Vec::new();
        write_ranks(&mut out, result.clone(), Some(2), Some(2))?;
        assert_eq!(String::from_utf8(out)?, "a\t0.50\nc\t0.31\n");

        let mut out = Vec::new();
        write_ranks(&mut out, result, None, None)?;
        assert_eq!(String::from_utf8(out)?, "a\t0.5\nc\t0.3125\nb\t0.1875\n");
        Ok(())
    }
}
