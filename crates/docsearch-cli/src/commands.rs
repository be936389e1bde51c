//! Implementations of the one-shot subcommands.

use crate::{BuildArgs, CheckArgs, FmtArgs, SearchArgs, StatsArgs};
use anyhow::{Context, Result};
use docsearch_core::codec::{self, Framing};
use docsearch_core::{
    validate, DocIndex, IndexStats, SearchQuery, ValidationOptions, ValidationReport,
};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info, warn};

/// Combined output of `check`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutput {
    passed: bool,
    roundtrip: codec::RoundTrip,
    report: ValidationReport,
}

pub fn check(args: &CheckArgs) -> Result<ExitCode> {
    let raw = codec::read_text(&args.file)?;
    let parsed = codec::parse_str(&raw)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    let roundtrip = codec::check_roundtrip(&raw)?;

    let options = ValidationOptions {
        strict: args.strict,
        allow_unknown_categories: args.allow_unknown_categories,
    };
    let report = validate(&parsed.index, &options);
    let passed = report.passes(options.strict) && roundtrip.identical;

    if args.json {
        let output = CheckOutput {
            passed,
            roundtrip,
            report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for issue in &report.issues {
            println!("{}", issue);
        }
        if !roundtrip.identical {
            println!(
                "error[roundtrip]: re-serialized output differs at byte {}",
                roundtrip.first_difference.unwrap_or_default()
            );
        } else if !roundtrip.canonical {
            println!("note: file round-trips but is not in canonical layout");
        }
        println!(
            "{}: {}, {}, {}",
            args.file.display(),
            plural(report.entries_checked, "entry", "entries"),
            plural(report.error_count(), "error", "errors"),
            plural(report.warning_count(), "warning", "warnings")
        );
    }

    Ok(exit_status(passed))
}

pub fn stats(args: &StatsArgs) -> Result<ExitCode> {
    let parsed = codec::read_file(&args.file)?;
    let stats = IndexStats::compute(&parsed.index);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("entries:    {}", stats.total_entries);
    println!("locations:  {}", stats.distinct_locations);
    println!("pages:      {}", stats.distinct_pages);
    println!("empty text: {}", stats.empty_text_entries);
    println!("text bytes: {}", stats.total_text_bytes);
    println!();
    println!("by category:");
    for (category, count) in &stats.by_category {
        println!("  {:<10} {}", category, count);
    }
    println!();
    println!("by page:");
    for page in &stats.by_page {
        println!("  {:>4}  {}", page.entries, page.page);
    }

    Ok(ExitCode::SUCCESS)
}

pub fn fmt(args: &FmtArgs) -> Result<ExitCode> {
    let raw = codec::read_text(&args.file)?;
    let parsed = codec::parse_str(&raw)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;

    let canonical = codec::to_string(&parsed.index, &Framing::documenter())?;
    let unchanged = canonical == raw;

    if args.check {
        if unchanged {
            info!("{} is canonical", args.file.display());
        } else {
            println!("{} is not canonical", args.file.display());
        }
        return Ok(exit_status(unchanged));
    }

    let target = args.output.as_deref().unwrap_or(args.file.as_path());
    if unchanged && target == args.file.as_path() {
        debug!("{} already canonical, not rewriting", target.display());
        return Ok(ExitCode::SUCCESS);
    }

    codec::atomic_write_text(target, &canonical, args.backup)?;
    info!("Wrote {} entries to {}", parsed.index.len(), target.display());
    Ok(ExitCode::SUCCESS)
}

pub fn search(args: &SearchArgs) -> Result<ExitCode> {
    let parsed = codec::read_file(&args.file)?;
    let index = DocIndex::from_search_index(&parsed.index)?;

    let query = SearchQuery {
        text: args.query.join(" "),
        categories: args.categories.clone(),
        pages: args.pages.clone(),
        limit: args.limit,
        offset: args.offset,
    };
    let result = index.search(&query)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(ExitCode::SUCCESS);
    }

    for hit in &result.hits {
        println!("{}  {}", hit.entry.location, hit.entry.title);
    }
    debug!(
        "{} of {} hits in {:.2}ms",
        result.hits.len(),
        result.total_count,
        result.query_time_ms
    );

    Ok(ExitCode::SUCCESS)
}

pub fn build(args: &BuildArgs) -> Result<ExitCode> {
    let parsed = codec::read_file(&args.file)?;
    let index = open_db(&args.db)?;

    index.load(&parsed.index)?;
    index.optimize_fts5()?;
    if let Err(e) = index.checkpoint_wal() {
        warn!("WAL checkpoint failed: {}", e);
    }

    info!(
        "Indexed {} entries from {} into {}",
        index.count()?,
        args.file.display(),
        args.db.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn open_db(path: &Path) -> Result<DocIndex> {
    DocIndex::new(path).with_context(|| format!("failed to open database {}", path.display()))
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

fn exit_status(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
