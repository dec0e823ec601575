//! # dateline
//!
//! A keyword news collector that reconciles publication dates from messy
//! on-page signals and builds an incremental CSV dataset.
//!
//! ## Features
//!
//! - Discovers articles per keyword and date window via the Google News
//!   RSS search feed
//! - Harvests date candidates from structured data, metadata tags, and
//!   CSS selectors, all driven by configurable rule lists
//! - Reconciles each page's candidates against the untrusted feed date
//!   (first match wins, first signal as fallback)
//! - Writes three diagnostic channels plus an append-only CSV dataset,
//!   so interrupted runs keep everything collected so far
//!
//! ## Usage
//!
//! ```sh
//! dateline "банковский вклад" -s 2025-12-01 -e 2025-12-31
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Discovery**: Search the news feed for each date window
//! 2. **Fetching**: Download each article page with retries
//! 3. **Reconciliation**: Collect date signals and choose one per page
//! 4. **Output**: Summarize the body and append records per window

use chrono::Duration as ChronoDuration;
use clap::Parser;
use rand::Rng;
use scraper::Html;
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod collect;
mod config;
mod diagnostics;
mod discovery;
mod fetch;
mod models;
mod outputs;
mod parse;
mod reconcile;
mod summarize;

use cli::Cli;
use collect::SignalCollector;
use config::SourceRules;
use diagnostics::{DiagnosticsSink, FileDiagnostics};
use fetch::PageFetcher;
use models::{ArticleRecord, NewsHit};
use parse::{DateStringParser, ParserConfig};
use reconcile::{DateReconciler, MatchPolicy};
use summarize::{extract_body_text, summarize};

const SUMMARY_SENTENCES: usize = 3;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("dateline starting up");

    let args = Cli::parse();
    debug!(?args.keyword, ?args.start_date, ?args.end_date, "Parsed CLI arguments");
    if args.start_date > args.end_date {
        return Err("start date is after end date".into());
    }

    // --- Rules, parser, pipeline stages ---
    let rules = match &args.rules {
        Some(path) => SourceRules::from_yaml_file(Path::new(path))?,
        None => SourceRules::default(),
    };
    let parser = DateStringParser::new(&ParserConfig::default())?;
    let collector = SignalCollector::new(rules.clone(), parser.clone());
    let policy = MatchPolicy {
        require_time: !args.match_date_only,
        ..MatchPolicy::default()
    };
    let reconciler = DateReconciler::new(policy, parser);
    let mut sink = FileDiagnostics::create(Path::new(&args.log_dir))?;
    let fetcher = PageFetcher::default();
    let feed_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(20))
        .build()?;

    let output_path = args.output_path();
    info!(output = %output_path, log_dir = %args.log_dir, "Pipeline initialized");

    // --- Window loop over the date range ---
    let mut seen: HashSet<String> = HashSet::new();
    let mut total_records = 0usize;
    let mut failed_urls = 0usize;
    let end_exclusive = args.end_date + ChronoDuration::days(1);
    let mut current = args.start_date;

    while current < end_exclusive {
        let window_end = std::cmp::min(
            current + ChronoDuration::days(args.window_days.max(1) as i64),
            end_exclusive,
        );
        info!(from = %current, to = %window_end, "Processing window");

        let hits = match discovery::search_news(
            &feed_client,
            &args.keyword,
            current,
            window_end,
            args.max_results,
            &rules,
        )
        .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(from = %current, error = %e, "Feed search failed; skipping window");
                current = window_end;
                continue;
            }
        };

        let mut records = Vec::new();
        for hit in &hits {
            if !seen.insert(hit.url.clone()) {
                debug!(url = %hit.url, "Already processed");
                continue;
            }
            match process_hit(hit, &fetcher, &collector, &reconciler, &rules, &mut sink).await {
                Some(record) => records.push(record),
                None => failed_urls += 1,
            }
            // politeness delay between article fetches
            let pause = rand::rng().random_range(500..1500);
            tokio::time::sleep(std::time::Duration::from_millis(pause)).await;
        }

        total_records += records.len();
        outputs::dataset::append_records(Path::new(&output_path), &records)?;
        current = window_end;
    }

    info!(
        total_records,
        failed_urls,
        elapsed_secs = start_time.elapsed().as_secs(),
        "dateline finished"
    );
    Ok(())
}

/// Fetch one discovered article and turn it into a dataset record.
///
/// Every failure mode returns `None` after reporting to the sink; one bad
/// page never stops the run.
#[instrument(skip_all, fields(url = %hit.url))]
async fn process_hit(
    hit: &NewsHit,
    fetcher: &PageFetcher,
    collector: &SignalCollector,
    reconciler: &DateReconciler,
    rules: &SourceRules,
    sink: &mut dyn DiagnosticsSink,
) -> Option<ArticleRecord> {
    let page = match fetcher.fetch(&hit.url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %hit.url, error = %e, "Fetch failed");
            sink.url_warning(&hit.url, &format!("FETCH | {e}"));
            return None;
        }
    };

    // redirects can land on an excluded domain the feed URL hid
    if discovery::is_excluded(&page.final_url, rules) {
        debug!(url = %page.final_url, "Excluded domain after redirect");
        return None;
    }
    if let Some(marker) = rules
        .block_markers
        .iter()
        .find(|m| page.body.contains(m.as_str()))
    {
        warn!(url = %page.final_url, marker = %marker, "Block page detected");
        sink.url_warning(&page.final_url, "BLOCKED | interstitial page");
        return None;
    }

    let doc = Html::parse_document(&page.body);
    let signals = collector.collect(&doc, &page.final_url);
    let result = reconciler.reconcile(&signals, Some(&hit.published_raw), &page.final_url, sink);

    match &result.chosen {
        Some(chosen) => sink.date_resolved(&page.final_url, chosen, result.matched),
        None => sink.url_warning(&page.final_url, "EMPTY | no date elements found"),
    }

    let body_text = extract_body_text(&doc);
    let summary = summarize(&body_text, SUMMARY_SENTENCES);

    Some(ArticleRecord {
        reference_date: hit.published_raw.clone(),
        reconciled_date: result.chosen.map(|ts| ts.to_string()),
        title: hit.title.clone(),
        url: page.final_url,
        summary,
    })
}
