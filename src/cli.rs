//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for the dateline collector.
///
/// # Examples
///
/// ```sh
/// # Collect articles about a keyword across a date range
/// dateline "банковский вклад" --start-date 2025-12-01 --end-date 2025-12-31
///
/// # Custom output file and scanning rules
/// dateline "ставка" -s 2025-12-01 -e 2025-12-07 -o rates.csv --rules rules.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search keyword or phrase
    pub keyword: String,

    /// First day of the collection range (YYYY-MM-DD)
    #[arg(short, long)]
    pub start_date: NaiveDate,

    /// Last day of the collection range, inclusive (YYYY-MM-DD)
    #[arg(short, long)]
    pub end_date: NaiveDate,

    /// Days per search window
    #[arg(short, long, default_value_t = 3)]
    pub window_days: u32,

    /// Maximum feed results per window
    #[arg(short, long, default_value_t = 100)]
    pub max_results: usize,

    /// Output CSV path (default: derived from the keyword)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory for diagnostic log files
    #[arg(long, default_value = "logs")]
    pub log_dir: String,

    /// Optional path to a YAML file overriding the scanning rules
    #[arg(long)]
    pub rules: Option<String>,

    /// Let date-only signals count as reference matches
    #[arg(long)]
    pub match_date_only: bool,
}

impl Cli {
    /// The output path, derived from the keyword unless given explicitly.
    pub fn output_path(&self) -> String {
        self.output.clone().unwrap_or_else(|| {
            format!(
                "{}_{}day_news.csv",
                self.keyword.replace(' ', "_"),
                self.window_days
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(&[
            "dateline",
            "банковский вклад",
            "--start-date",
            "2025-12-01",
            "--end-date",
            "2025-12-31",
        ]);

        assert_eq!(cli.keyword, "банковский вклад");
        assert_eq!(cli.start_date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(cli.window_days, 3);
        assert_eq!(cli.max_results, 100);
        assert!(!cli.match_date_only);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(&[
            "dateline",
            "ставка",
            "-s",
            "2025-12-01",
            "-e",
            "2025-12-07",
            "-w",
            "1",
            "-o",
            "rates.csv",
        ]);

        assert_eq!(cli.window_days, 1);
        assert_eq!(cli.output_path(), "rates.csv");
    }

    #[test]
    fn test_default_output_path_from_keyword() {
        let cli = Cli::parse_from(&[
            "dateline",
            "банковский вклад",
            "-s",
            "2025-12-01",
            "-e",
            "2025-12-31",
        ]);
        assert_eq!(cli.output_path(), "банковский_вклад_3day_news.csv");
    }
}
