//! Command-line interface definitions for the news check service.
//!
//! All arguments can be provided via command-line flags or environment
//! variables, so the service can be configured entirely from a container
//! or PaaS environment.

use clap::Parser;

/// Command-line arguments for the news check service.
///
/// # Examples
///
/// ```sh
/// # Listen on the default 0.0.0.0:5000 with the built-in sources
/// news_check
///
/// # Port from the platform, sources from a file
/// PORT=8080 news_check --sources-file ./sources.yaml
///
/// # Query sources one at a time, with fewer retries
/// news_check --sequential --max-retries 1
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// YAML file listing sources (`name`, `url_template`); built-in sources when absent
    #[arg(long, env = "NEWS_CHECK_SOURCES")]
    pub sources_file: Option<String>,

    /// YAML file mapping literal queries to canned verdicts
    #[arg(long, env = "NEWS_CHECK_CANNED")]
    pub canned_file: Option<String>,

    /// Retries per source after the first failed attempt
    #[arg(long, env = "NEWS_CHECK_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "NEWS_CHECK_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Delay before the first retry, doubled on each subsequent retry
    #[arg(long, env = "NEWS_CHECK_BASE_DELAY_MS", default_value_t = 1000)]
    pub base_delay_ms: u64,

    /// Maximum articles kept from each source
    #[arg(long, env = "NEWS_CHECK_PER_SOURCE_CAP", default_value_t = 5)]
    pub per_source_cap: usize,

    /// Largest number of sources fetched at the same time
    #[arg(long, env = "NEWS_CHECK_MAX_CONCURRENT", default_value_t = 4)]
    pub max_concurrent_sources: usize,

    /// Largest search page body accepted, in bytes
    #[arg(long, env = "NEWS_CHECK_MAX_BODY_BYTES", default_value_t = crate::fetch::MAX_RESPONSE_BYTES)]
    pub max_body_bytes: usize,

    /// Query sources one after another instead of concurrently
    #[arg(long)]
    pub sequential: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_check",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--sources-file",
            "./sources.yaml",
        ]);

        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.sources_file.as_deref(), Some("./sources.yaml"));
        assert!(!cli.sequential);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_check", "-p", "7000", "--sequential"]);

        assert_eq!(cli.port, 7000);
        assert!(cli.sequential);
        assert_eq!(cli.max_concurrent_sources, 4);
    }

    #[test]
    fn test_cli_rejects_bad_port() {
        assert!(Cli::try_parse_from(["news_check", "--port", "not-a-port"]).is_err());
    }
}
