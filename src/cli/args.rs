use crate::config::BankConfig;
use crate::types::CurrencyCode;
use clap::Parser;
use std::time::Duration;

/// Run the bank engine demo: seed two accounts, process a few transactions,
/// and shut down
#[derive(Parser, Debug)]
#[command(name = "bank-sim")]
#[command(about = "Simulate a concurrent bank transaction engine", long_about = None)]
pub struct CliArgs {
    /// Number of concurrent workers
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of concurrent workers (default: 5)"
    )]
    pub workers: Option<usize>,

    /// Milliseconds between exchange rate updates
    #[arg(
        long = "rate-period-ms",
        value_name = "MILLIS",
        help = "Milliseconds between exchange rate updates (default: 1000)"
    )]
    pub rate_period_ms: Option<u64>,

    /// Milliseconds shutdown waits for workers to drain the queue
    #[arg(
        long = "shutdown-timeout-ms",
        value_name = "MILLIS",
        default_value_t = 5000,
        help = "Milliseconds shutdown waits for workers to drain the queue"
    )]
    pub shutdown_timeout_ms: u64,

    /// Currency whose rate is fixed at 1
    #[arg(
        long = "base-currency",
        value_name = "CODE",
        default_value = "USD",
        value_parser = parse_currency,
        help = "Currency whose rate is fixed at 1"
    )]
    pub base_currency: CurrencyCode,
}

fn parse_currency(value: &str) -> Result<CurrencyCode, String> {
    CurrencyCode::new(value).map_err(|e| e.to_string())
}

impl CliArgs {
    /// Create a BankConfig from CLI arguments
    ///
    /// Values that were not given fall back to the defaults; zero values are
    /// replaced by the defaults with a warning.
    pub fn to_bank_config(&self) -> BankConfig {
        let default = BankConfig::default();
        let config = if self.workers.is_some() || self.rate_period_ms.is_some() {
            BankConfig::new(
                self.workers.unwrap_or(default.workers),
                self.rate_period_ms
                    .map(Duration::from_millis)
                    .unwrap_or(default.rate_update_period),
            )
        } else {
            default
        };

        BankConfig {
            base_currency: self.base_currency.clone(),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
            ..config
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::all_defaults(&["program"], 5, Duration::from_secs(1))]
    #[case::custom_workers(&["program", "--workers", "8"], 8, Duration::from_secs(1))]
    #[case::custom_period(&["program", "--rate-period-ms", "250"], 5, Duration::from_millis(250))]
    #[case::all_custom(
        &["program", "--workers", "2", "--rate-period-ms", "100"],
        2,
        Duration::from_millis(100)
    )]
    #[case::zero_workers(&["program", "--workers", "0"], 5, Duration::from_secs(1))]
    fn test_bank_config_conversion(
        #[case] args: &[&str],
        #[case] expected_workers: usize,
        #[case] expected_period: Duration,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        let config = parsed.to_bank_config();

        assert_eq!(config.workers, expected_workers);
        assert_eq!(config.rate_update_period, expected_period);
    }

    #[test]
    fn test_base_currency_and_timeout() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--base-currency",
            "eur",
            "--shutdown-timeout-ms",
            "750",
        ])
        .unwrap();
        let config = parsed.to_bank_config();

        assert_eq!(config.base_currency.as_str(), "EUR");
        assert_eq!(config.shutdown_timeout, Duration::from_millis(750));
    }

    #[rstest]
    #[case::invalid_workers(&["program", "--workers", "many"])]
    #[case::invalid_currency(&["program", "--base-currency", "U$D"])]
    #[case::unknown_flag(&["program", "--strategy", "async"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
