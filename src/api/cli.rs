use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::services::ServiceConfig;

#[derive(Parser, Debug)]
#[command(
    name = "budgetsim",
    about = "Six-month bi-weekly budget simulator with savings and revolving debt"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON game API for a UI shell
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        env = "BUDGETSIM_COST_ESTIMATE_URL",
        help = "Endpoint estimating housing, utility and tax for a location; defaults when unset"
    )]
    pub cost_estimate_url: Option<String>,
    #[arg(
        long,
        env = "BUDGETSIM_ADVICE_URL",
        help = "Endpoint writing advice about a round's allocations; a fixed tip applies when unset"
    )]
    pub advice_url: Option<String>,
    #[arg(
        long,
        env = "BUDGETSIM_SERVICE_TIMEOUT_MS",
        default_value_t = 10_000,
        help = "Timeout for each collaborator request in milliseconds"
    )]
    pub service_timeout_ms: u64,
}

impl ServeArgs {
    pub fn service_config(&self) -> Result<ServiceConfig, String> {
        if self.service_timeout_ms == 0 {
            return Err("--service-timeout-ms must be > 0".to_string());
        }

        Ok(ServiceConfig {
            cost_estimate_url: endpoint("--cost-estimate-url", self.cost_estimate_url.as_deref())?,
            advice_url: endpoint("--advice-url", self.advice_url.as_deref())?,
            timeout: Duration::from_millis(self.service_timeout_ms),
        })
    }
}

fn endpoint(name: &str, raw: Option<&str>) -> Result<Option<String>, String> {
    let Some(url) = raw.map(str::trim).filter(|url| !url.is_empty()) else {
        return Ok(None);
    };
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("{name} must be an http:// or https:// URL"));
    }
    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_args(extra: &[&str]) -> ServeArgs {
        let mut argv = vec!["budgetsim", "serve"];
        argv.extend_from_slice(extra);
        let Cli {
            command: Command::Serve(args),
        } = Cli::try_parse_from(argv).expect("valid arguments");
        args
    }

    #[test]
    fn serve_defaults_to_port_8080() {
        let args = serve_args(&[]);
        assert_eq!(args.port, 8080);
        assert!(Cli::try_parse_from(["budgetsim"]).is_err());
    }

    #[test]
    fn service_config_trims_and_keeps_urls() {
        let args = serve_args(&[
            "--port",
            "9000",
            "--cost-estimate-url",
            " http://localhost:5000/estimate ",
            "--advice-url",
            "https://advice.example/api",
            "--service-timeout-ms",
            "2500",
        ]);
        let config = args.service_config().expect("valid config");
        assert_eq!(args.port, 9000);
        assert_eq!(
            config.cost_estimate_url.as_deref(),
            Some("http://localhost:5000/estimate")
        );
        assert_eq!(
            config.advice_url.as_deref(),
            Some("https://advice.example/api")
        );
        assert_eq!(config.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn service_config_rejects_zero_timeout() {
        let mut args = serve_args(&[]);
        args.service_timeout_ms = 0;
        let err = args.service_config().expect_err("must reject zero timeout");
        assert!(err.contains("--service-timeout-ms"));
    }

    #[test]
    fn service_config_rejects_non_http_url() {
        let mut args = serve_args(&[]);
        args.advice_url = Some("ftp://example".to_string());
        let err = args.service_config().expect_err("must reject scheme");
        assert!(err.contains("--advice-url"));

        args.advice_url = Some("   ".to_string());
        assert_eq!(args.service_config().expect("blank is unset").advice_url, None);
    }
}
