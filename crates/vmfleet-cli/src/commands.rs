//! Command dispatch
//!
//! Everything that can be checked locally (credentials, API URL, host list)
//! is checked before the first remote request.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use eyre::{WrapErr, bail};
use tracing::info;
use vmfleet_client::{Credentials, HttpClient};
use vmfleet_core::{
    BatchAction, BatchOrchestrator, InventoryFormat, LineReporter, inventory_summary,
    list_inventory, load_hosts, summary_line,
};

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::config::Config;

/// Effective settings after layering CLI flags over the config file
#[derive(Debug, Clone)]
pub struct Settings {
    /// Host list path
    pub hosts: PathBuf,
    /// API credentials
    pub credentials: Credentials,
    /// VM collection URL
    pub api_url: String,
    /// Delay after each per-host call
    pub pacing: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,
}

impl Settings {
    /// Merge CLI flags (which already include the environment) over `config`
    ///
    /// # Errors
    /// Returns an error if the API URL or either credential is missing.
    pub fn resolve(args: &GlobalArgs, config: Config) -> eyre::Result<Self> {
        let Some(api_url) = args.api_url.clone().or(config.api.url.clone()) else {
            bail!("no API URL configured; pass --api-url, set VMFLEET_API_URL or api.url");
        };
        let Some(username) = non_empty(args.user.as_deref()) else {
            bail!("no API username given; pass --user or set VMFLEET_USERNAME");
        };
        let Some(password) = non_empty(args.passwd.as_deref()) else {
            bail!("no API password given; pass --passwd or set VMFLEET_PASSWORD");
        };

        Ok(Self {
            hosts: args.hosts.clone().unwrap_or(config.batch.hosts.clone()),
            credentials: Credentials::new(username, password),
            api_url,
            pacing: args
                .pacing_ms
                .map_or(config.batch.pacing(), Duration::from_millis),
            timeout: config.api.timeout(),
            accept_invalid_certs: config.api.accept_invalid_certs,
        })
    }

    /// Build the HTTP client for the management API
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or TLS setup fails.
    pub fn client(&self) -> eyre::Result<HttpClient> {
        HttpClient::builder(&self.api_url, self.credentials.clone())
            .timeout(self.timeout)
            .accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .wrap_err_with(|| format!("cannot create API client for {}", self.api_url))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Run the selected command and return its summary line
///
/// # Errors
/// Returns an error for input, configuration, or whole-operation failures.
/// Per-host failures in batch commands are reported inline instead.
pub async fn run(cli: Cli, config: Config) -> eyre::Result<String> {
    let settings = Settings::resolve(&cli.global, config)?;

    match cli.command {
        Commands::Up => run_batch(&settings, BatchAction::Start).await,
        Commands::Down => run_batch(&settings, BatchAction::Stop).await,
        Commands::Status => run_batch(&settings, BatchAction::Status).await,
        Commands::List { output, xml } => {
            let format = if xml {
                InventoryFormat::Xml
            } else {
                InventoryFormat::Rows
            };
            run_list(&settings, output.as_deref(), format).await
        }
    }
}

async fn run_batch(settings: &Settings, action: BatchAction) -> eyre::Result<String> {
    let hosts = load_hosts(&settings.hosts)?;
    let api = Arc::new(settings.client()?);

    info!(%action, hosts = hosts.len(), api = %api.base_url(), "running batch");

    let orchestrator = BatchOrchestrator::new(api).with_pacing(settings.pacing);
    let mut reporter = LineReporter::new(std::io::stdout());
    let result = orchestrator.run_batch(&hosts, action, &mut reporter).await;

    Ok(summary_line(action, &result))
}

async fn run_list(
    settings: &Settings,
    output: Option<&Path>,
    format: InventoryFormat,
) -> eyre::Result<String> {
    let api = settings.client()?;

    let (count, destination) = match output {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("cannot create {}", path.display()))?;
            let count = list_inventory(&api, format, BufWriter::new(file)).await?;
            (count, path.display().to_string())
        }
        None => {
            let count = list_inventory(&api, format, std::io::stdout().lock()).await?;
            (count, "<stdout>".to_string())
        }
    };

    Ok(inventory_summary(format, count, &destination))
}
