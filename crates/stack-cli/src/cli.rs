//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stack_analysis::payload::StandardPayloadBuilder;
use stack_analysis::direct::HttpDirectAnalyzer;
use stack_analysis::{
    Collaborators, HttpClient, HttpClientConfig, StackAnalysisEngine, TokenValidation,
};
use stack_core::config::{ConfigOverrides, ConfigSource, LayeredConfigSource};
use stack_core::Ecosystem;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::console::{ConsoleHandler, ConsolePanel, FileDataProvider, ManifestCheck};

/// Dependency stack analysis for maven, npm, pypi, and golang projects
#[derive(Parser, Debug)]
#[command(name = "stack-analysis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit a project's dependency stack for analysis and show the report", long_about = None)]
pub struct Cli {
    /// Workspace root; defaults to the current directory
    #[arg(global = true, long = "workspace", short = 'w')]
    pub workspace: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(global = true, long = "json-logs")]
    pub json_logs: bool,

    /// Stack analysis service base URL
    #[arg(global = true, long = "host")]
    pub host: Option<String>,

    /// Key for the stack analysis service
    #[arg(global = true, long = "api-key")]
    pub api_key: Option<String>,

    /// Token validation and direct analysis service base URL
    #[arg(global = true, long = "crda-host")]
    pub crda_host: Option<String>,

    /// Vulnerability-provider token
    #[arg(global = true, long = "snyk-token")]
    pub snyk_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the dependencies of one project
    Analyze {
        /// maven, npm, pypi, or golang
        #[arg(long = "ecosystem", short = 'e')]
        ecosystem: Ecosystem,

        /// Manifest to analyze instead of the workspace default
        #[arg(long = "manifest", short = 'm')]
        manifest: Option<PathBuf>,

        /// Where the HTML report is written
        #[arg(long = "report-file")]
        report_file: Option<PathBuf>,
    },

    /// Check the configured vulnerability-provider token
    ValidateToken,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let workspace = match self.workspace {
            Some(ref dir) => dir.clone(),
            None => std::env::current_dir().context("cannot determine current directory")?,
        };

        let mut overrides = ConfigOverrides {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            crda_host: self.crda_host.clone(),
            crda_snyk_token: self.snyk_token.clone(),
            ..Default::default()
        };
        if let Commands::Analyze {
            report_file: Some(ref path),
            ..
        } = self.command
        {
            overrides.report_file_path = Some(path.clone());
        }

        let config = LayeredConfigSource::new(&workspace, overrides);
        // Surface config mistakes before any network work.
        config.load().context("invalid stack analysis configuration")?;

        let engine = build_engine(config)?;

        match self.command {
            Commands::Analyze {
                ecosystem,
                manifest,
                ..
            } => analyze(&engine, workspace, ecosystem, manifest).await,
            Commands::ValidateToken => validate_token(&engine).await,
        }
    }
}

fn build_engine(config: LayeredConfigSource) -> anyhow::Result<StackAnalysisEngine> {
    let client = HttpClient::new(HttpClientConfig::default())
        .context("failed to build HTTP client")?;
    let engine = StackAnalysisEngine::new(Collaborators {
        config: Arc::new(config),
        transport: Arc::new(client.clone()),
        data_provider: Arc::new(FileDataProvider),
        manifest_resolver: Arc::new(ManifestCheck),
        payload_builder: Arc::new(StandardPayloadBuilder),
        direct_analyzer: Arc::new(HttpDirectAnalyzer::new(client)),
    })
    .with_panel(Arc::new(ConsolePanel))
    .with_handler(Arc::new(ConsoleHandler));
    Ok(engine)
}

async fn analyze(
    engine: &StackAnalysisEngine,
    workspace: PathBuf,
    ecosystem: Ecosystem,
    manifest: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let request = stack_analysis::resolve(ecosystem, &workspace, manifest.as_deref());
    info!(ecosystem = %ecosystem, path = %request.target_path.display(), "starting stack analysis");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let outcome = engine.run_with_cancellation(&request, &cancel).await;
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn validate_token(engine: &StackAnalysisEngine) -> anyhow::Result<ExitCode> {
    match engine.validate_token().await {
        TokenValidation::Dispatched(handle) => {
            handle.await.context("token validation task failed")?;
            Ok(ExitCode::SUCCESS)
        }
        TokenValidation::MissingToken => Ok(ExitCode::SUCCESS),
        TokenValidation::Skipped { reason } => {
            eprintln!("token not validated: {reason}");
            Ok(ExitCode::FAILURE)
        }
    }
}
