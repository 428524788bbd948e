use anyhow::Context;
use clap::{Parser, Subcommand};
use qtest_teams_relay::{
    config::Config,
    enrichment::EnrichmentPipeline,
    models::{test_run_url, InboundEvent, ResourceId, StatusColor, TestRunSummary},
    notifications::TeamsMessage,
};
use reqwest::Client;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "qTest Teams relay CLI", long_about = None)]
struct Cli {
    /// Base URL of a running relay
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once, locally, for an event read from a JSON file
    Process {
        /// Path to a test-log webhook payload
        #[arg(short, long)]
        event: PathBuf,

        /// Relay configuration file (defaults to $RELAY_CONFIG_PATH)
        #[arg(short, long, env = "RELAY_CONFIG_PATH")]
        config: Option<PathBuf>,
    },

    /// Send a synthetic test-log event to a running relay
    Trigger {
        #[arg(short, long)]
        project_id: String,

        #[arg(short, long)]
        testrun_id: String,
    },

    /// Print the Adaptive Card that would be posted, without any network call
    Preview {
        #[arg(long)]
        host: String,

        #[arg(long)]
        project_id: String,

        #[arg(long)]
        testrun_id: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        suite: String,

        #[arg(long)]
        run: String,

        #[arg(long, default_value = "Passed")]
        status: String,
    },

    /// Check relay health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qtest_teams_relay=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Process { event, config } => {
            let config = match config {
                Some(path) => Config::load_from(&path),
                None => Config::load(),
            }
            .context("Failed to load configuration")?;

            let raw = std::fs::read_to_string(&event)
                .with_context(|| format!("Failed to read {}", event.display()))?;
            let event: InboundEvent = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a test-log event", event.display()))?;

            let pipeline = EnrichmentPipeline::from_config(&config)?;
            let outcome = pipeline.process(&event).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Trigger {
            project_id,
            testrun_id,
        } => {
            let event = InboundEvent::new(project_id.as_str(), testrun_id.as_str());
            let response = client
                .post(format!("{}/v1/webhooks/testlog", cli.endpoint))
                .json(&event)
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Preview {
            host,
            project_id,
            testrun_id,
            project,
            suite,
            run,
            status,
        } => {
            let summary = TestRunSummary {
                project_name: project,
                test_suite_name: suite,
                test_run_name: run,
                status_color: StatusColor::for_status(&status),
                status,
                test_run_url: test_run_url(
                    &host,
                    &ResourceId::new(project_id),
                    &ResourceId::new(testrun_id),
                ),
            };

            eprintln!("{}", summary.message());
            let message = TeamsMessage::for_test_run(&summary);
            println!("{}", serde_json::to_string_pretty(&message)?);
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
