//! feedback-form - contact feedback form backed by a response spreadsheet.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedback_form_lib::commands::{self, AppState, SubmitFeedbackPayload};
use feedback_form_lib::config::FeedbackConfig;
use feedback_form_lib::view;

#[derive(Parser, Debug)]
#[command(name = "feedback-form")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to ./feedback.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill in and submit the form interactively (default)
    Interactive,

    /// Submit one response and exit
    Submit {
        #[arg(long)]
        name: String,

        /// 10-digit mobile number
        #[arg(long)]
        mobile: String,

        #[arg(long)]
        city: String,

        #[arg(long, default_value = "")]
        company: String,
    },

    /// Print the serial number the next response would receive
    NextSerial,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    feedback_form_lib::init_logging(&cli.log_level);

    let config = FeedbackConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => feedback_form_lib::run(config).await,
        Commands::Submit { name, mobile, city, company } => {
            feedback_form_lib::log_config_status(&config);
            let state = AppState::from_config(&config).map_err(anyhow::Error::msg)?;

            let payload = SubmitFeedbackPayload {
                name: Some(name),
                mobile: Some(mobile),
                city: Some(city),
                company: Some(company),
            };
            let response = commands::submit_feedback(payload, &state)
                .await
                .map_err(anyhow::Error::msg)?;

            print!("{}", view::render(&response.form, state.branding()));
            if !response.accepted {
                std::process::exit(1);
            }
            if let Some(serial) = response.serial_number {
                println!("Serial number: {}", serial);
            }
            Ok(())
        }
        Commands::NextSerial => {
            let state = AppState::from_config(&config).map_err(anyhow::Error::msg)?;
            println!("{}", commands::next_serial(&state).await);
            Ok(())
        }
    }
}
