use anyhow::Result;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

pub mod commands;
pub mod config;
pub mod form;
pub mod record;
pub mod serial;
pub mod sheets;
pub mod validation;
pub mod view;

use crate::commands::{AppState, FieldUpdatePayload, SubmitFeedbackPayload};
use crate::config::FeedbackConfig;
use crate::form::View;
use crate::record::Field;
use crate::sheets::SheetStore;

/// Sets up `env_logger`, seeding the filter from `level` unless `RUST_LOG` is set.
pub fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).format_timestamp_secs().try_init();
}

pub fn log_config_status(config: &FeedbackConfig) {
    info!("Feedback form writing to sheet '{}'", config.sheet_name);
    match config.request_timeout() {
        Some(timeout) => info!("Request timeout: {}s", timeout.as_secs()),
        None => warn!("No request timeout configured - a hung request keeps the form submitting"),
    }
}

/// Interactive session on stdin/stdout: the terminal plays the host page.
pub async fn run(config: FeedbackConfig) -> Result<()> {
    log_config_status(&config);
    let state = AppState::from_config(&config).map_err(anyhow::Error::msg)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    run_session(&state, &mut lines).await
}

async fn run_session<S: SheetStore>(state: &AppState<S>, lines: &mut Lines<BufReader<Stdin>>) -> Result<()> {
    let mut stdout = tokio::io::stdout();

    loop {
        let snapshot = commands::get_form_snapshot(state);
        stdout.write_all(view::render(&snapshot, state.branding()).as_bytes()).await?;

        match snapshot.view {
            View::Success => {
                stdout.write_all(b"\nPress Enter to submit another response, or q to quit: ").await?;
                stdout.flush().await?;
                match lines.next_line().await? {
                    Some(answer) if answer.trim().eq_ignore_ascii_case("q") => break,
                    None => break,
                    Some(_) => {
                        commands::submit_another(state);
                    }
                }
            }
            View::Form => {
                for field in Field::ALL {
                    let current = snapshot.fields.get(field);
                    let prompt = if current.is_empty() {
                        format!("{}: ", view::field_label(field))
                    } else {
                        format!("{} [{}]: ", view::field_label(field), current)
                    };
                    stdout.write_all(prompt.as_bytes()).await?;
                    stdout.flush().await?;

                    let Some(input) = lines.next_line().await? else {
                        return Ok(());
                    };
                    // Blank input keeps the current value.
                    if !input.trim().is_empty() {
                        commands::update_field(
                            FieldUpdatePayload { field: field.as_str().to_string(), value: input.trim().to_string() },
                            state,
                        )
                        .map_err(anyhow::Error::msg)?;
                    }
                }

                stdout.write_all(b"\n[s]ubmit, [c]ancel or [q]uit: ").await?;
                stdout.flush().await?;
                let Some(choice) = lines.next_line().await? else {
                    break;
                };

                match choice.trim().to_ascii_lowercase().as_str() {
                    "q" | "quit" => break,
                    "c" | "cancel" => {
                        commands::cancel_form(state);
                    }
                    _ => {
                        stdout.write_all(b"Submitting...\n").await?;
                        stdout.flush().await?;
                        if let Err(e) = commands::submit_feedback(SubmitFeedbackPayload::default(), state).await {
                            warn!("{}", e);
                        }
                    }
                }
            }
        }

        stdout.write_all(b"\n").await?;
    }

    info!("Feedback session closed");
    Ok(())
}
