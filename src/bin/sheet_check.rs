use anyhow::Result;
use feedback_form_lib::config::FeedbackConfig;
use feedback_form_lib::serial::SerialNumber;
use feedback_form_lib::sheets::{AppsScriptClient, SheetStore};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    feedback_form_lib::init_logging("info");

    let config = FeedbackConfig::load(None)?;
    let client = AppsScriptClient::from_config(&config)?;

    info!("🧪 Checking sheet '{}'", config.sheet_name);
    println!("\n=== RESPONSE SHEET CHECK ===\n");
    println!("Read URL: {}", client.read_url(&config.sheet_name));

    match client.read_sheet(&config.sheet_name).await {
        Ok(response) => {
            let rows = response.values.unwrap_or_default();
            println!("success: {}", response.success);
            println!("rows:    {}", rows.len());
            if let Some(header) = rows.first() {
                println!("first row: {}", serde_json::to_string(header)?);
            }
            match SerialNumber::next_from_rows(&rows) {
                Some(serial) if response.success => println!("next serial: {}", serial),
                _ => println!("next serial: {} (default)", SerialNumber::first()),
            }
        }
        Err(e) => {
            error!("❌ Sheet read failed: {}", e);
            println!("next serial: {} (default, read failed)", SerialNumber::first());
        }
    }

    println!("\n=== Check Complete ===");
    Ok(())
}
