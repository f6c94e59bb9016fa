//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "crm-reports.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing crm-reports configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} if the defaults do not fit", self.output);
                println!("  2. Import a credential file:");
                println!("     crm-reports settings import service-account <key.json>");
                println!("     or: crm-reports settings import client-secret <client_secret.json>");
                println!("  3. Optionally choose a destination folder:");
                println!("     crm-reports settings set --folder-id <drive folder id>");
                println!("  4. Validate configuration: crm-reports validate-config");
                println!("  5. Run export: crm-reports export clients");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Sample configuration with every default spelled out
    fn generate_config() -> String {
        r#"# crm-reports configuration
# Values of the form ${VAR} are read from the environment (or .env).
# Any key can be overridden with CRM_REPORTS_<SECTION>_<KEY>.

[application]
log_level = "info"

[google]
sheets_base_url = "https://sheets.googleapis.com/v4"
drive_base_url = "https://www.googleapis.com/drive/v3"
timeout_seconds = 60
value_input_option = "USER_ENTERED"  # USER_ENTERED | RAW

[google.retry]
max_attempts = 3
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 2.0

[settings]
# Folder id and credential paths are stored here by `crm-reports settings`
path = "config/google_export_settings.json"
credentials_dir = "config"

[export]
max_records = 2000
highlight_status = true
auto_resize_columns = true
# default_folder_id = "${CRM_REPORTS_FOLDER}"

[records]
# Directory holding clients.json, deals.json and tasks.json
data_dir = "data"

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "daily"  # daily | hourly | never
local_max_size_mb = 100
"#
        .to_string()
    }
}
