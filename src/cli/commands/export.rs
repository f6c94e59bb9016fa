//! Export command implementation
//!
//! This module implements the `export` command, which turns the records of
//! one section into a new spreadsheet.

use super::{load_validated, report_failure};
use crate::adapters::records::JsonDirEntityProvider;
use crate::config::ReportsConfig;
use crate::core::service::ReportService;
use crate::domain::{CellValue, Section};
use clap::Args;
use std::sync::Arc;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Section to export (clients, deals, tasks)
    pub section: Section,

    /// Destination folder id, overriding the saved settings
    #[arg(long)]
    pub folder: Option<String>,

    /// Dry run mode - export into an in-process workspace and print the rows
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(section = %self.section, dry_run = self.dry_run, "Starting export command");

        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if self.dry_run {
            return self.dry_run(&config).await;
        }

        let service = match ReportService::from_config(&config).await {
            Ok(s) => s,
            Err(e) => return Ok(report_failure("Failed to initialize export", &e)),
        };

        println!("🚀 Exporting {}...", self.section);
        match service.export(self.section, self.folder.as_deref()).await {
            Ok(result) => {
                println!("✅ Export completed");
                println!();
                println!("  Title:   {}", result.title);
                println!("  Rows:    {}", result.record_count);
                println!("  File id: {}", result.file_id);
                println!("  Link:    {}", result.web_view_link);
                println!();
                Ok(0)
            }
            Err(e) => Ok(report_failure("Export failed", &e)),
        }
    }

    async fn dry_run(&self, config: &ReportsConfig) -> anyhow::Result<i32> {
        println!("🔍 DRY RUN MODE - nothing is written to Google");
        println!();

        let entities = Arc::new(JsonDirEntityProvider::new(&config.records.data_dir));
        let (service, workspace) = match ReportService::in_memory(config, entities).await {
            Ok(pair) => pair,
            Err(e) => return Ok(report_failure("Failed to initialize export", &e)),
        };
        if let Some(folder) = self.folder.as_deref() {
            workspace.create_folder(folder);
        }

        let result = match service.export(self.section, self.folder.as_deref()).await {
            Ok(r) => r,
            Err(e) => return Ok(report_failure("Export failed", &e)),
        };

        println!("Title: {}", result.title);
        println!(
            "Destination: {}",
            service
                .resolve_folder(self.folder.as_deref())
                .await
                .unwrap_or_else(|| "root".to_string())
        );
        println!();
        if let Some(sheet) = workspace
            .file(&result.file_id)
            .and_then(|file| file.sheets.into_iter().next())
        {
            for row in &sheet.cells {
                println!("{}", format_row(row));
            }
        }
        println!();
        println!("{} record(s) would be exported", result.record_count);
        Ok(0)
    }
}

fn format_row(row: &[CellValue]) -> String {
    row.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\t")
}
