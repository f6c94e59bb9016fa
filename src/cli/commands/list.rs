//! List command implementation
//!
//! Shows the reports already exported for one section or for all of them.

use super::{load_validated, report_failure};
use crate::core::service::ReportService;
use crate::domain::{FileDescriptor, ReportError, Section};
use clap::Args;
use std::str::FromStr;

/// Which sections to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    All,
    One(Section),
}

impl FromStr for ListTarget {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(ListTarget::All);
        }
        s.parse().map(ListTarget::One)
    }
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Section to list (clients, deals, tasks or all)
    #[arg(default_value = "all")]
    pub target: ListTarget,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(listing = ?self.target, "Listing reports");

        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let service = match ReportService::from_config(&config).await {
            Ok(s) => s,
            Err(e) => return Ok(report_failure("Failed to initialize listing", &e)),
        };

        let listings = match self.target {
            ListTarget::All => service.list_all().await,
            ListTarget::One(section) => service
                .list_files(section)
                .await
                .map(|files| vec![(section, files)]),
        };
        let listings = match listings {
            Ok(l) => l,
            Err(e) => return Ok(report_failure("Failed to list reports", &e)),
        };

        println!("📊 Exported reports");
        for (section, files) in listings {
            println!();
            print_section(section, &files);
        }
        println!();
        Ok(0)
    }
}

fn print_section(section: Section, files: &[FileDescriptor]) {
    println!("{} ({})", section.title_prefix(), files.len());
    if files.is_empty() {
        println!("  No reports found. Run 'crm-reports export {section}' to create one.");
        return;
    }
    println!("  {:<45} {:<20} {}", "Name", "Modified", "Id");
    println!("  {}", "-".repeat(100));
    for file in files {
        let modified = file
            .modified_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<45} {:<20} {}", file.name, modified, file.id);
    }
}
