//! Export orchestration
//!
//! One export reads the records of a section, builds the report rows and
//! turns them into a new, formatted spreadsheet in the destination folder.

pub mod orchestrator;

pub use orchestrator::{spreadsheet_link, ExportOrchestrator, ROOT_FOLDER};
