//! CRM records handed to the report builder
//!
//! The CRUD layer owns these records; the exporter only reads them. Each
//! record answers the typed fields named by its section's schema through
//! [`Record::field`].

use crate::domain::section::{ColumnKey, Section};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Client lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    Active,
    Archived,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Archived => "archived",
        }
    }
}

/// Deal pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    #[default]
    Draft,
    InProgress,
    Won,
    Lost,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Draft => "draft",
            DealStatus::InProgress => "in_progress",
            DealStatus::Won => "won",
            DealStatus::Lost => "lost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub title: String,
    pub client_id: i64,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: DealStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<i64>,
    #[serde(default)]
    pub deal_id: Option<i64>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Typed value of one record field before it becomes a cell
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Decimal(Option<f64>),
    Bool(bool),
    Date(Option<NaiveDate>),
    /// The record has no such field
    Missing,
}

/// A record of any section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Client(Client),
    Deal(Deal),
    Task(Task),
}

fn date_of(ts: &Option<DateTime<Utc>>) -> FieldValue {
    FieldValue::Date(ts.map(|t| t.date_naive()))
}

impl Record {
    /// Section the record belongs to
    pub fn section(&self) -> Section {
        match self {
            Record::Client(_) => Section::Clients,
            Record::Deal(_) => Section::Deals,
            Record::Task(_) => Section::Tasks,
        }
    }

    /// Reads the field behind a column
    pub fn field(&self, key: ColumnKey) -> FieldValue {
        use ColumnKey as K;
        match self {
            Record::Client(c) => match key {
                K::Id => FieldValue::Integer(Some(c.id)),
                K::Name => FieldValue::Text(Some(c.name.clone())),
                K::Email => FieldValue::Text(c.email.clone()),
                K::Phone => FieldValue::Text(c.phone.clone()),
                K::Status => FieldValue::Text(Some(c.status.as_str().to_string())),
                K::Notes => FieldValue::Text(c.notes.clone()),
                K::CreatedAt => date_of(&c.created_at),
                K::UpdatedAt => date_of(&c.updated_at),
                _ => FieldValue::Missing,
            },
            Record::Deal(d) => match key {
                K::Id => FieldValue::Integer(Some(d.id)),
                K::Title => FieldValue::Text(Some(d.title.clone())),
                K::ClientId => FieldValue::Integer(Some(d.client_id)),
                K::Amount => FieldValue::Decimal(d.amount),
                K::Status => FieldValue::Text(Some(d.status.as_str().to_string())),
                K::Notes => FieldValue::Text(d.notes.clone()),
                K::CreatedAt => date_of(&d.created_at),
                K::UpdatedAt => date_of(&d.updated_at),
                _ => FieldValue::Missing,
            },
            Record::Task(t) => match key {
                K::Id => FieldValue::Integer(Some(t.id)),
                K::Title => FieldValue::Text(Some(t.title.clone())),
                K::Description => FieldValue::Text(t.description.clone()),
                K::ClientId => FieldValue::Integer(t.client_id),
                K::DealId => FieldValue::Integer(t.deal_id),
                K::Completed => FieldValue::Bool(t.is_completed),
                K::DueDate => date_of(&t.due_date),
                K::CreatedAt => date_of(&t.created_at),
                K::UpdatedAt => date_of(&t.updated_at),
                _ => FieldValue::Missing,
            },
        }
    }

    /// Value used to pick the status highlight color
    pub fn status_key(&self) -> String {
        match self {
            Record::Client(c) => c.status.as_str().to_string(),
            Record::Deal(d) => d.status.as_str().to_string(),
            Record::Task(t) => t.is_completed.to_string(),
        }
    }
}

/// Parses a JSON array of records of one section
///
/// Untagged deserialization alone can't tell sections apart reliably, so the
/// caller names the section and each element is decoded as that type.
pub fn records_from_json(section: Section, json: &str) -> serde_json::Result<Vec<Record>> {
    Ok(match section {
        Section::Clients => serde_json::from_str::<Vec<Client>>(json)?
            .into_iter()
            .map(Record::Client)
            .collect(),
        Section::Deals => serde_json::from_str::<Vec<Deal>>(json)?
            .into_iter()
            .map(Record::Deal)
            .collect(),
        Section::Tasks => serde_json::from_str::<Vec<Task>>(json)?
            .into_iter()
            .map(Record::Task)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_json_with_nulls() {
        let json = r#"[{"id":1,"name":"Acme","email":"a@x.com","phone":null,"status":"active","notes":null}]"#;
        let records = records_from_json(Section::Clients, json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].section(), Section::Clients);
        assert_eq!(records[0].field(ColumnKey::Phone), FieldValue::Text(None));
        assert_eq!(records[0].field(ColumnKey::Id), FieldValue::Integer(Some(1)));
    }

    #[test]
    fn test_deal_status_snake_case() {
        let json = r#"[{"id":7,"title":"Renewal","client_id":1,"amount":1500.5,"status":"in_progress"}]"#;
        let records = records_from_json(Section::Deals, json).unwrap();
        assert_eq!(records[0].status_key(), "in_progress");
        assert_eq!(
            records[0].field(ColumnKey::Amount),
            FieldValue::Decimal(Some(1500.5))
        );
    }

    #[test]
    fn test_task_dates_are_date_only() {
        let json = r#"[{"id":3,"title":"Call","due_date":"2025-04-01T16:30:00Z","is_completed":true}]"#;
        let records = records_from_json(Section::Tasks, json).unwrap();
        assert_eq!(
            records[0].field(ColumnKey::DueDate),
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 4, 1))
        );
        assert_eq!(records[0].status_key(), "true");
    }

    #[test]
    fn test_foreign_field_is_missing() {
        let client = Record::Client(Client {
            id: 1,
            name: "Acme".to_string(),
            email: None,
            phone: None,
            status: ClientStatus::Active,
            notes: None,
            created_at: None,
            updated_at: None,
        });
        assert_eq!(client.field(ColumnKey::Amount), FieldValue::Missing);
    }
}
