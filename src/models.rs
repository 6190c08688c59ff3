use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Using,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub product_type: String,
    pub name: String,
    pub brand: Option<String>,
    pub color_code: Option<String>,
    pub opened_on: NaiveDate,
    pub expires_on: NaiveDate,
    #[serde(default)]
    pub status: ItemStatus,
    pub finished_on: Option<NaiveDate>,
    pub memo: Option<String>,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "D30")]
    Days30,
    #[serde(rename = "D14")]
    Days14,
    #[serde(rename = "D7")]
    Days7,
    #[serde(rename = "OVERWEEK")]
    Overdue,
}

impl NotificationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "D30" => Some(Self::Days30),
            "D14" => Some(Self::Days14),
            "D7" => Some(Self::Days7),
            "OVERWEEK" => Some(Self::Overdue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub item_id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub scheduled_for: NaiveDate,
    pub read_at: Option<DateTime<Local>>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub next_item_id: u64,
    #[serde(default)]
    pub next_notification_id: u64,
}

impl AppData {
    pub fn allocate_item_id(&mut self) -> u64 {
        let highest = self.items.iter().map(|i| i.id).max().unwrap_or(0);
        self.next_item_id = self.next_item_id.max(highest);
        self.next_item_id += 1;
        self.next_item_id
    }

    pub fn allocate_notification_id(&mut self) -> u64 {
        let highest = self.notifications.iter().map(|n| n.id).max().unwrap_or(0);
        self.next_notification_id = self.next_notification_id.max(highest);
        self.next_notification_id += 1;
        self.next_notification_id
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpiryRequest {
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub opened_on: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpiryResponse {
    pub expires_on: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewItemRequest {
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub name: String,
    pub brand: Option<String>,
    pub color_code: Option<String>,
    #[serde(default)]
    pub opened_on: String,
    pub expires_on: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub status: Option<ItemStatus>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemView {
    pub id: u64,
    pub product_type: String,
    pub product_path: Option<String>,
    pub name: String,
    pub brand: Option<String>,
    pub color_code: Option<String>,
    pub opened_on: NaiveDate,
    pub expires_on: NaiveDate,
    pub status: ItemStatus,
    pub finished_on: Option<NaiveDate>,
    pub memo: Option<String>,
    pub days_left: i64,
    pub bucket: String,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpiryStatsResponse {
    pub expired: u64,
    pub week: u64,
    pub biweek: u64,
    pub month: u64,
    pub safe: u64,
    pub by_category: BTreeMap<String, u64>,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationBuckets {
    pub expired: u64,
    pub week: u64,
    pub biweek: u64,
    pub month: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub total_unread: u64,
    pub buckets: NotificationBuckets,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub unread_total: u64,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub taxon_id: u32,
    pub path: String,
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaxonQuery {
    pub parent: Option<String>,
}

/// One node of the category tree. `path` doubles as the `parent` value for
/// listing the node's children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxonNode {
    pub path: String,
    pub name: String,
    /// Set when the node is a selectable product type.
    pub product_type: Option<u32>,
    pub has_children: bool,
}
