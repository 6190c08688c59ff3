use crate::expiry::{AnchorPolicy, ExpiryRule};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Wire shape of one rule as embedded in the item form page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRule {
    pub months: u32,
    pub anchor: String,
}

impl From<ExpiryRule> for WireRule {
    fn from(rule: ExpiryRule) -> Self {
        let anchor = match rule.anchor {
            AnchorPolicy::EndOfMonth => "end_of_month",
            AnchorPolicy::PreserveDay => "preserve_day",
        };
        Self {
            months: rule.duration_months,
            anchor: anchor.to_string(),
        }
    }
}

/// Product-type id to shelf-life rule. Built once at startup and shared
/// read-only with every form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleBook {
    rules: BTreeMap<String, ExpiryRule>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product_type: impl Into<String>, rule: ExpiryRule) {
        self.rules.insert(product_type.into(), rule);
    }

    pub fn get(&self, product_type: &str) -> Option<ExpiryRule> {
        self.rules.get(product_type.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses the embedded rules blob.
    ///
    /// Lenient: a blob that is not a JSON object yields an empty book, and
    /// entries with unusable months are skipped. A missing or empty anchor
    /// means end of month, `"end_of_month"` means end of month, anything
    /// else preserves the opened day.
    pub fn from_json(blob: &str) -> Self {
        let entries: BTreeMap<String, Value> = match serde_json::from_str(blob) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("ignoring malformed rules blob: {err}");
                return Self::default();
            }
        };

        let mut book = Self::default();
        for (product_type, entry) in entries {
            match rule_from_value(&entry) {
                Some(rule) => book.insert(product_type, rule),
                None => warn!(%product_type, "skipping unusable expiry rule: {entry}"),
            }
        }
        book
    }

    pub fn to_wire(&self) -> BTreeMap<String, WireRule> {
        self.rules
            .iter()
            .map(|(id, rule)| (id.clone(), WireRule::from(*rule)))
            .collect()
    }

    /// The blob to place inside a `<script type="application/json">` element.
    pub fn to_embedded_json(&self) -> String {
        serde_json::to_string(&self.to_wire())
            .unwrap_or_else(|_| "{}".to_string())
            .replace("</", "<\\/")
    }
}

fn rule_from_value(entry: &Value) -> Option<ExpiryRule> {
    let object = entry.as_object()?;
    let duration_months = match object.get("months") {
        None | Some(Value::Null) => 0,
        Some(months) => u32::try_from(months.as_u64()?).ok()?,
    };
    let anchor = match object.get("anchor").and_then(Value::as_str) {
        None | Some("") | Some("end_of_month") => AnchorPolicy::EndOfMonth,
        Some(_) => AnchorPolicy::PreserveDay,
    };
    Some(ExpiryRule::new(duration_months, anchor))
}
