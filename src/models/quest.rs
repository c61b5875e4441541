use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Remote identifier for a task or partner offer. The API is inconsistent
/// about sending ids as strings or numbers, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Number(serde_json::Number),
        }

        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(v) if !v.trim().is_empty() => Ok(ItemId(v.trim().to_string())),
            StringOrNumber::String(_) => Err(serde::de::Error::custom("empty item id")),
            StringOrNumber::Number(n) => Ok(ItemId(n.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    NotStarted,
    Claimed,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerStatus {
    NotClaimed,
    Claimed,
    #[default]
    #[serde(other)]
    Unknown,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_task_title() -> String {
    "Unknown Task".to_string()
}

fn default_partner_name() -> String {
    "Unknown Partner".to_string()
}

// Display-only fields never decide whether an entry is usable, so any shape
// the server sends is accepted and mapped onto a sensible value.
fn text_or(value: Value, fallback: fn() -> String) -> String {
    match value {
        Value::String(text) => text,
        Value::Number(n) => n.to_string(),
        _ => fallback(),
    }
}

fn task_title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_or(Value::deserialize(deserializer)?, default_task_title))
}

fn partner_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_or(Value::deserialize(deserializer)?, default_partner_name))
}

fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: ItemId,
    #[serde(default = "default_task_title", deserialize_with = "task_title")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "lenient_score")]
    pub expected_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerOffer {
    pub id: ItemId,
    #[serde(default = "default_partner_name", deserialize_with = "partner_name")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PartnerStatus,
    #[serde(default, deserialize_with = "lenient_score")]
    pub expected_score: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    #[serde(default, deserialize_with = "lenient_score")]
    pub overall_score: f64,
}

/// Points balance as reported at the start of an account run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Balance {
    Points(f64),
    Unavailable,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Balance::Points(points) => write!(f, "{}", points),
            Balance::Unavailable => f.write_str("N/A"),
        }
    }
}

/// Parses the entries of a list payload one by one; null or malformed entries
/// are dropped rather than failing the whole list.
pub fn parse_items<T>(entries: &[serde_json::Value]) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    entries
        .iter()
        .filter(|entry| !entry.is_null())
        .filter_map(|entry| match serde_json::from_value::<T>(entry.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed list entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_accepts_numeric_and_string_ids() {
        let numeric: Task = serde_json::from_value(json!({"id": 42, "status": "CLAIMED"}))
            .expect("numeric id");
        assert_eq!(numeric.id.as_str(), "42");
        assert_eq!(numeric.status, TaskStatus::Claimed);
        assert_eq!(numeric.title, "Unknown Task");

        let text: Task = serde_json::from_value(json!({"id": "abc", "status": "NOT_STARTED", "expected_score": 15}))
            .expect("string id");
        assert_eq!(text.id.as_str(), "abc");
        assert_eq!(text.status, TaskStatus::NotStarted);
        assert_eq!(text.expected_score, 15.0);
    }

    #[test]
    fn unrecognized_or_missing_status_is_unknown() {
        let odd: Task = serde_json::from_value(json!({"id": 1, "status": "EXPIRED"})).expect("task");
        assert_eq!(odd.status, TaskStatus::Unknown);
        let missing: PartnerOffer = serde_json::from_value(json!({"id": 1})).expect("partner");
        assert_eq!(missing.status, PartnerStatus::Unknown);
        let null: PartnerOffer = serde_json::from_value(
            json!({"id": 1, "name": null, "status": null, "expected_score": null}),
        )
        .expect("partner with nulls");
        assert_eq!(null.name, "Unknown Partner");
        assert_eq!(null.status, PartnerStatus::Unknown);
        assert_eq!(null.expected_score, 0.0);
    }

    #[test]
    fn parse_items_drops_null_and_malformed_entries() {
        let entries = vec![
            json!({"id": 1, "name": "Alpha", "status": "NOT_CLAIMED"}),
            json!(null),
            json!({"name": "no id"}),
            json!({"id": "", "name": "empty id"}),
            json!({"id": 2, "status": "CLAIMED"}),
        ];
        let partners: Vec<PartnerOffer> = parse_items(&entries);
        assert_eq!(partners.len(), 2);
        assert_eq!(partners[0].name, "Alpha");
        assert_eq!(partners[1].name, "Unknown Partner");
        assert_eq!(partners[1].status, PartnerStatus::Claimed);
    }

    #[test]
    fn loosely_typed_display_fields_keep_the_entry() {
        let entries = vec![
            json!({"id": 7, "status": "NOT_STARTED", "expected_score": "10"}),
            json!({"id": 8, "title": 123, "status": "NOT_STARTED"}),
            json!({"id": 9, "title": ["x"], "status": "CLAIMED", "expected_score": {"v": 1}}),
        ];
        let tasks: Vec<Task> = parse_items(&entries);

        assert_eq!(tasks.len(), 3);
        assert!(tasks[..2].iter().all(|task| task.status == TaskStatus::NotStarted));
        assert_eq!(tasks[0].expected_score, 10.0);
        assert_eq!(tasks[0].title, "Unknown Task");
        assert_eq!(tasks[1].title, "123");
        assert_eq!(tasks[2].title, "Unknown Task");
        assert_eq!(tasks[2].expected_score, 0.0);

        let partner: PartnerOffer =
            serde_json::from_value(json!({"id": 3, "name": false, "expected_score": "abc"}))
                .expect("partner");
        assert_eq!(partner.name, "Unknown Partner");
        assert_eq!(partner.expected_score, 0.0);

        let info: UserInfo = serde_json::from_value(json!({"overall_score": "42.5"})).expect("info");
        assert_eq!(info.overall_score, 42.5);
    }

    #[test]
    fn balance_renders_sentinel() {
        assert_eq!(Balance::Points(120.0).to_string(), "120");
        assert_eq!(Balance::Unavailable.to_string(), "N/A");
    }
}
