//! Participant roster shared by automatic sync and manual entry

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::utils::lock;

/// One line in the visible participant list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub display_name: String,
}

impl ParticipantEntry {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    /// Project a host participant record. Records carry `screenName`;
    /// bare strings are accepted as the name itself. Empty names are skipped.
    pub fn from_host_record(record: &Value) -> Option<Self> {
        let name = match record {
            Value::String(name) => name.as_str(),
            Value::Object(fields) => fields.get("screenName").and_then(Value::as_str)?,
            _ => return None,
        };
        (!name.is_empty()).then(|| Self::new(name))
    }
}

/// Extract the participant list from a host response.
///
/// The host answers either with a bare array or with an object wrapping a
/// `participants` array. Anything else yields `None`.
pub fn parse_participants(response: &Value) -> Option<Vec<ParticipantEntry>> {
    let records = match response {
        Value::Array(records) => records,
        Value::Object(fields) => fields.get("participants")?.as_array()?,
        _ => return None,
    };

    Some(
        records
            .iter()
            .filter_map(|record| {
                let entry = ParticipantEntry::from_host_record(record);
                if entry.is_none() {
                    debug!("Skipping participant record without a name: {}", record);
                }
                entry
            })
            .collect(),
    )
}

/// Outcome of an automatic roster population attempt, shown above the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    HostUnavailable,
    InsufficientPrivilege,
    AutoPopulated,
    Failed,
}

impl SyncStatus {
    pub fn message(&self) -> &'static str {
        match self {
            SyncStatus::HostUnavailable => {
                "Host integration not available. Run inside the meeting client."
            }
            SyncStatus::InsufficientPrivilege => {
                "Only the host or co-host can auto-populate the participant list."
            }
            SyncStatus::AutoPopulated => "Participant list auto-populated from the meeting.",
            SyncStatus::Failed => {
                "Could not auto-populate participants. Are you the host or co-host and running inside the meeting?"
            }
        }
    }
}

#[derive(Debug, Default)]
struct RosterInner {
    entries: Vec<ParticipantEntry>,
    status: Option<SyncStatus>,
}

/// Snapshot of the roster view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterView {
    pub participants: Vec<ParticipantEntry>,
    pub status: Option<SyncStatus>,
    pub message: Option<String>,
}

/// Handle to the visible participant list. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    inner: Arc<Mutex<RosterInner>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, RosterInner> {
        lock(&self.inner)
    }

    /// Replace the whole list with a fresh host roster
    pub fn replace_all(&self, entries: Vec<ParticipantEntry>) {
        let mut inner = self.guard();
        debug!("Replacing roster of {} with {} entries", inner.entries.len(), entries.len());
        inner.entries = entries;
    }

    /// Append a manually typed name. Blank input is ignored.
    pub fn add_manual(&self, name: &str) -> Option<ParticipantEntry> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let entry = ParticipantEntry::new(name);
        self.guard().entries.push(entry.clone());
        Some(entry)
    }

    pub fn set_status(&self, status: SyncStatus) {
        self.guard().status = Some(status);
    }

    pub fn status(&self) -> Option<SyncStatus> {
        self.guard().status
    }

    pub fn names(&self) -> Vec<String> {
        self.guard()
            .entries
            .iter()
            .map(|e| e.display_name.clone())
            .collect()
    }

    pub fn view(&self) -> RosterView {
        let inner = self.guard();
        RosterView {
            participants: inner.entries.clone(),
            status: inner.status,
            message: inner.status.map(|s| s.message().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wrapped_and_bare_shapes() {
        let wrapped = json!({"participants": [{"screenName": "Ana"}, {"screenName": "Bo"}]});
        let names: Vec<_> = parse_participants(&wrapped)
            .unwrap()
            .into_iter()
            .map(|e| e.display_name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bo"]);

        let bare = json!([{"screenName": "Cy", "role": "host"}, "Di"]);
        assert_eq!(
            parse_participants(&bare).unwrap(),
            vec![ParticipantEntry::new("Cy"), ParticipantEntry::new("Di")]
        );
    }

    #[test]
    fn other_shapes_are_no_data() {
        assert_eq!(parse_participants(&json!(null)), None);
        assert_eq!(parse_participants(&json!("Ana")), None);
        assert_eq!(parse_participants(&json!({"participants": "Ana"})), None);
        assert_eq!(parse_participants(&json!({"people": []})), None);
    }

    #[test]
    fn nameless_records_are_skipped() {
        let resp = json!([{"screenName": "Ana"}, {"participantId": 7}, 42]);
        assert_eq!(parse_participants(&resp).unwrap(), vec![ParticipantEntry::new("Ana")]);
    }

    #[test]
    fn empty_names_are_skipped() {
        let resp = json!([{"screenName": ""}, "", {"screenName": "Ana"}, "Bo"]);
        assert_eq!(
            parse_participants(&resp).unwrap(),
            vec![ParticipantEntry::new("Ana"), ParticipantEntry::new("Bo")]
        );
    }

    #[test]
    fn manual_entries_append_and_allow_duplicates() {
        let roster = Roster::new();
        roster.replace_all(vec![ParticipantEntry::new("Ana")]);
        assert!(roster.add_manual("  Bo ").is_some());
        assert!(roster.add_manual("Bo").is_some());
        assert!(roster.add_manual("   ").is_none());
        assert_eq!(roster.names(), vec!["Ana", "Bo", "Bo"]);
    }

    #[test]
    fn replace_discards_previous_entries() {
        let roster = Roster::new();
        roster.add_manual("Zed");
        roster.replace_all(vec![ParticipantEntry::new("Ana")]);
        assert_eq!(roster.names(), vec!["Ana"]);
    }

    #[test]
    fn view_carries_status_message() {
        let roster = Roster::new();
        assert_eq!(roster.view().message, None);
        roster.set_status(SyncStatus::InsufficientPrivilege);
        let view = roster.view();
        assert_eq!(view.status, Some(SyncStatus::InsufficientPrivilege));
        assert_eq!(view.message.as_deref(), Some(SyncStatus::InsufficientPrivilege.message()));
    }
}
