//! Per-chapter status records and the store that owns them.
//!
//! One `ChapterStatus` exists per chapter directory seen during a run. It is
//! opened when the chapter root is entered and is never replaced afterwards;
//! checks only flip the fields they own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// State of an external service as seen from one chapter.
pub enum ServiceStatus {
    /// Neutral value: nothing has resolved this service yet.
    #[default]
    Unknown,
    Nonexistent,
    Inactive,
    Active,
    /// The resolver could not reach the service for this chapter.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Third-party form usage, ordered so that a later variant is always the
/// more serious observation.
pub enum PrivacyStatus {
    #[default]
    NotPresent,
    CompliantDomain,
    Unknown,
    NonCompliant,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Compliance record for a single chapter.
pub struct ChapterStatus {
    pub default_text: bool,
    pub migration_header: bool,
    pub example_tab: bool,
    pub legacy_gitignore: bool,
    pub legacy_membership_link: bool,
    pub legacy_policy_link: bool,
    pub legacy_speaker_agreement: bool,
    pub legacy_wiki_link: bool,
    pub legacy_donation: bool,
    pub site_artifact: bool,
    pub build_failed: bool,
    pub leader_count: u32,
    pub pages_status: ServiceStatus,
    pub meetup_status: ServiceStatus,
    pub meetup_metadata_status: ServiceStatus,
    pub form_privacy: PrivacyStatus,
    pub meetup_group: String,
    pub meetup_past_events: u64,
    pub meetup_upcoming_events: u64,
    pub meetup_members: u64,
}

impl ChapterStatus {
    /// Record a form observation, keeping the more serious of the two.
    pub fn escalate_privacy(&mut self, seen: PrivacyStatus) {
        if seen > self.form_privacy {
            self.form_privacy = seen;
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
/// Chapter id -> status, ordered by id so reports are stable.
pub struct StatusStore {
    chapters: BTreeMap<String, ChapterStatus>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the record for `chapter`, creating it on first sight only.
    ///
    /// Returns `true` when the record was created by this call.
    pub fn open(&mut self, chapter: &str) -> bool {
        if self.chapters.contains_key(chapter) {
            return false;
        }
        self.chapters
            .insert(chapter.to_string(), ChapterStatus::default());
        true
    }

    pub fn get(&self, chapter: &str) -> Option<&ChapterStatus> {
        self.chapters.get(chapter)
    }

    pub fn get_mut(&mut self, chapter: &str) -> Option<&mut ChapterStatus> {
        self.chapters.get_mut(chapter)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_neutral() {
        let st = ChapterStatus::default();
        assert_eq!(st.pages_status, ServiceStatus::Unknown);
        assert_eq!(st.meetup_status, ServiceStatus::Unknown);
        assert_eq!(st.meetup_metadata_status, ServiceStatus::Unknown);
        assert_eq!(st.form_privacy, PrivacyStatus::NotPresent);
        assert!(st.meetup_group.is_empty());
    }

    #[test]
    fn test_open_never_recreates() {
        let mut store = StatusStore::new();
        assert!(store.open("www-chapter-london"));
        store.get_mut("www-chapter-london").unwrap().leader_count = 4;
        assert!(!store.open("www-chapter-london"));
        assert_eq!(store.get("www-chapter-london").unwrap().leader_count, 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_status_serde_round_trip() {
        let st = ChapterStatus {
            default_text: true,
            legacy_donation: true,
            leader_count: 3,
            pages_status: ServiceStatus::Active,
            meetup_status: ServiceStatus::Failed,
            meetup_metadata_status: ServiceStatus::Inactive,
            form_privacy: PrivacyStatus::CompliantDomain,
            meetup_group: "OWASP-London".into(),
            meetup_past_events: 12,
            meetup_upcoming_events: 2,
            meetup_members: 900,
            ..Default::default()
        };
        let s = serde_json::to_string_pretty(&st).unwrap();
        let back: ChapterStatus = serde_json::from_str(&s).unwrap();
        assert_eq!(back, st);
    }

    #[test]
    fn test_store_serializes_as_plain_map() {
        let mut store = StatusStore::new();
        store.open("www-chapter-b");
        store.open("www-chapter-a");
        let v = serde_json::to_value(&store).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["www-chapter-a", "www-chapter-b"]);
        assert_eq!(v["www-chapter-a"]["pages_status"], "unknown");
        assert_eq!(v["www-chapter-a"]["form_privacy"], "not_present");
    }

    #[test]
    fn test_privacy_only_escalates() {
        let mut st = ChapterStatus::default();
        st.escalate_privacy(PrivacyStatus::Unknown);
        st.escalate_privacy(PrivacyStatus::CompliantDomain);
        assert_eq!(st.form_privacy, PrivacyStatus::Unknown);
        st.escalate_privacy(PrivacyStatus::NonCompliant);
        assert_eq!(st.form_privacy, PrivacyStatus::NonCompliant);
    }
}
