// Integration tests for the directory and persistence collaborators

use anyhow::Result;
use chrono::Utc;
use confab::directory::{resolve_display_names, MemberDirectory, MemberRecord};
use confab::persist::{FileSink, MeetingRecord, PersistenceSink, StoredMeeting};
use confab::session::TranscriptEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn member(user_id: &str, first: Option<&str>, last: Option<&str>, username: Option<&str>) -> MemberRecord {
    MemberRecord {
        user_id: user_id.to_string(),
        first_name: first.map(String::from),
        last_name: last.map(String::from),
        username: username.map(String::from),
        identifier: None,
    }
}

/// Serves a fixed member list in pages, counting requests
struct PagedDirectory {
    members: Vec<MemberRecord>,
    requests: AtomicUsize,
}

#[async_trait::async_trait]
impl MemberDirectory for PagedDirectory {
    async fn list_members(
        &self,
        _group_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MemberRecord>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .members
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn test_pagination_walks_until_short_page() -> Result<()> {
    let directory = Arc::new(PagedDirectory {
        members: (0..5)
            .map(|i| {
                let last = format!("Last{i}");
                member(&format!("u{i}"), Some("First"), Some(&last), None)
            })
            .collect(),
        requests: AtomicUsize::new(0),
    });

    let names = resolve_display_names(directory.as_ref(), "group-1", 2).await?;

    assert_eq!(names.len(), 5);
    assert_eq!(names["u3"], "First Last3");
    // Pages of 2, 2, then a short page of 1
    assert_eq!(directory.requests.load(Ordering::SeqCst), 3);

    Ok(())
}

#[tokio::test]
async fn test_pagination_with_exact_page_boundary() -> Result<()> {
    let directory = Arc::new(PagedDirectory {
        members: (0..4)
            .map(|i| {
                let nick = format!("nick{i}");
                member(&format!("u{i}"), None, None, Some(&nick))
            })
            .collect(),
        requests: AtomicUsize::new(0),
    });

    let names = resolve_display_names(directory.as_ref(), "group-1", 2).await?;

    assert_eq!(names.len(), 4);
    // Two full pages, then an empty page to detect the end
    assert_eq!(directory.requests.load(Ordering::SeqCst), 3);

    Ok(())
}

#[tokio::test]
async fn test_empty_group_resolves_to_empty_mapping() -> Result<()> {
    let directory = PagedDirectory {
        members: vec![],
        requests: AtomicUsize::new(0),
    };

    let names = resolve_display_names(&directory, "group-1", 50).await?;

    assert!(names.is_empty());

    Ok(())
}

#[test]
fn test_display_name_fallback_chain() {
    assert_eq!(
        member("u1", Some("Ada"), Some("Lovelace"), Some("ada")).display_name(),
        "Ada Lovelace"
    );
    assert_eq!(
        member("u1", Some("Ada"), None, Some("ada")).display_name(),
        "Ada"
    );
    assert_eq!(member("u1", None, None, Some("ada")).display_name(), "ada");

    let with_identifier = MemberRecord {
        user_id: "u1".to_string(),
        first_name: None,
        last_name: None,
        username: None,
        identifier: Some("+1555".to_string()),
    };
    assert_eq!(with_identifier.display_name(), "+1555");

    assert_eq!(member("u1", None, None, None).display_name(), "u1");
    assert_eq!(
        member("u1", Some("   "), None, None).display_name(),
        "u1",
        "blank name parts are ignored"
    );
}

#[tokio::test]
async fn test_file_sink_writes_one_document_per_meeting() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let sink = FileSink::new(temp_dir.path().join("meetings"));

    let record = MeetingRecord {
        room_id: "room-1".to_string(),
        group_id: Some("group-1".to_string()),
        created_by: Some("caller-1".to_string()),
        summary: "We shipped the feature.".to_string(),
        key_points: vec!["We shipped the feature".to_string()],
        participants: vec!["u1".to_string()],
        participant_names: HashMap::from([("u1".to_string(), "Alice".to_string())]),
        duration_ms: 90_000,
        started_at: Utc::now(),
        ended_at: Utc::now(),
        transcriptions: vec![TranscriptEntry {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            text: "We shipped the feature.".to_string(),
        }],
    };

    let stored = sink.insert(&record).await?;
    assert_eq!(stored.record.room_id, "room-1");

    let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("meetings"))?
        .collect::<std::io::Result<_>>()?;
    assert_eq!(entries.len(), 1, "one document per meeting");

    let body = std::fs::read_to_string(entries[0].path())?;
    let round_trip: StoredMeeting = serde_json::from_str(&body)?;
    assert_eq!(round_trip.record.summary, "We shipped the feature.");
    assert_eq!(round_trip.record.participant_names["u1"], "Alice");
    assert_eq!(round_trip.record.duration_ms, 90_000);
    assert_eq!(round_trip.created_at, stored.created_at);

    Ok(())
}
