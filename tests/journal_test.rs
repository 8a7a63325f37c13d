//! JSONL journal round trips and lenient reads.

use copyforge::domain::models::{GeneratedCopy, JournalEntry};
use copyforge::domain::ports::ExperimentLog;
use copyforge::infrastructure::journal::JsonlJournal;

fn entry(campaign: &str, hypothesis: &str) -> JournalEntry {
    JournalEntry::new(campaign, hypothesis, "vs_20260830120000_000")
        .with_ad("AD001", "Group_A")
        .with_generated(GeneratedCopy {
            headlines: vec!["Order today, ends soon".to_string()],
            descriptions: vec!["Fresh picks weekly.".to_string()],
        })
        .with_notes("CTR below threshold")
}

#[tokio::test]
async fn append_then_recall_by_campaign() {
    let dir = tempfile::tempdir().unwrap();
    let journal = JsonlJournal::new(dir.path().join("journal").join("experiments.jsonl"));

    journal.append(entry("Summer_Sale", "urgency")).await.unwrap();
    journal.append(entry("Winter_Sale", "social proof")).await.unwrap();
    journal.append(entry("Summer_Sale", "curiosity")).await.unwrap();

    let recent = journal.recent_for_campaign("Summer_Sale", 5).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].hypothesis, "urgency");
    assert_eq!(recent[1].hypothesis, "curiosity");

    assert!(journal
        .recent_for_campaign("Unknown", 5)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn limit_keeps_newest_entries() {
    let dir = tempfile::tempdir().unwrap();
    let journal = JsonlJournal::new(dir.path().join("experiments.jsonl"));

    for i in 0..7 {
        journal
            .append(entry("Summer_Sale", &format!("hypothesis {i}")))
            .await
            .unwrap();
    }
    let recent = journal.recent_for_campaign("Summer_Sale", 5).await.unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].hypothesis, "hypothesis 2");
    assert_eq!(recent[4].hypothesis, "hypothesis 6");
}

#[tokio::test]
async fn missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let journal = JsonlJournal::new(dir.path().join("nope.jsonl"));
    assert!(journal
        .recent_for_campaign("Summer_Sale", 5)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn corrupt_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("experiments.jsonl");
    let journal = JsonlJournal::new(&path);

    journal.append(entry("Summer_Sale", "good one")).await.unwrap();
    tokio::fs::write(
        &path,
        format!(
            "{}not json at all\n",
            tokio::fs::read_to_string(&path).await.unwrap()
        ),
    )
    .await
    .unwrap();
    journal.append(entry("Summer_Sale", "another good one")).await.unwrap();

    let recent = journal.recent_for_campaign("Summer_Sale", 5).await.unwrap();
    assert_eq!(recent.len(), 2);
}
