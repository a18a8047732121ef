/// End-to-end reporter and trust-chain tests.
///
/// Walks are either produced by the real `Walker` or built by hand, written
/// through the walk store, and read back the way the `report` command does.
use chrono::{Duration, TimeZone, Utc};
use fswarden_core::model::{File, FileInfo, Fingerprint, Policy, ReportConfig, Review, Reviews};
use fswarden_core::path::normalize_path;
use fswarden_core::report::trust::{read_reviews, write_reviews};
use fswarden_core::store::{output_path, read_walk, write_walk, WalkFile};
use fswarden_core::{CompareError, Reporter, TrustError, Walk, Walker};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

const HOST: &str = "web1";

fn reporter() -> Reporter {
    Reporter::new(ReportConfig::default(), "report.toml", false)
}

fn hand_walk(id: &str, minute: i64, files: Vec<File>) -> Walk {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
    let mut walk = Walk::new(id.into(), HOST.into(), Policy::default(), start);
    walk.stop_walk = start + Duration::seconds(30);
    walk.files = files;
    walk
}

fn hashed(path: &str, hash: &str) -> File {
    let mut f = File::new(path);
    f.info = Some(FileInfo {
        name: path.rsplit('/').next().unwrap_or_default().into(),
        ..FileInfo::default()
    });
    f.fingerprint = Some(Fingerprint::sha256(hash));
    f
}

/// Persist `walk` under `dir` and load it back as a `WalkFile`.
fn persist(dir: &Path, walk: &Walk) -> WalkFile {
    let path = output_path(dir, &walk.hostname, walk.start_walk);
    write_walk(&path, walk).unwrap();
    read_walk(&path).unwrap()
}

fn pin(review_file: &Path, walk_file: &WalkFile) -> Review {
    reporter()
        .update_review(walk_file, Some(review_file))
        .unwrap()
}

// ── Comparison ───────────────────────────────────────────────────────────────

#[test]
fn test_walk_modify_walk_report() {
    let tree = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    fs::create_dir(tree.path().join("etc")).unwrap();
    fs::write(tree.path().join("etc/passwd"), b"root:x:0:0").unwrap();
    fs::write(tree.path().join("etc/hosts"), b"127.0.0.1 localhost").unwrap();

    let policy = Policy {
        include: vec![tree.path().to_string_lossy().into_owned()],
        max_hash_file_size: 4096,
        ..Policy::default()
    };

    let before = Walker::new(policy.clone()).run().unwrap();
    let before_path = output_path(store.path(), &before.hostname, before.start_walk);
    write_walk(&before_path, &before).unwrap();

    fs::write(tree.path().join("etc/passwd"), b"root:x:0:0\nmallory:x:0:0").unwrap();
    fs::remove_file(tree.path().join("etc/hosts")).unwrap();
    fs::write(tree.path().join("etc/shadow"), b"secret").unwrap();

    let after = Walker::new(policy).run().unwrap();
    // One second later so the two file names never collide.
    let after_path = output_path(
        store.path(),
        &after.hostname,
        before.start_walk + Duration::seconds(1),
    );
    write_walk(&after_path, &after).unwrap();

    let reporter = reporter();
    let latest = reporter
        .read_latest_walk(&after.hostname, store.path())
        .unwrap();
    assert_eq!(latest.walk.id, after.id);

    let before_file = reporter.read_walk(&before_path).unwrap();
    let report = reporter
        .compare(Some(&before_file.walk), Some(&latest.walk))
        .unwrap();

    let key = |p: &str| normalize_path(&tree.path().join(p).to_string_lossy(), false);
    let added: Vec<&str> = report.added.iter().map(|a| a.path()).collect();
    let deleted: Vec<&str> = report.deleted.iter().map(|a| a.path()).collect();
    assert_eq!(added, vec![key("etc/shadow")]);
    assert_eq!(deleted, vec![key("etc/hosts")]);

    let passwd = report
        .modified
        .iter()
        .find(|m| m.path() == key("etc/passwd"))
        .expect("passwd modified");
    assert!(passwd.diff.contains("fingerprint: "));
    assert!(passwd.diff.contains("size: 10 => 24"));
    assert!(report.errors.is_empty());
}

#[test]
fn test_scenario_from_hand_built_walks() {
    let a = hand_walk(
        "A",
        0,
        vec![hashed("/a", "H1"), {
            let mut d = File::new("/b/");
            d.info = Some(FileInfo {
                name: "b".into(),
                is_dir: true,
                ..FileInfo::default()
            });
            d
        }],
    );
    let b = hand_walk("B", 10, vec![hashed("/a", "H2"), hashed("/c", "H3")]);

    let report = reporter().compare(Some(&a), Some(&b)).unwrap();
    assert_eq!(report.modified.len(), 1);
    assert_eq!(report.modified[0].path(), "/a");
    assert!(report.modified[0].diff.contains("H1 => H2"));
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.deleted[0].path(), "/b/");
    assert_eq!(report.added.len(), 1);
    assert_eq!(report.added[0].path(), "/c");
}

#[test]
fn test_compare_walk_with_itself_fails() {
    let w = hand_walk("same", 0, vec![hashed("/a", "H1")]);
    let err = reporter().compare(Some(&w), Some(&w)).unwrap_err();
    assert_eq!(err, CompareError::SameId("same".into()));
}

#[test]
fn test_report_config_exclusions_from_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("report.toml");
    fs::write(&config, "version = 1\nexclude = [\"/var/log/\"]\n").unwrap();

    let reporter = Reporter::from_config_file(&config, true).unwrap();
    assert_eq!(reporter.config_path(), config.as_path());

    let before = hand_walk("b", 0, vec![hashed("/var/log/syslog", "1")]);
    let after = hand_walk("a", 5, vec![hashed("/var/log/syslog", "2")]);
    let report = reporter.compare(Some(&before), Some(&after)).unwrap();
    assert!(report.is_empty());
}

// ── Trust chain ──────────────────────────────────────────────────────────────

#[test]
fn test_last_good_walk_round_trip() {
    let dir = TempDir::new().unwrap();
    let review_file = dir.path().join("reviews.json");
    let walk_file = persist(dir.path(), &hand_walk("w1", 0, vec![hashed("/a", "H1")]));

    // A missing review file is created on first update.
    let review = pin(&review_file, &walk_file);
    assert_eq!(review.walk_id, "w1");
    assert_eq!(review.fingerprint, walk_file.fingerprint);

    let loaded = reporter()
        .read_last_good_walk(HOST, &review_file)
        .unwrap()
        .expect("pinned walk");
    assert_eq!(loaded.walk.id, "w1");
    assert_eq!(loaded.path, walk_file.path);
}

#[test]
fn test_last_good_walk_absent_for_unknown_host() {
    let dir = TempDir::new().unwrap();
    let review_file = dir.path().join("reviews.json");
    write_reviews(&review_file, &Reviews::default()).unwrap();

    assert!(reporter()
        .read_last_good_walk("nobody", &review_file)
        .unwrap()
        .is_none());
}

#[cfg(unix)]
#[test]
fn test_tampered_walk_is_rejected() {
    let dir = TempDir::new().unwrap();
    let review_file = dir.path().join("reviews.json");
    let original = hand_walk("w1", 0, vec![hashed("/a", "H1")]);
    let walk_file = persist(dir.path(), &original);
    pin(&review_file, &walk_file);

    // Same id, different content, same location.
    let mut forged = original.clone();
    forged.files = vec![hashed("/a", "EVIL")];
    fs::remove_file(&walk_file.path).unwrap();
    write_walk(&walk_file.path, &forged).unwrap();

    let err = reporter()
        .read_last_good_walk(HOST, &review_file)
        .unwrap_err();
    assert!(
        matches!(err, TrustError::FingerprintMismatch { .. }),
        "got {err:?}"
    );
}

#[cfg(unix)]
#[test]
fn test_truncated_walk_is_rejected_before_decoding() {
    let dir = TempDir::new().unwrap();
    let review_file = dir.path().join("reviews.json");
    let walk_file = persist(dir.path(), &hand_walk("w1", 0, vec![hashed("/a", "H1")]));
    pin(&review_file, &walk_file);

    let bytes = fs::read(&walk_file.path).unwrap();
    fs::remove_file(&walk_file.path).unwrap();
    fs::write(&walk_file.path, &bytes[..bytes.len() - 1]).unwrap();

    let err = reporter()
        .read_last_good_walk(HOST, &review_file)
        .unwrap_err();
    assert!(
        matches!(err, TrustError::FingerprintMismatch { .. }),
        "got {err:?}"
    );
}

#[test]
fn test_substituted_walk_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let review_file = dir.path().join("reviews.json");
    let walk_file = persist(dir.path(), &hand_walk("w1", 0, vec![]));

    // Pin the right bytes under the wrong id.
    let mut reviews = Reviews::default();
    reviews.reviews.insert(
        HOST.into(),
        Review {
            walk_id: "someone-else".into(),
            walk_reference: walk_file.path.to_string_lossy().into_owned(),
            fingerprint: walk_file.fingerprint.clone(),
        },
    );
    write_reviews(&review_file, &reviews).unwrap();

    let err = reporter()
        .read_last_good_walk(HOST, &review_file)
        .unwrap_err();
    assert!(matches!(err, TrustError::IdMismatch { .. }), "got {err:?}");
}

#[test]
fn test_update_review_keeps_other_hosts() {
    let dir = TempDir::new().unwrap();
    let review_file = dir.path().join("reviews.json");

    let mut reviews = Reviews::default();
    reviews.reviews.insert(
        "db1".into(),
        Review {
            walk_id: "db-walk".into(),
            walk_reference: "/walks/db.bin".into(),
            fingerprint: Fingerprint::sha256("f00d"),
        },
    );
    write_reviews(&review_file, &reviews).unwrap();

    let first = persist(dir.path(), &hand_walk("w1", 0, vec![]));
    pin(&review_file, &first);
    let second = persist(dir.path(), &hand_walk("w2", 10, vec![]));
    pin(&review_file, &second);

    let stored = read_reviews(&review_file).unwrap();
    assert_eq!(stored.reviews.len(), 2);
    assert_eq!(stored.reviews["db1"].walk_id, "db-walk");
    assert_eq!(stored.reviews[HOST].walk_id, "w2");
}

#[test]
fn test_update_review_without_file_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let walk_file = persist(dir.path(), &hand_walk("w1", 0, vec![]));
    let before: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();

    let review = reporter().update_review(&walk_file, None).unwrap();
    assert_eq!(review.walk_id, "w1");

    let after: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(before.len(), after.len());
}

#[test]
fn test_corrupt_review_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let review_file = dir.path().join("reviews.json");
    fs::write(&review_file, "not json").unwrap();

    assert!(matches!(
        reporter().read_last_good_walk(HOST, &review_file),
        Err(TrustError::ReviewParse { .. })
    ));
    let walk_file = persist(dir.path(), &hand_walk("w1", 0, vec![]));
    assert!(reporter()
        .update_review(&walk_file, Some(&review_file))
        .is_err());
}
