//! Tests for statistics repository operations.

use std::sync::Arc;

use diesel::Connection;
use diesel::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::NamedTempFile;

use strictly_solitaire::{
    RepositoryReporter, SessionSummary, StaticIdentity, StatsReporter, StatsRepository,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, StatsRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let mut conn = SqliteConnection::establish(&db_path).expect("Failed to connect");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Migrations failed");

    let repo = StatsRepository::new(db_path).expect("Failed to create repository");
    (db_file, repo)
}

#[test]
fn test_get_or_create_user_is_idempotent() {
    let (_db, repo) = setup_test_db();
    let first = repo.get_or_create_user("Alice").expect("Create failed");
    let second = repo.get_or_create_user("Alice").expect("Lookup failed");
    assert_eq!(first.id(), second.id());
    assert_eq!(second.display_name(), "Alice");
    assert!(*first.id() > 0);
}

#[test]
fn test_distinct_players_get_distinct_ids() {
    let (_db, repo) = setup_test_db();
    let alice = repo.get_or_create_user("Alice").expect("Create failed");
    let bob = repo.get_or_create_user("Bob").expect("Create failed");
    assert_ne!(alice.id(), bob.id());
}

#[test]
fn test_record_session() {
    let (_db, repo) = setup_test_db();
    let user = repo.get_or_create_user("Carol").expect("Create failed");

    let stored = repo
        .record_session(*user.id(), SessionSummary::new(87, 245, true))
        .expect("Record failed");

    assert_eq!(stored.user_id(), user.id());
    assert_eq!(*stored.moves(), 87);
    assert_eq!(*stored.time_seconds(), 245);
    assert!(*stored.won());
}

#[test]
fn test_display_stats_empty() {
    let (_db, repo) = setup_test_db();
    let user = repo.get_or_create_user("Dave").expect("Create failed");
    let stats = repo.display_stats(*user.id()).expect("Stats failed");
    assert_eq!(*stats.games_played(), 0);
    assert_eq!(*stats.win_percentage(), 0.0);
    assert_eq!(*stats.best_time(), None);
}

#[test]
fn test_display_stats_aggregates_history() {
    let (_db, repo) = setup_test_db();
    let user = repo.get_or_create_user("Erin").expect("Create failed");
    let id = *user.id();

    for summary in [
        SessionSummary::new(100, 400, true),
        SessionSummary::new(120, 380, true),
        SessionSummary::new(15, 60, false),
        SessionSummary::new(95, 310, true),
    ] {
        repo.record_session(id, summary).expect("Record failed");
    }

    let stats = repo.display_stats(id).expect("Stats failed");
    assert_eq!(*stats.games_played(), 4);
    assert_eq!(*stats.games_won(), 3);
    assert_eq!(*stats.win_percentage(), 75.0);
    assert_eq!(*stats.average_moves(), 83);
    assert_eq!(*stats.best_time(), Some(310));
    assert_eq!(*stats.current_streak(), 1);
    assert_eq!(*stats.longest_streak(), 2);
}

#[test]
fn test_stats_are_per_player() {
    let (_db, repo) = setup_test_db();
    let frank = repo.get_or_create_user("Frank").expect("Create failed");
    let grace = repo.get_or_create_user("Grace").expect("Create failed");
    repo.record_session(*frank.id(), SessionSummary::new(50, 100, true))
        .expect("Record failed");

    let stats = repo.display_stats(*grace.id()).expect("Stats failed");
    assert_eq!(*stats.games_played(), 0);
}

#[test]
fn test_recent_sessions_newest_first_and_limited() {
    let (_db, repo) = setup_test_db();
    let user = repo.get_or_create_user("Heidi").expect("Create failed");
    let id = *user.id();

    for moves in 1..=7 {
        repo.record_session(id, SessionSummary::new(moves, 10, false))
            .expect("Record failed");
    }

    let recent = repo.recent_sessions(id, 5).expect("Query failed");
    let moves: Vec<i32> = recent.iter().map(|s| *s.moves()).collect();
    assert_eq!(moves, vec![7, 6, 5, 4, 3]);
}

#[test]
fn test_open_applies_migrations() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = StatsRepository::open(db_path.clone()).expect("Open failed");
    repo.get_or_create_user("Ivan").expect("Schema should exist");

    // Opening again finds nothing pending.
    StatsRepository::open(db_path).expect("Reopen failed");
}

#[test]
fn test_empty_path_is_rejected() {
    assert!(StatsRepository::new("  ".to_string()).is_err());
}

#[test]
fn test_repository_reporter_records_for_signed_in_player() {
    let (_db, repo) = setup_test_db();
    let identity = Arc::new(StaticIdentity::new(Some("Judy".to_string())));
    let reporter = RepositoryReporter::new(repo.clone(), identity);

    reporter
        .record_session(SessionSummary::new(60, 200, true))
        .expect("Report failed");

    let user = repo.get_or_create_user("Judy").expect("Lookup failed");
    let stats = repo.display_stats(*user.id()).expect("Stats failed");
    assert_eq!(*stats.games_won(), 1);
}

#[test]
fn test_repository_reporter_skips_anonymous() {
    let (_db, repo) = setup_test_db();
    let reporter = RepositoryReporter::new(repo.clone(), Arc::new(StaticIdentity::anonymous()));

    reporter
        .record_session(SessionSummary::new(60, 200, true))
        .expect("Anonymous report is a no-op");

    let user = repo.get_or_create_user("anyone").expect("Create failed");
    let recent = repo.recent_sessions(*user.id(), 5).expect("Query failed");
    assert!(recent.is_empty());
}
