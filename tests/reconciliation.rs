use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use vigilo::config::AppConfig;
use vigilo::db::Database;
use vigilo::feed::mock::MockFeedClient;
use vigilo::reconciliation::{reconcile_actor, Status};
use vigilo::risk::detect_risk_change;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        vt_api_key: String::new(),
        vt_files_fallback_limit: 40,
        vt_scan_min_interval_minutes: 60,
        new_alert_min_sightings: 3,
        new_alert_min_distinct_days: 2,
        watchlist_techniques: Vec::new(),
        watchlist_min_sightings: 1,
        watchlist_min_distinct_days: 1,
        tactic_threshold_overrides: HashMap::new(),
    }
}

async fn seed_technique(db: &Database, code: &str, name: &str, tactics: &str) -> i64 {
    sqlx::query(
        "INSERT INTO techniques (external_code, display_name, tactics)
         VALUES ($1, $2, $3) ON CONFLICT (external_code) DO NOTHING",
    )
    .bind(code)
    .bind(name)
    .bind(tactics)
    .execute(db.pool())
    .await
    .unwrap();

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM techniques WHERE external_code = $1")
        .bind(code)
        .fetch_one(db.pool())
        .await
        .unwrap();
    id
}

async fn seed_actor(db: &Database, name: &str) -> vigilo::models::ThreatActor {
    db.upsert_actor(name, None, Some("CO"), "GTI").await.unwrap()
}

async fn evidence_hash_count(db: &Database, actor_id: i64, technique_id: i64) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM technique_evidence WHERE actor_id = $1 AND technique_id = $2")
            .bind(actor_id)
            .bind(technique_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
    count
}

fn day(offset_days: u32, hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1 + offset_days, hour, 0, 0).unwrap()
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn scenario_a_new_confirmation_across_days(pool: PgPool) {
    let db = Database::from_pool(pool);
    let technique_id = seed_technique(&db, "T1059", "Command and Scripting Interpreter", "execution").await;
    let actor = seed_actor(&db, "actor-a").await;
    let config = test_config();
    let feed = MockFeedClient::new()
        .with_collection("actor-a", "col-a")
        .with_techniques("col-a", &["T1059"]);

    reconcile_actor(&db, &feed, &config, &actor, day(0, 9)).await.unwrap();
    reconcile_actor(&db, &feed, &config, &actor, day(0, 11)).await.unwrap();
    let outcome = reconcile_actor(&db, &feed, &config, &actor, day(1, 9)).await.unwrap();

    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.new_confirmed, 1);

    let row = db.get_actor_technique(actor.id, technique_id).await.unwrap().unwrap();
    assert_eq!(row.sightings_count, 3);
    assert_eq!(row.seen_days_count, 2);
    assert!(row.new_alert_sent());

    let timeline = db.actor_timeline(actor.id).await.unwrap();
    assert_eq!(timeline.iter().filter(|e| e.event_type == "NEW").count(), 1);

    let alerts = db.list_recent_alerts(10).await.unwrap();
    assert_eq!(alerts.iter().filter(|a| a.severity == "HIGH").count(), 1);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn scenario_b_fallback_path(pool: PgPool) {
    let db = Database::from_pool(pool);
    let t1055 = seed_technique(&db, "T1055", "Process Injection", "defense-evasion").await;
    let t1027 = seed_technique(&db, "T1027", "Obfuscated Files or Information", "defense-evasion").await;
    let actor = seed_actor(&db, "actor-b").await;
    let config = test_config();
    let feed = MockFeedClient::new()
        .with_collection("actor-b", "col-b")
        .with_file_hashes("col-b", &["h1", "h2"])
        .with_file_tree("h1", &["T1055", "T1027"])
        .with_file_tree("h2", &["T1055"]);

    let outcome = reconcile_actor(&db, &feed, &config, &actor, day(0, 9)).await.unwrap();

    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.source, "files_behaviour_mitre_trees");
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.evidence_added, 3);

    let techniques = db.list_actor_techniques(actor.id).await.unwrap();
    assert_eq!(techniques.len(), 2);

    // T1055 was seen in both h1 and h2, T1027 only in h1 (spec §8 Scenario
    // B: "evidence table contains two hash rows for each technique").
    assert_eq!(evidence_hash_count(&db, actor.id, t1055).await, 2);
    assert_eq!(evidence_hash_count(&db, actor.id, t1027).await, 1);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn scenario_c_disappearance(pool: PgPool) {
    let db = Database::from_pool(pool);
    let t1059 = seed_technique(&db, "T1059", "Command and Scripting Interpreter", "execution").await;
    seed_technique(&db, "T1105", "Ingress Tool Transfer", "command-and-control").await;
    let actor = seed_actor(&db, "actor-c").await;
    let config = test_config();

    let feed1 = MockFeedClient::new().with_collection("actor-c", "col-c").with_techniques("col-c", &["T1059"]);
    reconcile_actor(&db, &feed1, &config, &actor, day(0, 9)).await.unwrap();

    let feed2 = MockFeedClient::new().with_collection("actor-c", "col-c").with_techniques("col-c", &["T1105"]);
    let outcome = reconcile_actor(&db, &feed2, &config, &actor, day(1, 9)).await.unwrap();

    assert_eq!(outcome.disabled, 1);

    let row = db.get_actor_technique(actor.id, t1059).await.unwrap().unwrap();
    assert!(!row.active);

    let timeline = db.actor_timeline(actor.id).await.unwrap();
    assert!(timeline.iter().any(|e| e.event_type == "DISAPPEARED"));

    let alerts = db.list_recent_alerts(10).await.unwrap();
    assert!(alerts.iter().any(|a| a.severity == "LOW"));
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn scenario_d_reactivation(pool: PgPool) {
    let db = Database::from_pool(pool);
    let t1059 = seed_technique(&db, "T1059", "Command and Scripting Interpreter", "execution").await;
    let actor = seed_actor(&db, "actor-d").await;
    let config = test_config();

    let feed_present = MockFeedClient::new().with_collection("actor-d", "col-d").with_techniques("col-d", &["T1059"]);
    reconcile_actor(&db, &feed_present, &config, &actor, day(0, 9)).await.unwrap();

    let feed_absent = MockFeedClient::new().with_collection("actor-d", "col-d").with_techniques("col-d", &[]);
    reconcile_actor(&db, &feed_absent, &config, &actor, day(1, 9)).await.unwrap();

    let outcome = reconcile_actor(&db, &feed_present, &config, &actor, day(2, 9)).await.unwrap();
    assert_eq!(outcome.reactivated, 1);

    let row = db.get_actor_technique(actor.id, t1059).await.unwrap().unwrap();
    assert!(row.active);
    assert_eq!(row.sightings_count, 2);

    let timeline = db.actor_timeline(actor.id).await.unwrap();
    assert!(timeline.iter().any(|e| e.event_type == "REACTIVATED"));

    let alerts = db.list_recent_alerts(10).await.unwrap();
    assert!(alerts.iter().any(|a| a.severity == "MEDIUM"));
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn scenario_e_tactic_override_minimum(pool: PgPool) {
    let db = Database::from_pool(pool);
    seed_technique(&db, "T1078", "Valid Accounts", "initial-access,persistence").await;
    let actor = seed_actor(&db, "actor-e").await;

    let mut overrides = HashMap::new();
    overrides.insert("initial-access".to_string(), (2, 1));
    overrides.insert("persistence".to_string(), (5, 3));
    let config = AppConfig {
        tactic_threshold_overrides: overrides,
        ..test_config()
    };

    let feed = MockFeedClient::new().with_collection("actor-e", "col-e").with_techniques("col-e", &["T1078"]);
    reconcile_actor(&db, &feed, &config, &actor, day(0, 8)).await.unwrap();
    let outcome = reconcile_actor(&db, &feed, &config, &actor, day(0, 10)).await.unwrap();

    assert_eq!(outcome.new_confirmed, 1);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn scenario_f_scheduler_collision(pool: PgPool) {
    let db = Database::from_pool(pool);
    let cfg = db.load_schedule_config().await.unwrap();
    let lock_until = Utc::now() + chrono::Duration::minutes(30);

    let first = db.acquire_schedule_lease(cfg.id, lock_until).await.unwrap();
    let second = db.acquire_schedule_lease(cfg.id, lock_until).await.unwrap();

    assert!(first);
    assert!(!second);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn invariant_no_retroactive_new_for_legacy_rows(pool: PgPool) {
    let db = Database::from_pool(pool);
    let technique_id = seed_technique(&db, "T1059", "Command and Scripting Interpreter", "execution").await;
    let actor = seed_actor(&db, "actor-legacy").await;

    sqlx::query(
        "INSERT INTO actor_techniques
            (actor_id, technique_id, first_seen, last_seen, last_collected, active,
             sightings_count, seen_days_count, new_alert_sent)
         VALUES ($1, $2, $3, $3, $3, TRUE, 5, 4, NULL)",
    )
    .bind(actor.id)
    .bind(technique_id)
    .bind(day(0, 0))
    .execute(db.pool())
    .await
    .unwrap();

    let config = test_config();
    let feed = MockFeedClient::new()
        .with_collection("actor-legacy", "col-legacy")
        .with_techniques("col-legacy", &["T1059"]);
    reconcile_actor(&db, &feed, &config, &actor, day(1, 9)).await.unwrap();

    let row = db.get_actor_technique(actor.id, technique_id).await.unwrap().unwrap();
    assert!(row.new_alert_sent());

    let timeline = db.actor_timeline(actor.id).await.unwrap();
    assert!(!timeline.iter().any(|e| e.event_type == "NEW"));
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn invariant_distinct_day_counting(pool: PgPool) {
    let db = Database::from_pool(pool);
    let technique_id = seed_technique(&db, "T1059", "Command and Scripting Interpreter", "execution").await;
    let actor = seed_actor(&db, "actor-days").await;
    let config = test_config();
    let feed = MockFeedClient::new()
        .with_collection("actor-days", "col-days")
        .with_techniques("col-days", &["T1059"]);

    reconcile_actor(&db, &feed, &config, &actor, day(0, 9)).await.unwrap();
    reconcile_actor(&db, &feed, &config, &actor, day(0, 15)).await.unwrap();
    reconcile_actor(&db, &feed, &config, &actor, day(1, 9)).await.unwrap();

    let row = db.get_actor_technique(actor.id, technique_id).await.unwrap().unwrap();
    assert_eq!(row.sightings_count, 3);
    assert_eq!(row.seen_days_count, 2);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn invariant_transient_error_blocks_disappearance(pool: PgPool) {
    let db = Database::from_pool(pool);
    let technique_id = seed_technique(&db, "T1059", "Command and Scripting Interpreter", "execution").await;
    let actor = seed_actor(&db, "actor-transient").await;
    let config = test_config();

    let feed_present = MockFeedClient::new().with_collection("actor-transient", "col-t").with_techniques("col-t", &["T1059"]);
    reconcile_actor(&db, &feed_present, &config, &actor, day(0, 9)).await.unwrap();

    let feed_transient = MockFeedClient::new()
        .with_collection("actor-transient", "col-t")
        .with_transient_error("col-t");
    let outcome = reconcile_actor(&db, &feed_transient, &config, &actor, day(1, 9)).await.unwrap();

    assert_eq!(outcome.status, Status::Error);

    let row = db.get_actor_technique(actor.id, technique_id).await.unwrap().unwrap();
    assert!(row.active);

    let timeline = db.actor_timeline(actor.id).await.unwrap();
    assert!(!timeline.iter().any(|e| e.event_type == "DISAPPEARED"));
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn scenario_risk_change_threshold_property(pool: PgPool) {
    let db = Database::from_pool(pool);

    db.insert_risk_snapshot("CO", 100.0, 1, 1, day(0, 9)).await.unwrap();
    detect_risk_change(&db, "CO", day(0, 9)).await.unwrap();
    assert_eq!(db.list_recent_alerts(10).await.unwrap().len(), 0);

    // 14% increase: below the 15% property-7 threshold, no alert.
    db.insert_risk_snapshot("CO", 114.0, 1, 1, day(1, 9)).await.unwrap();
    detect_risk_change(&db, "CO", day(1, 9)).await.unwrap();
    assert_eq!(db.list_recent_alerts(10).await.unwrap().len(), 0);

    // 15% increase over the prior snapshot: at the threshold, HIGH alert.
    db.insert_risk_snapshot("CO", 131.1, 1, 1, day(2, 9)).await.unwrap();
    detect_risk_change(&db, "CO", day(2, 9)).await.unwrap();
    let alerts = db.list_recent_alerts(10).await.unwrap();
    assert_eq!(alerts.iter().filter(|a| a.severity == "HIGH").count(), 1);

    // 15% decrease: LOW alert.
    db.insert_risk_snapshot("CO", 111.435, 1, 1, day(3, 9)).await.unwrap();
    detect_risk_change(&db, "CO", day(3, 9)).await.unwrap();
    let alerts = db.list_recent_alerts(10).await.unwrap();
    assert_eq!(alerts.iter().filter(|a| a.severity == "LOW").count(), 1);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn invariant_debounce_within_24h_yields_one_alert(pool: PgPool) {
    let db = Database::from_pool(pool);
    seed_technique(&db, "T1059", "Command and Scripting Interpreter", "execution").await;
    let actor = seed_actor(&db, "actor-debounce").await;
    let config = AppConfig {
        new_alert_min_sightings: 1,
        new_alert_min_distinct_days: 1,
        ..test_config()
    };
    let feed = MockFeedClient::new()
        .with_collection("actor-debounce", "col-debounce")
        .with_techniques("col-debounce", &["T1059"]);

    reconcile_actor(&db, &feed, &config, &actor, day(0, 9)).await.unwrap();
    reconcile_actor(&db, &feed, &config, &actor, day(0, 11)).await.unwrap();

    let alerts = db.list_recent_alerts(10).await.unwrap();
    assert_eq!(alerts.iter().filter(|a| a.severity == "HIGH").count(), 1);
}
