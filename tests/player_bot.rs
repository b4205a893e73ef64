//! End-to-end checks over a database file: repository calls and chat
//! commands must see the same rows.

use ignbot::bot::{create_dispatcher, ChatMessage};
use ignbot::database::{ConnectParams, DbError, ErrorKind};
use ignbot::{get_database_info, BotConfig, PlayerDatabase};
use std::sync::Arc;

fn config_in(dir: &tempfile::TempDir) -> BotConfig {
    BotConfig {
        data_dir: dir.path().to_string_lossy().to_string(),
        owner_id: Some("owner".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn chat_updates_are_visible_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let path = config.sqlite_path();

    let db = Arc::new(PlayerDatabase::open_path(&path).unwrap());
    let dispatcher = create_dispatcher(Arc::clone(&db), config.clone());

    let msg = ChatMessage::new("7", "Dana", ",ign dana_the_brave").in_server("G1");
    assert_eq!(
        dispatcher.dispatch(msg).await.as_deref(),
        Some("IGN for Dana set to dana_the_brave")
    );
    let msg = ChatMessage::new("7", "Dana", ",global back next week").in_server("G2");
    assert_eq!(
        dispatcher.dispatch(msg).await.as_deref(),
        Some("Global data for Dana saved")
    );
    assert_eq!(db.close(), "Connection closed");
    drop(dispatcher);

    let reopened = PlayerDatabase::connect(Some(&ConnectParams::new(path.as_str()))).unwrap();
    let record = reopened.find_player("7").data.unwrap();
    assert_eq!(record.ign.as_deref(), Some("dana_the_brave"));
    assert_eq!(record.server_id.as_deref(), Some("G1"));
    assert_eq!(record.global_data.as_deref(), Some("back next week"));

    let info = get_database_info(&path);
    assert!(info.table_initialized);
    assert_eq!(info.player_count, Some(1));
}

#[tokio::test]
async fn concurrent_commands_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let db = Arc::new(PlayerDatabase::open_path(&config.sqlite_path()).unwrap());
    let dispatcher = Arc::new(create_dispatcher(Arc::clone(&db), config));

    let mut tasks = Vec::new();
    for i in 0..16 {
        let d = Arc::clone(&dispatcher);
        tasks.push(tokio::spawn(async move {
            let msg = ChatMessage::new(format!("{}", i % 4), "Player", format!(",ign name{}", i))
                .in_server("G1");
            d.dispatch(msg).await
        }));
    }
    for task in tasks {
        let reply = task.await.unwrap().unwrap();
        assert!(reply.starts_with("IGN for Player set to name"), "{}", reply);
    }

    // one row per distinct user, however the upserts interleaved
    let listing = db.read_all();
    assert_eq!(listing.data.unwrap().len(), 4);
}

#[tokio::test]
async fn failures_keep_the_connection_usable() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let db = Arc::new(PlayerDatabase::open_path(&config.sqlite_path()).unwrap());
    let dispatcher = create_dispatcher(Arc::clone(&db), config);

    let owner = |content: &str| ChatMessage::new("owner", "Owner", content).in_server("G1");

    let reply = dispatcher
        .dispatch(owner(",sql INSERT INTO nowhere VALUES (1)"))
        .await
        .unwrap();
    assert!(reply.contains("no such table: nowhere"), "{}", reply);
    match db.last_error() {
        Some(DbError::Statement(e)) => assert_eq!(e.sql, "INSERT INTO nowhere VALUES (1)"),
        other => panic!("unexpected last error: {:?}", other),
    }

    let reply = dispatcher.dispatch(owner(",db_create")).await.unwrap();
    assert!(reply.starts_with("Failed to create table players"), "{}", reply);
    assert_eq!(db.last_error().map(|e| e.kind()), Some(ErrorKind::Statement));

    let reply = dispatcher.dispatch(owner(",db_getrow")).await.unwrap();
    assert_eq!(reply, "0 records retrieved");
}
