//! Integration Tests for Report Modes
//!
//! Drives every mode end-to-end against a canned memcached server over
//! real sockets, and checks the binary's exit behavior.

use std::collections::HashMap;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use memcached_itool::config::{Mode, Target};
use memcached_itool::protocol::connect;
use memcached_itool::report::{self, render_text, Report};
use memcached_itool::slabs::ExpireStatus;
use memcached_itool::StatsClient;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

// == Fake Server ==

const NOW: i64 = 1_700_001_000;

type Log = Arc<Mutex<Vec<String>>>;

fn canned_replies() -> HashMap<String, String> {
    let mut replies = HashMap::new();
    let mut add = |command: &str, reply: &str| {
        replies.insert(command.to_string(), reply.to_string());
    };

    add(
        "stats",
        "STAT pid 4242\r\nSTAT uptime 1000\r\nSTAT time 1700001000\r\n\
         STAT version 1.6.21\r\nSTAT evictions 0\r\nEND\r\n",
    );
    add(
        "stats settings",
        "STAT maxbytes 67108864\r\nSTAT growth_factor 1.25\r\n\
         STAT item_size_max 1048576\r\nSTAT evictions on\r\nEND\r\n",
    );
    add(
        "stats slabs",
        "STAT 1:chunk_size 96\r\nSTAT 1:total_pages 1\r\nSTAT 1:free_chunks_end 10\r\n\
         STAT 1:mem_requested 144\r\nSTAT 2:chunk_size 120\r\nSTAT 2:total_pages 1\r\n\
         STAT active_slabs 2\r\nSTAT total_malloced 2097152\r\nEND\r\n",
    );
    add(
        "stats items",
        "STAT items:1:number 3\r\nSTAT items:1:age 60\r\nSTAT items:1:evicted 0\r\nEND\r\n",
    );
    add("stats sizes", "STAT 100 5\r\nEND\r\n");
    // Process start is 1700000000: "forever" never expires
    add(
        "stats cachedump 1 3",
        "ITEM forever [48 b; 1700000000 s]\r\nITEM live [48 b; 1700001100 s]\r\n\
         ITEM old [24 b; 1700000999 s]\r\nEND\r\n",
    );
    add("get forever", "VALUE forever 0 5\r\nhello\r\nEND\r\n");
    add("get live", "VALUE live 16 5\r\nworld\r\nEND\r\n");
    add("get old", "END\r\n");
    replies
}

/// Answers commands on one connection until the client hangs up.
async fn serve<S>(stream: S, log: Log)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let replies = canned_replies();
    let mut stream = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();
        if stream.read_line(&mut line).await.unwrap_or(0) == 0 {
            break;
        }
        let command = line.trim_end().to_string();
        let reply = replies
            .get(&command)
            .cloned()
            .unwrap_or_else(|| "ERROR\r\n".to_string());
        log.lock().unwrap().push(command);
        if stream.get_mut().write_all(reply.as_bytes()).await.is_err() {
            break;
        }
    }
}

async fn spawn_tcp_server() -> (Target, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let server_log = log.clone();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            serve(stream, server_log).await;
        }
    });

    let target = Target::Tcp {
        host: "127.0.0.1".to_string(),
        port,
    };
    (target, log)
}

async fn run_mode(mode: Mode) -> (Report, Vec<String>) {
    let (target, log) = spawn_tcp_server().await;
    let stream = connect(&target, Duration::from_secs(5)).await.unwrap();
    let mut client = StatsClient::new(stream);

    let report = report::run(&mut client, mode, NOW).await.unwrap();
    let commands = log.lock().unwrap().clone();
    (report, commands)
}

// == Mode Tests ==

#[tokio::test]
async fn test_sizes_mode() {
    let (report, commands) = run_mode(Mode::Sizes).await;

    match &report {
        Report::Sizes(sizes) => {
            assert_eq!(sizes.rows.len(), 1);
            assert_eq!(sizes.rows[0].size, 100);
            assert_eq!(sizes.rows[0].items, 5);
            assert!(sizes.rows[0].chunk_size >= 100.0);
        }
        other => panic!("unexpected report: {:?}", other),
    }
    assert_eq!(commands, vec!["stats settings", "stats sizes"]);
    assert!(render_text(&report).contains("100B"));
}

#[tokio::test]
async fn test_display_mode() {
    let (report, commands) = run_mode(Mode::Display).await;

    let display = match report {
        Report::Display(display) => display,
        other => panic!("unexpected report: {:?}", other),
    };
    assert_eq!(commands, vec!["stats slabs", "stats items", "stats settings"]);

    let ids: Vec<u32> = display.slabs.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let first = &display.slabs[0];
    assert!(!first.full);
    assert_eq!(first.record.number, 3);
    // 144 requested of 3 * 96
    assert!((first.wasted_percent - 50.0).abs() < 1e-9);

    let second = &display.slabs[1];
    assert!(second.full);
    assert_eq!(second.record.number, 0);
    assert_eq!(second.wasted_percent, 0.0);

    assert_eq!(display.total.get("total_malloced"), Some("2097152"));
    assert_eq!(display.capacity.estimate.pages, 42);
}

#[tokio::test]
async fn test_stats_and_settings_modes() {
    let (report, commands) = run_mode(Mode::Stats).await;
    assert_eq!(commands, vec!["stats"]);
    match report {
        Report::Stats(fields) => assert_eq!(fields.fields.get("version"), Some("1.6.21")),
        other => panic!("unexpected report: {:?}", other),
    }

    let (report, commands) = run_mode(Mode::Settings).await;
    assert_eq!(commands, vec!["stats settings"]);
    match report {
        Report::Settings(fields) => assert_eq!(fields.fields.get("growth_factor"), Some("1.25")),
        other => panic!("unexpected report: {:?}", other),
    }
}

#[tokio::test]
async fn test_dumpkeys_mode_is_read_only() {
    let (report, commands) = run_mode(Mode::Dumpkeys).await;

    let dump = match report {
        Report::Dumpkeys(dump) => dump,
        other => panic!("unexpected report: {:?}", other),
    };
    let statuses: Vec<ExpireStatus> = dump.items.iter().map(|row| row.status).collect();
    assert_eq!(
        statuses,
        vec![
            ExpireStatus::NeverExpires,
            ExpireStatus::Remaining(100),
            ExpireStatus::Expired
        ]
    );
    assert_eq!(dump.fetched, 0);
    assert!(commands.iter().all(|c| !c.starts_with("get ")));
    assert!(commands.contains(&"stats cachedump 1 3".to_string()));
}

#[tokio::test]
async fn test_dump_mode_fetches_live_values() {
    let (report, commands) = run_mode(Mode::Dump).await;

    let dump = match report {
        Report::Dump(dump) => dump,
        other => panic!("unexpected report: {:?}", other),
    };
    assert_eq!(dump.fetched, 2);
    assert_eq!(dump.items[0].value.as_ref().unwrap().data, "hello");
    assert_eq!(dump.items[1].value.as_ref().unwrap().flags, 16);
    assert!(dump.items[2].value.is_none());

    assert!(commands.contains(&"get forever".to_string()));
    assert!(commands.contains(&"get live".to_string()));
    assert!(!commands.contains(&"get old".to_string()));
}

#[tokio::test]
async fn test_removeexp_mode_fetches_expired_only() {
    let (report, commands) = run_mode(Mode::Removeexp).await;

    let dump = match &report {
        Report::Removeexp(dump) => dump,
        other => panic!("unexpected report: {:?}", other),
    };
    assert_eq!(dump.fetched, 1);

    let gets: Vec<&String> = commands.iter().filter(|c| c.starts_with("get ")).collect();
    assert_eq!(gets, vec!["get old"]);
    assert!(render_text(&report).contains("Removed 1 expired keys"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unix_socket_transport() {
    let path = std::env::temp_dir().join(format!("memcached-itool-{}.sock", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let listener = tokio::net::UnixListener::bind(&path).unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let server_log = log.clone();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            serve(stream, server_log).await;
        }
    });

    let target = Target::parse(path.to_str().unwrap()).unwrap();
    let stream = connect(&target, Duration::from_secs(5)).await.unwrap();
    let mut client = StatsClient::new(stream);
    let report = report::run(&mut client, Mode::Stats, NOW).await.unwrap();

    assert!(matches!(report, Report::Stats(_)));
    let _ = std::fs::remove_file(&path);
}

// == Binary Tests ==

#[test]
fn test_binary_without_address_prints_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_memcached-itool"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_binary_rejects_unknown_mode() {
    let output = Command::new(env!("CARGO_BIN_EXE_memcached-itool"))
        .args(["localhost", "flush_all"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_binary_connection_failure_exits_non_zero() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let output = Command::new(env!("CARGO_BIN_EXE_memcached-itool"))
        .args([format!("127.0.0.1:{}", port).as_str(), "stats"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot reach memcached"));
}
