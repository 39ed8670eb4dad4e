//! Integration tests for the condottiere binary.
//!
//! Spawns the engine process, feeds it a JSON-lines session on stdin and
//! checks the responses on stdout.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde_json::{json, Value};

const SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/mini_italy.json");

/// Sends a sequence of request lines to the engine and collects the parsed
/// response lines.
fn run_engine(requests: &[String]) -> Vec<Value> {
    let exe = env!("CARGO_BIN_EXE_condottiere");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start condottiere");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = BufReader::new(stdout);

    for req in requests {
        writeln!(stdin, "{}", req).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<Value> = reader
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).expect("response is not json"))
        .collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

fn new_game() -> String {
    json!({"cmd": "new_game", "path": SCENARIO, "now": 0}).to_string()
}

fn state(game: u64) -> String {
    json!({"cmd": "state", "game": game}).to_string()
}

/// Finds the player seated for a country in a state snapshot.
fn player_of(state: &Value, country: &str) -> u64 {
    state["players"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["country"] == country)
        .unwrap()["id"]
        .as_u64()
        .unwrap()
}

fn unit_in(state: &Value, area: &str) -> u64 {
    state["units"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["area"] == area && u["unit_type"] != "G")
        .unwrap()["id"]
        .as_u64()
        .unwrap()
}

fn kinds(events: &Value) -> Vec<String> {
    events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn new_game_and_state() {
    let lines = run_engine(&[new_game(), state(1), r#"{"cmd":"quit"}"#.to_string()]);
    assert_eq!(lines.len(), 3);

    let created = &lines[0]["ok"];
    assert_eq!(created["game"], 1);
    let events = kinds(&created["events"]);
    assert_eq!(events.iter().filter(|k| *k == "CountryEvent").count(), 3);
    assert_eq!(events.iter().filter(|k| *k == "NewUnit").count(), 6);

    let snapshot = &lines[1]["ok"];
    assert_eq!(snapshot["year"], 1454);
    assert_eq!(snapshot["season"], "spring");
    assert_eq!(snapshot["phase"], "orders");
    assert_eq!(snapshot["units"].as_array().unwrap().len(), 6);
    assert_eq!(lines[2], json!({"ok": null}));
}

#[test]
fn malformed_lines_get_errors_and_blank_lines_nothing() {
    let lines = run_engine(&[
        "not json".to_string(),
        String::new(),
        r#"{"cmd":"launch"}"#.to_string(),
        state(99),
        r#"{"cmd":"quit"}"#.to_string(),
    ]);
    assert_eq!(lines.len(), 4);
    assert!(lines[0]["error"].is_string());
    assert!(lines[1]["error"].is_string());
    assert_eq!(lines[2]["error"], "unknown game 99");
    assert_eq!(lines[3]["ok"], Value::Null);
}

#[test]
fn quit_stops_reading() {
    let lines = run_engine(&[r#"{"cmd":"quit"}"#.to_string(), new_game()]);
    assert_eq!(lines.len(), 1);
}

#[test]
fn eof_ends_session() {
    let lines = run_engine(&[new_game()]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["ok"]["game"].is_u64());
}

/// An engine process driven one request at a time.
struct Session {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Session {
    fn start() -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_condottiere"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to start condottiere");
        let stdin = child.stdin.take().unwrap();
        let stdout = BufReader::new(child.stdout.take().unwrap());
        Session { child, stdin, stdout }
    }

    fn send(&mut self, request: Value) -> Value {
        writeln!(self.stdin, "{}", request).unwrap();
        self.stdin.flush().unwrap();
        let mut line = String::new();
        self.stdout.read_line(&mut line).unwrap();
        serde_json::from_str(&line).expect("response is not json")
    }

    fn quit(mut self) {
        assert_eq!(self.send(json!({"cmd": "quit"})), json!({"ok": null}));
        assert!(self.child.wait().unwrap().success());
    }
}

#[test]
fn full_season_over_the_wire() {
    let mut session = Session::start();
    let created = session.send(json!({"cmd": "new_game", "path": SCENARIO, "now": 0}));
    let game = created["ok"]["game"].as_u64().unwrap();
    let snapshot = session.send(json!({"cmd": "state", "game": game}))["ok"].clone();
    let milan = player_of(&snapshot, "milan");
    let naples = player_of(&snapshot, "naples");
    let venice = player_of(&snapshot, "venice");
    let army = unit_in(&snapshot, "MIL");

    let echo = session.send(json!({
        "cmd": "order", "game": game, "player": milan,
        "order": {"unit_id": army, "code": "-", "destination": "PAD"}
    }));
    assert_eq!(echo["ok"]["events"][0]["payload"]["order"], "A MIL - PAD");

    let refused = session.send(json!({
        "cmd": "order", "game": game, "player": naples,
        "order": {"unit_id": army, "code": "H"}
    }));
    assert!(refused["error"].is_string());

    assert_eq!(
        session.send(json!({"cmd": "done", "game": game, "player": milan, "now": 10}))["ok"]["events"],
        json!([])
    );
    session.send(json!({"cmd": "done", "game": game, "player": naples, "now": 10}));
    let resolved = session.send(json!({"cmd": "done", "game": game, "player": venice, "now": 10}));
    let kinds = kinds(&resolved["ok"]["events"]);
    assert!(kinds.contains(&"Movement".to_string()));
    assert!(kinds.contains(&"NewSeason".to_string()));

    let after = session.send(json!({"cmd": "state", "game": game}))["ok"].clone();
    assert_eq!(after["season"], "summer");
    assert_eq!(after["phase"], "orders");
    assert_eq!(unit_in(&after, "PAD"), army);
    session.quit();
}

#[test]
fn retreat_requests_outside_retreats_phase_fail() {
    let mut session = Session::start();
    let created = session.send(json!({"cmd": "new_game", "path": SCENARIO, "now": 0}));
    let game = created["ok"]["game"].as_u64().unwrap();
    let snapshot = session.send(json!({"cmd": "state", "game": game}))["ok"].clone();
    let milan = player_of(&snapshot, "milan");
    let army = unit_in(&snapshot, "MIL");

    let reply = session.send(json!({
        "cmd": "retreat", "game": game, "player": milan, "unit": army, "area": "PAD"
    }));
    assert!(reply["error"].as_str().unwrap().contains("phase"));
    let reply = session.send(json!({
        "cmd": "reinforce", "game": game, "player": milan, "placements": []
    }));
    assert!(reply["error"].is_string());
    session.quit();
}

#[test]
fn config_then_tick_forces_phase() {
    let lines = run_engine(&[
        json!({"cmd": "config", "time_limit_secs": 5}).to_string(),
        new_game(),
        json!({"cmd": "tick", "now": 3}).to_string(),
        json!({"cmd": "tick", "now": 5}).to_string(),
        state(1),
    ]);
    assert_eq!(lines[0]["ok"], Value::Null);
    assert_eq!(lines[2]["ok"]["games"], json!([]));

    let games = lines[3]["ok"]["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["game"], 1);
    assert_eq!(kinds(&games[0]["events"])[0], "ForcePhase");
    assert_eq!(lines[4]["ok"]["season"], "summer");
}

#[test]
fn inline_scenario() {
    let scenario: Value =
        serde_json::from_str(&std::fs::read_to_string(SCENARIO).unwrap()).unwrap();
    let lines = run_engine(&[
        json!({"cmd": "new_game", "scenario": scenario, "now": 0}).to_string(),
        json!({"cmd": "new_game"}).to_string(),
    ]);
    assert_eq!(lines[0]["ok"]["game"], 1);
    assert!(lines[1]["error"].is_string());
}
