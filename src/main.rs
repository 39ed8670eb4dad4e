//! Condottiere: a Machiavelli-style adjudication engine speaking JSON lines.
//!
//! Reads one request per line from stdin and writes one response per line to
//! stdout. Diagnostics go to stderr through `env_logger` (`RUST_LOG=debug`).

use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use condottiere::config::EngineConfig;
use condottiere::engine::Engine;
use condottiere::protocol::{handle, parse_request, Request, Response};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn main() -> io::Result<()> {
    env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new(EngineConfig::default());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("stdin: {}", e);
                break;
            }
        };

        let request = match parse_request(&line) {
            Ok(Some(r)) => r,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("rejected line: {}", e);
                writeln!(out, "{}", Response::Error(e.to_string()).to_line())?;
                out.flush()?;
                continue;
            }
        };

        let quit = request == Request::Quit;
        let response = Response::from(handle(&mut engine, request, unix_now()));
        writeln!(out, "{}", response.to_line())?;
        out.flush()?;
        if quit {
            break;
        }
    }
    Ok(())
}
