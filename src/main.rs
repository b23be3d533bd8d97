//! duelcore - authoritative match server over stdio
//!
//! ## Usage
//!
//! ```text
//! duelcore --catalog catalog.json [--config engine.json]
//! ```
//!
//! Reads one JSON object per line from stdin:
//!
//! ```text
//! {"connection": 1, "intent": {"type": "Register", "name": "Alice", "deck": [1, 1, 2]}}
//! {"connection": 1, "intent": {"type": "StopTurn"}}
//! {"connection": 1}                      <- connection dropped
//! ```
//!
//! and writes every outbound message as `{"connection": N, "message": {...}}`
//! to stdout. Logs go to stderr, filtered by `RUST_LOG`.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use duelcore::net::{ChannelInbox, InboundMessage};
use duelcore::{
    Catalog, ClientIntent, ConnectionId, EngineConfig, Match, MatchServer, ServerMessage,
    Transport,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct ServerArgs {
    catalog: Option<String>,
    config: Option<String>,
}

fn parse_args() -> ServerArgs {
    let args: Vec<String> = env::args().collect();
    let mut catalog = None;
    let mut config = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" | "--config" if i + 1 >= args.len() => {
                eprintln!("Error: {} requires a file path", args[i]);
                i += 1;
            }
            "--catalog" => {
                catalog = Some(args[i + 1].clone());
                i += 2;
            }
            "--config" => {
                config = Some(args[i + 1].clone());
                i += 2;
            }
            other => {
                eprintln!("Warning: ignoring unknown argument {other}");
                i += 1;
            }
        }
    }
    ServerArgs { catalog, config }
}

#[derive(Deserialize)]
struct InputLine {
    connection: u64,
    #[serde(default)]
    intent: Option<ClientIntent>,
}

impl From<InputLine> for InboundMessage {
    fn from(line: InputLine) -> Self {
        let connection = ConnectionId(line.connection);
        match line.intent {
            Some(intent) => InboundMessage::Intent { connection, intent },
            None => InboundMessage::Disconnected { connection },
        }
    }
}

#[derive(Serialize)]
struct OutputLine<'a> {
    connection: u64,
    message: &'a ServerMessage,
}

/// Writes each message as one JSON line on stdout.
struct StdoutTransport {
    out: io::Stdout,
}

impl Transport for StdoutTransport {
    fn send(&mut self, connection: ConnectionId, message: &ServerMessage) {
        let line = OutputLine {
            connection: connection.0,
            message,
        };
        let result = serde_json::to_string(&line)
            .map_err(io::Error::other)
            .and_then(|json| writeln!(self.out.lock(), "{json}"));
        if let Err(err) = result {
            warn!(%err, message = message.name(), "failed to write message");
        }
    }
}

fn load(args: &ServerArgs) -> Result<(Catalog, EngineConfig), String> {
    let catalog_path = args
        .catalog
        .as_deref()
        .ok_or("Error: --catalog <path> is required")?;
    let text = fs::read_to_string(catalog_path)
        .map_err(|err| format!("Error: cannot read {catalog_path}: {err}"))?;
    let catalog = Catalog::from_json(&text).map_err(|err| format!("Error: {err}"))?;

    let config = match args.config.as_deref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|err| format!("Error: cannot read {path}: {err}"))?;
            EngineConfig::from_json(&text).map_err(|err| format!("Error: {path}: {err}"))?
        }
        None => EngineConfig::default(),
    };
    Ok((catalog, config))
}

fn spawn_stdin_reader(sender: mpsc::Sender<InboundMessage>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<InputLine>(&line) {
                Ok(input) => {
                    if sender.send(input.into()).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%err, "unreadable input line"),
            }
        }
    });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = parse_args();
    let (catalog, config) = match load(&args) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    info!(
        cards = catalog.cards().count(),
        players = config.players_per_match,
        "catalog loaded"
    );

    let (sender, receiver) = mpsc::channel();
    spawn_stdin_reader(sender);

    let engine = Match::new(
        Arc::new(catalog),
        config,
        StdoutTransport { out: io::stdout() },
    );
    let mut server = MatchServer::new(ChannelInbox::new(receiver), engine);
    server.run();
    info!(status = ?server.engine().state().turn.status, "server stopped");
}
