//! Video Pocket RPC Server: JSON-RPC over stdin/stdout for a UI shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"video.add", "params":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Event:    {"event":"download.finished", "url":"...", "ok":true, "path":"..."}

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use video_pocket::app::App;
use video_pocket::logging::init_tracing;
use video_pocket::platform;
use video_pocket::rpc_handler::handle_method;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

/// Writes one protocol line. Stdout is locked per line so events never interleave with responses.
fn emit(line: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
        warn!("stdout closed, dropping protocol line");
    }
}

fn main() {
    init_tracing();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start tokio runtime");
            std::process::exit(1);
        }
    };

    let data_dir = platform::get_data_dir();
    let mut app = match App::new(&data_dir) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, data_dir = %data_dir.display(), "Failed to initialize Video Pocket");
            std::process::exit(1);
        }
    };

    if let Some(mut events) = app.take_events() {
        runtime.spawn(async move {
            while let Some(event) = events.recv().await {
                emit(&event);
            }
        });
    }
    let app = Mutex::new(app);

    emit(&json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    info!(data_dir = %data_dir.display(), "RPC server listening on stdin");

    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            emit(&json!({"id": id, "error": "rate limit exceeded"}));
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, runtime.handle(), method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&response);
    }

    info!("stdin closed, shutting down");
}
