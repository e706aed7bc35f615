//! External agent bridge: a background worker owning the socket, a
//! single-slot handoff to the editor thread.
//!
//! The worker connects to the bridge process over loopback TCP and
//! reads newline-delimited JSON requests. Each request is pushed into
//! a bounded(1) channel and the worker blocks for the reply on a
//! per-request channel, re-checking shutdown once a second. The editor
//! thread drains the slot between keystrokes, executes the request as
//! ordinary buffer operations, and replies. Buffer state is therefore
//! mutated only on the editor thread, and at most one request is in
//! flight at any moment.
//!
//! Disconnection is recoverable: the worker flips the shared
//! `connected` flag (the status line shows it), latches a redraw, and
//! retries after a fixed delay.

mod protocol;

pub use protocol::{BridgeRequest, BridgeResponse};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed loopback port of the bridge process.
pub const BRIDGE_PORT: u16 = 9876;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RESPONSE_POLL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub port: u16,
    pub reconnect_delay: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: BRIDGE_PORT,
            reconnect_delay: Duration::from_secs(2),
        }
    }
}

/// A request waiting for the editor thread. Reply exactly once.
pub struct PendingRequest {
    pub request: BridgeRequest,
    pub reply: Sender<BridgeResponse>,
}

#[derive(Default)]
struct Shared {
    connected: AtomicBool,
    needs_redraw: AtomicBool,
    shutdown: AtomicBool,
    stream: Mutex<Option<TcpStream>>,
}

/// Editor-side view of the worker.
pub struct BridgeHandle {
    shared: Arc<Shared>,
    slot: Receiver<PendingRequest>,
}

impl BridgeHandle {
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// Consume the redraw latch (connect/disconnect edge).
    pub fn take_redraw(&self) -> bool {
        self.shared.needs_redraw.swap(false, Ordering::AcqRel)
    }

    /// Dequeue the pending request, if any. Non-blocking; the main
    /// loop calls this between keystrokes.
    pub fn try_take_request(&self) -> Option<PendingRequest> {
        self.slot.try_recv().ok()
    }

    /// Ask the worker to exit and unblock its socket read.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        if let Ok(guard) = self.shared.stream.lock()
            && let Some(stream) = guard.as_ref()
        {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Start the worker thread. Returns the editor-side handle and the
/// join handle for shutdown.
pub fn spawn(config: BridgeConfig) -> (BridgeHandle, JoinHandle<()>) {
    let shared = Arc::new(Shared::default());
    let (tx, rx) = bounded::<PendingRequest>(1);
    let worker_shared = Arc::clone(&shared);
    let join = thread::Builder::new()
        .name("cm-bridge".into())
        .spawn(move || worker_loop(worker_shared, tx, config))
        .expect("spawn bridge worker");
    (BridgeHandle { shared, slot: rx }, join)
}

fn sleep_checking_shutdown(shared: &Shared, total: Duration) {
    let step = Duration::from_millis(50);
    let mut elapsed = Duration::ZERO;
    while elapsed < total && !shared.shutdown.load(Ordering::Acquire) {
        thread::sleep(step);
        elapsed += step;
    }
}

fn worker_loop(shared: Arc<Shared>, slot: Sender<PendingRequest>, config: BridgeConfig) {
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    while !shared.shutdown.load(Ordering::Acquire) {
        let stream = match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => stream,
            Err(_) => {
                sleep_checking_shutdown(&shared, config.reconnect_delay);
                continue;
            }
        };
        info!(target: "bridge", port = config.port, "connected");
        if let Ok(clone) = stream.try_clone()
            && let Ok(mut guard) = shared.stream.lock()
        {
            *guard = Some(clone);
        }
        shared.connected.store(true, Ordering::Release);
        shared.needs_redraw.store(true, Ordering::Release);

        serve_connection(&shared, &slot, stream);

        if let Ok(mut guard) = shared.stream.lock() {
            *guard = None;
        }
        shared.connected.store(false, Ordering::Release);
        shared.needs_redraw.store(true, Ordering::Release);
        info!(target: "bridge", "disconnected");

        if !shared.shutdown.load(Ordering::Acquire) {
            sleep_checking_shutdown(&shared, Duration::from_secs(1));
        }
    }
    debug!(target: "bridge", "worker exit");
}

/// Serve one connection until the stream errors, the peer closes, or
/// shutdown is requested.
fn serve_connection(shared: &Shared, slot: &Sender<PendingRequest>, stream: TcpStream) {
    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(_) => return,
    };
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        if shared.shutdown.load(Ordering::Acquire) {
            return;
        }
        let line = match line {
            Ok(line) => line,
            Err(_) => return,
        };
        if line.trim().is_empty() {
            continue;
        }

        let request: BridgeRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                // Malformed record: answer with an error and keep the
                // stream alive.
                warn!(target: "bridge", %err, "unparseable request");
                let resp = BridgeResponse::failure(0, "JSON parse error");
                if writer.write_all(resp.to_line().as_bytes()).is_err() {
                    return;
                }
                continue;
            }
        };

        debug!(target: "bridge", id = request.id, cmd = %request.cmd, "request");
        let (reply_tx, reply_rx) = bounded::<BridgeResponse>(1);
        if slot
            .send(PendingRequest {
                request,
                reply: reply_tx,
            })
            .is_err()
        {
            return;
        }

        // Block for the editor's reply, waking periodically so a
        // shutdown request is honored within a second.
        let response = loop {
            match reply_rx.recv_timeout(RESPONSE_POLL) {
                Ok(response) => break Some(response),
                Err(RecvTimeoutError::Timeout) => {
                    if shared.shutdown.load(Ordering::Acquire) {
                        break None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break None,
            }
        };
        let Some(response) = response else { return };
        if writer.write_all(response.to_line().as_bytes()).is_err() {
            return;
        }
    }
}
