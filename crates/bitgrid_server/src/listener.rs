//! The accept loop: binds a listener, spawns one thread per connection,
//! and polls for a `SHUTDOWN` request between accepts.

use crate::error::ServerError;
use crate::handler::handle_client;
use crate::link::LinkForward;
use crate::state::{Shared, ServerState};
use bitgrid_ir::Program;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Serves `program` over BGCF at `host:port` until a client sends
/// `SHUTDOWN`. Blocks the calling thread.
pub fn serve(
    host: &str,
    port: u16,
    program: Program,
    bitstream: Option<&[u8]>,
    link_forward: LinkForward,
    verbose: bool,
) -> Result<(), ServerError> {
    let mut state = ServerState::new(program);
    if let Some(data) = bitstream {
        state.emulator.load_bitstream(data)?;
    }
    let shared = Arc::new(Shared {
        state: Mutex::new(state),
        link_forward,
        verbose,
    });
    let shutdown = Arc::new(AtomicBool::new(false));

    let listener = TcpListener::bind((host, port))?;
    listener.set_nonblocking(true)?;
    if verbose {
        eprintln!("[bitgrid_server] listening on {host}:{port}");
    }

    loop {
        match listener.accept() {
            Ok((stream, _addr)) => {
                let _ = stream.set_nonblocking(false);
                let shared = Arc::clone(&shared);
                let shutdown = Arc::clone(&shutdown);
                thread::spawn(move || handle_client(stream, shared, shutdown));
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if shutdown.load(Ordering::SeqCst) {
                    if verbose {
                        eprintln!("[bitgrid_server] shutdown requested, stopping listener");
                    }
                    return Ok(());
                }
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => return Err(e.into()),
        }
    }
}
