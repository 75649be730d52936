//! TCP front end: an accept loop handing each connection its own thread
//! and session.

pub mod session;

use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::engine::Database;

/// Listen on `addr` and serve sessions until the process exits. Each
/// connection gets one thread and one transaction.
pub fn serve(db: Arc<Database>, addr: &str) -> io::Result<()> {
    let listener = TcpListener::bind(addr)?;
    info!(%addr, "listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let db = Arc::clone(&db);
                thread::spawn(move || session::run(&db, stream));
            }
            Err(e) => warn!(error = %e, "failed to accept connection"),
        }
    }
    Ok(())
}
