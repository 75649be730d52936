//! One client session: a prompt, line commands, one transaction.
//!
//! Commands: `read <key>`, `insert <key> <value>`, `update <key>
//! <value>`, `delete <key>`, `commit`, `abort`, `all`. Errors are
//! reported as a text line and the session continues; commit and abort
//! end the session.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use tracing::{debug, warn};

use crate::engine::Database;

const PROMPT: &str = "seccampdb >> ";

pub fn run(db: &Database, stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    debug!(%peer, "session started");

    if let Err(e) = drive(db, stream) {
        warn!(%peer, error = %e, "session ended with I/O error");
    } else {
        debug!(%peer, "session ended");
    }
}

fn drive(db: &Database, stream: TcpStream) -> std::io::Result<()> {
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);
    let mut tx = db.begin();

    write!(writer, "{PROMPT}")?;
    writer.flush()?;

    for line in reader.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();

        match fields.as_slice() {
            [] => {}
            ["read", key] => match tx.read(key) {
                Ok(value) => writeln!(writer, "{value}")?,
                Err(e) => writeln!(writer, "{e}")?,
            },
            ["read", ..] => writeln!(writer, "wrong format -> read <key>")?,
            ["insert", key, value] => {
                if let Err(e) = tx.insert(key, value) {
                    writeln!(writer, "{e}")?;
                }
            }
            ["insert", ..] => writeln!(writer, "wrong format -> insert <key> <value>")?,
            ["update", key, value] => {
                if let Err(e) = tx.update(key, value) {
                    writeln!(writer, "{e}")?;
                }
            }
            ["update", ..] => writeln!(writer, "wrong format -> update <key> <value>")?,
            ["delete", key] => {
                if let Err(e) = tx.delete(key) {
                    writeln!(writer, "{e}")?;
                }
            }
            ["delete", ..] => writeln!(writer, "wrong format -> delete <key>")?,
            ["commit"] => {
                match tx.commit() {
                    Ok(()) => writeln!(writer, "committed")?,
                    Err(e) => writeln!(writer, "{e}")?,
                }
                return Ok(());
            }
            ["abort"] => {
                tx.abort();
                writeln!(writer, "aborted")?;
                return Ok(());
            }
            ["all"] => {
                writeln!(writer, "key\t\t| value")?;
                writeln!(writer, "----------------------------")?;
                for (key, value) in db.dump() {
                    writeln!(writer, "{key}\t\t| {value}")?;
                }
                writeln!(writer, "----------------------------")?;
            }
            _ => writeln!(writer, "command not supported")?,
        }

        write!(writer, "{PROMPT}")?;
        writer.flush()?;
    }

    // Disconnect without commit: the transaction drops and its staged
    // state evaporates.
    Ok(())
}
