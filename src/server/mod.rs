//! Line Protocol Server
//!
//! The thin front-end that turns bytes into command strings: one TCP
//! client per task, one command per input line, one JSON response per
//! line.

mod response;

pub use response::CommandResponse;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::cache::{Cache, Table};
use crate::commands;

/// Serves clients on `listener` until the surrounding task is cancelled.
pub async fn serve<T: Table>(listener: TcpListener, cache: Arc<Cache<T>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "client connected");
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    if let Err(err) = handle_client(stream, cache).await {
                        warn!(%peer, error = %err, "client connection ended with error");
                    }
                    debug!(%peer, "client disconnected");
                });
            }
            Err(err) => warn!(error = %err, "failed to accept connection"),
        }
    }
}

/// Reads command lines from one client until EOF. Malformed input never
/// ends the connection; it is answered with a failed response like any
/// other error.
async fn handle_client<T: Table>(stream: TcpStream, cache: Arc<Cache<T>>) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let result = match commands::parse(&line) {
            Ok(command) => {
                debug!(command = %command, "executing");
                command.execute(&cache).await
            }
            Err(err) => Err(err),
        };

        let response = CommandResponse::from_result(&result);
        let mut body = match serde_json::to_vec(&response) {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "couldn't encode response");
                continue;
            }
        };
        body.push(b'\n');
        writer.write_all(&body).await?;
    }

    Ok(())
}
