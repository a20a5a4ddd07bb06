use futures::FutureExt;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{self, AsyncRead, AsyncWrite};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info};
use tracing_attributes::instrument;

use super::handler;
use crate::memcache::store as storage;
use crate::protocol::text::connection::MemcacheTextConnection;
use crate::protocol::text::decoder;
use crate::protocol::text::encoder::{Response, BAD_DATA_CHUNK, OBJECT_TOO_LARGE};
use crate::protocol::text::network::{Frame, StorageHeader, TextRequest};

pub struct ClientConfig {
    pub(crate) item_size_limit: u64,
    pub(crate) idle_timeout_secs: u64,
    pub(crate) fanout_limit: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// waiting for a request line
    Open,
    /// storage header accepted, data block not consumed yet
    AwaitingPayload,
    Closed,
}

pub struct Client<S> {
    stream: MemcacheTextConnection<S>,
    addr: SocketAddr,
    config: ClientConfig,
    handler: handler::TextHandler,
    state: SessionState,
    /// Max connection semaphore.
    ///
    /// When the client is dropped, a permit is returned to this semaphore. If
    /// the listener is waiting for connections to close, it will be notified of
    /// the newly available permit and resume accepting connections.
    limit_connections: Arc<Semaphore>,
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        store: Arc<storage::MemcStore>,
        socket: S,
        addr: SocketAddr,
        config: ClientConfig,
        limit_connections: Arc<Semaphore>,
    ) -> Self {
        Client {
            stream: MemcacheTextConnection::new(socket),
            addr,
            handler: handler::TextHandler::new(store, config.fanout_limit),
            config,
            state: SessionState::Open,
            limit_connections,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[instrument(skip(self), fields(client = %self.addr))]
    pub async fn handle(&mut self) {
        debug!("New client connected");

        while self.state != SessionState::Closed {
            let line = match self.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("Connection closed");
                    self.state = SessionState::Closed;
                    break;
                }
                Err(err) => {
                    log_error(err);
                    self.state = SessionState::Closed;
                    break;
                }
            };

            if let Err(err) = self.handle_line(&line).await {
                log_error(err);
                self.state = SessionState::Closed;
            }
        }
    }

    async fn read_line(&mut self) -> io::Result<Option<bytes::Bytes>> {
        if self.config.idle_timeout_secs == 0 {
            return self.stream.read_line().await;
        }
        match timeout(
            Duration::from_secs(self.config.idle_timeout_secs),
            self.stream.read_line(),
        )
        .await
        {
            Ok(line) => line,
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "Timeout {}s elapsed, disconnecting client",
                    self.config.idle_timeout_secs
                ),
            )),
        }
    }

    /// Handles a single request line, I/O errors end the session
    async fn handle_line(&mut self, line: &[u8]) -> io::Result<()> {
        match decoder::parse_line(line) {
            Ok(Frame::Request(TextRequest::Quit)) => {
                debug!("Closing client socket quit command");
                self.state = SessionState::Closed;
                if let Err(err) = self.stream.shutdown().await {
                    log_error(err);
                }
                Ok(())
            }
            Ok(Frame::Request(request)) => self.dispatch(request).await,
            Ok(Frame::Storage(header)) => self.handle_storage(header).await,
            Err(err) => {
                debug!("Invalid request: {}", err);
                self.stream.write(&Response::from(err)).await
            }
        }
    }

    async fn handle_storage(&mut self, header: StorageHeader) -> io::Result<()> {
        self.state = SessionState::AwaitingPayload;

        if header.bytes as u64 > self.config.item_size_limit {
            debug!(
                "Item of {} bytes exceeds limit {}",
                header.bytes, self.config.item_size_limit
            );
            self.stream.skip_payload(header.bytes).await?;
            self.state = SessionState::Open;
            if header.noreply {
                return Ok(());
            }
            return self
                .stream
                .write(&Response::server_error(OBJECT_TOO_LARGE))
                .await;
        }

        let value = match self.stream.read_payload(header.bytes).await {
            Ok(value) => value,
            Err(err) => {
                if err.kind() == io::ErrorKind::InvalidData {
                    let response = Response::server_error(BAD_DATA_CHUNK);
                    if let Err(write_err) = self.stream.write(&response).await {
                        debug!("Cannot report bad data chunk: {}", write_err);
                    }
                }
                return Err(err);
            }
        };
        self.state = SessionState::Open;
        self.dispatch(header.into_request(value)).await
    }

    async fn dispatch(&mut self, request: TextRequest) -> io::Result<()> {
        let verb = request.verb();
        let noreply = request.noreply();
        debug!("Got request {}", verb);

        let response = match AssertUnwindSafe(self.handler.handle_request(request))
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(_panic) => {
                error!("Internal error while handling {}", verb);
                if noreply {
                    None
                } else {
                    Some(Response::server_error("internal error"))
                }
            }
        };

        match response {
            Some(response) => {
                debug!("Sending response {:?}", response);
                self.stream.write(&response).await
            }
            None => Ok(()),
        }
    }
}

impl<S> Drop for Client<S> {
    fn drop(&mut self) {
        // Add a permit back to the semaphore.
        //
        // Done in `Drop` so the permit is returned even if the task
        // handling the connection panics.
        self.limit_connections.add_permits(1);
    }
}

fn log_error(e: io::Error) {
    // in most cases its not an error
    // client may just drop connection
    match e.kind() {
        io::ErrorKind::NotConnected
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::BrokenPipe => info!("Error: {}", e),
        io::ErrorKind::TimedOut => debug!("{}", e),
        _ => error!("Error: {}", e),
    }
}
