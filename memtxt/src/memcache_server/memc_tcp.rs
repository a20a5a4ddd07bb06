use socket2::{Domain, SockAddr, Socket, Type};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use tokio::io;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use tracing::{debug, error, info};

use super::client_handler;
use crate::cache::cache::Cache;
use crate::memcache::store as storage;
use crate::server::timer::Timer;

#[derive(Clone, Copy, Debug)]
pub struct MemcacheServerConfig {
    idle_timeout_secs: u64,
    connection_limit: u32,
    item_size_limit: u64,
    listen_backlog: u32,
    fanout_limit: usize,
}

impl MemcacheServerConfig {
    pub fn new(
        idle_timeout_secs: u64,
        connection_limit: u32,
        item_size_limit: u64,
        listen_backlog: u32,
        fanout_limit: usize,
    ) -> Self {
        MemcacheServerConfig {
            idle_timeout_secs,
            connection_limit,
            item_size_limit,
            listen_backlog,
            fanout_limit,
        }
    }
}

#[derive(Clone)]
pub struct MemcacheTcpServer {
    storage: Arc<storage::MemcStore>,
    limit_connections: Arc<Semaphore>,
    config: MemcacheServerConfig,
    cancellation_token: CancellationToken,
}

impl MemcacheTcpServer {
    pub fn new(
        config: MemcacheServerConfig,
        store: Arc<dyn Cache + Send + Sync>,
        timer: Arc<dyn Timer + Send + Sync>,
        cancellation_token: CancellationToken,
    ) -> MemcacheTcpServer {
        MemcacheTcpServer {
            storage: Arc::new(storage::MemcStore::new(store, timer)),
            limit_connections: Arc::new(Semaphore::new(config.connection_limit as usize)),
            config,
            cancellation_token,
        }
    }

    /// Binds `addr` and serves clients until cancelled
    pub async fn run<A: ToSocketAddrs>(&mut self, addr: A) -> io::Result<()> {
        let listener = self.get_tcp_listener(addr)?;
        self.serve(listener).await
    }

    /// Serves clients from an already bound listener until cancelled
    pub async fn serve(&mut self, listener: TcpListener) -> io::Result<()> {
        info!("Accepting connections on {:?}", listener.local_addr()?);
        loop {
            let permit = tokio::select! {
                permit = self.limit_connections.acquire() => permit,
                _ = self.cancellation_token.cancelled() => {
                    debug!("Server stopped");
                    return Ok(());
                }
            };
            match permit {
                // returned by the client on drop
                Ok(permit) => permit.forget(),
                Err(err) => {
                    error!("Connection limiter closed: {}", err);
                    return Ok(());
                }
            }

            tokio::select! {
                connection = listener.accept() => {
                    match connection {
                        Ok((socket, peer_addr)) => {
                            socket.set_nodelay(true)?;
                            let mut client = client_handler::Client::new(
                                Arc::clone(&self.storage),
                                socket,
                                peer_addr,
                                self.get_client_config(),
                                Arc::clone(&self.limit_connections)
                            );
                            let cancellation_token = self.cancellation_token.clone();
                            tokio::spawn(async move {
                                tokio::select! {
                                    _ = client.handle() => {}
                                    _ = cancellation_token.cancelled() => {
                                        debug!("Client {} dropped on shutdown", peer_addr);
                                    }
                                }
                            });
                        },
                        Err(err) => {
                            self.limit_connections.add_permits(1);
                            error!("Accept error: {}", err);
                        }
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    self.limit_connections.add_permits(1);
                    debug!("Server stopped");
                    return Ok(());
                }
            }
        }
    }

    pub fn get_tcp_listener<A: ToSocketAddrs>(
        &self,
        addr: A,
    ) -> Result<TcpListener, std::io::Error> {
        let mut addrs_iter = addr.to_socket_addrs()?;
        let socket_addr: SocketAddr = match addrs_iter.next() {
            Some(socket_addr) => socket_addr,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "No address to bind to",
                ))
            }
        };
        let socket = Socket::new(Domain::for_address(socket_addr), Type::STREAM, None)?;
        socket.set_reuse_address(true)?;
        socket.set_reuse_port(true)?;
        socket.set_nonblocking(true)?;

        debug!("Binding to addr: {:?}", socket_addr);
        let sock_addr = SockAddr::from(socket_addr);
        if let Err(err) = socket.bind(&sock_addr) {
            error!("Can't bind to: {:?}, err {:?}", socket_addr, err);
            return Err(err);
        }

        if let Err(err) = socket.listen(self.config.listen_backlog as i32) {
            error!("Listen error: {:?}", err);
            return Err(err);
        }

        let std_listener: std::net::TcpListener = socket.into();
        TcpListener::from_std(std_listener)
    }

    fn get_client_config(&self) -> client_handler::ClientConfig {
        client_handler::ClientConfig {
            item_size_limit: self.config.item_size_limit,
            idle_timeout_secs: self.config.idle_timeout_secs,
            fanout_limit: self.config.fanout_limit,
        }
    }
}
