use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener as StdTcpListener, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use memtxt::memcache::builder::{MemcacheStoreBuilder, MemcacheStoreConfig};
use memtxt::memcache_server::memc_tcp::{MemcacheServerConfig, MemcacheTcpServer};
use memtxt::server::timer::SystemTimer;
use tokio_util::sync::CancellationToken;

mod params_builder;
pub use params_builder::MemtxtdServerParamsBuilder;

/// Server running on its own runtime thread, stopped on drop
pub struct MemtxtdTestServer {
    addr: SocketAddr,
    cancellation_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl MemtxtdTestServer {
    pub fn connect(&self) -> TextClient {
        TextClient::connect(self.addr)
    }
}

impl Drop for MemtxtdTestServer {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("Server thread panicked");
            }
        }
    }
}

pub fn spawn_server(params: MemtxtdServerParamsBuilder) -> MemtxtdTestServer {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let cancellation_token = CancellationToken::new();
    let token = cancellation_token.clone();

    let handle = std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let timer = Arc::new(SystemTimer::new(token.clone()));
            let store = MemcacheStoreBuilder::from_config(
                MemcacheStoreConfig::new(params.engine, params.memory_limit, params.policy),
                timer.clone(),
            );
            let mut server = MemcacheTcpServer::new(
                MemcacheServerConfig::new(
                    params.idle_timeout,
                    params.connection_limit,
                    params.item_size_limit,
                    128,
                    params.fanout_limit,
                ),
                store,
                timer.clone(),
                token,
            );
            let timer_task = tokio::spawn(async move { timer.run().await });
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            server.serve(listener).await.unwrap();
            timer_task.await.unwrap();
        });
    });

    MemtxtdTestServer {
        addr,
        cancellation_token,
        handle: Some(handle),
    }
}

/// Minimal blocking text protocol client
pub struct TextClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

#[allow(dead_code)]
impl TextClient {
    fn connect(addr: SocketAddr) -> TextClient {
        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream.set_nodelay(true).unwrap();
        let writer = stream.try_clone().unwrap();
        TextClient {
            reader: BufReader::new(stream),
            writer,
        }
    }

    pub fn send(&mut self, data: &[u8]) {
        self.writer.write_all(data).unwrap();
        self.writer.flush().unwrap();
    }

    /// Reads one response line without the trailing CRLF
    pub fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        assert!(line.ends_with("\r\n"), "unterminated line {:?}", line);
        line.truncate(line.len() - 2);
        line
    }

    /// Sends a request line and returns the first response line
    pub fn request(&mut self, line: &str) -> String {
        self.send(format!("{}\r\n", line).as_bytes());
        self.read_line()
    }

    pub fn store(
        &mut self,
        verb: &str,
        key: &str,
        value: &[u8],
        flags: u32,
        exptime: i64,
    ) -> String {
        let mut data =
            format!("{} {} {} {} {}\r\n", verb, key, flags, exptime, value.len()).into_bytes();
        data.extend_from_slice(value);
        data.extend_from_slice(b"\r\n");
        self.send(&data);
        self.read_line()
    }

    pub fn set(&mut self, key: &str, value: &str) -> String {
        self.store("set", key, value.as_bytes(), 0, 0)
    }

    /// Returns (key, flags, data) for every VALUE block up to END
    pub fn get_many(&mut self, line: &str) -> Vec<(String, u32, Vec<u8>)> {
        self.send(format!("{}\r\n", line).as_bytes());
        let mut values = Vec::new();
        loop {
            let header = self.read_line();
            if header == "END" {
                return values;
            }
            let fields: Vec<&str> = header.split(' ').collect();
            assert_eq!(fields[0], "VALUE", "unexpected line {:?}", header);
            let len: usize = fields[3].parse().unwrap();
            let mut data = vec![0; len + 2];
            self.reader.read_exact(&mut data).unwrap();
            assert_eq!(&data[len..], b"\r\n");
            data.truncate(len);
            values.push((fields[1].to_string(), fields[2].parse().unwrap(), data));
        }
    }

    pub fn get(&mut self, key: &str) -> Option<String> {
        let mut values = self.get_many(&format!("get {}", key));
        assert!(values.len() <= 1);
        values
            .pop()
            .map(|(_key, _flags, data)| String::from_utf8(data).unwrap())
    }

    /// True when the server closed the connection
    pub fn is_closed(&mut self) -> bool {
        let mut buf = [0u8; 1];
        matches!(self.reader.read(&mut buf), Ok(0))
    }
}

#[allow(dead_code)]
pub fn create_value_with_size(size: usize) -> String {
    "x".repeat(size)
}
