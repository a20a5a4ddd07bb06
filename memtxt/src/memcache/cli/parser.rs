use crate::cache::eviction_policy::EvictionPolicy;
use crate::memory_store::StoreEngine;
use crate::version;
use byte_unit::{Byte, Unit};
use clap::{Parser, ValueEnum};
use std::{
    fmt::Debug,
    net::{IpAddr, Ipv4Addr},
    ops::RangeInclusive,
};

const DEFAULT_PORT: u16 = 11211;
const DEFAULT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const CONNECTION_LIMIT: u32 = 1024;
const LISTEN_BACKLOG: u32 = 1024;
const MEMORY_LIMIT: &str = "64";
const MAX_ITEM_SIZE: &str = "1m";
const FANOUT_LIMIT: usize = 64;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum RuntimeType {
    /// every thread has its own single threaded runtime
    CurrentThread,
    /// one work stealing runtime shared by all threads
    MultiThread,
}

impl RuntimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeType::CurrentThread => "Work handled withing current thread runtime",
            RuntimeType::MultiThread => "Work stealing threadpool runtime",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version = version::MEMTXT_VERSION, about, long_about = None)]
/// memcached text protocol server implementation in Rust
pub struct MemtxtdConfig {
    #[arg(short, long, value_name = "PORT", value_parser = port_in_range, default_value_t = DEFAULT_PORT)]
    /// TCP port to listen on
    pub port: u16,

    #[arg(short = 'l', long = "listen", value_name = "ADDRESS", default_value_t = DEFAULT_ADDRESS)]
    /// interface to listen on
    pub listen_address: IpAddr,

    #[arg(short, long, value_name = "CONNECTION-LIMIT", default_value_t = CONNECTION_LIMIT)]
    /// max simultaneous connections
    pub connection_limit: u32,

    #[arg(short = 'b', long = "listen-backlog", value_name = "BACKLOG", default_value_t = LISTEN_BACKLOG)]
    /// set the backlog queue limit
    pub backlog_limit: u32,

    #[arg(short, action = clap::ArgAction::Count)]
    /// sets the level of verbosity
    pub verbose: u8,

    #[arg(short, long, value_name = "MEGABYTES", value_parser = parse_memory_mb, default_value = MEMORY_LIMIT)]
    /// item memory in megabytes
    pub memory_limit: u64,

    #[arg(short = 'I', long = "max-item-size", value_name = "SIZE", value_parser = parse_item_size, default_value = MAX_ITEM_SIZE)]
    /// adjusts max item size (min: 1k, max: 1000MiB)
    pub item_size_limit: u64,

    #[arg(short, long, value_name = "THREADS", default_value_t = num_cpus::get())]
    /// number of threads to use
    pub threads: usize,

    #[arg(short, long, value_enum, default_value_t = RuntimeType::CurrentThread)]
    /// runtime type to use
    pub runtime_type: RuntimeType,

    #[arg(short, long, value_enum, default_value_t = StoreEngine::DashMap)]
    /// store engine used to keep items
    pub store_engine: StoreEngine,

    #[arg(short, long, value_enum, default_value_t = EvictionPolicy::None)]
    /// eviction policy, only used by the moka store engine
    pub eviction_policy: EvictionPolicy,

    #[arg(long, value_name = "SECONDS", default_value_t = 0)]
    /// close connections idle for this many seconds, 0 disables
    pub idle_timeout: u64,

    #[arg(long, value_name = "TASKS", value_parser = parse_fanout_limit, default_value_t = FANOUT_LIMIT)]
    /// max concurrent store tasks of a single multi key request
    pub fanout_limit: usize,
}

const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a port number"))?;
    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

fn parse_memory_mb(s: &str) -> Result<u64, String> {
    let megabytes: u64 = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a number of megabytes"))?;
    match Byte::from_u64_with_unit(megabytes, Unit::MiB) {
        Some(bytes) => Ok(bytes.as_u64()),
        None => Err(format!("`{s}` megabytes is too large")),
    }
}

fn item_size_range() -> RangeInclusive<u64> {
    let min = Byte::from_u64_with_unit(1, Unit::KB).map_or(1000, |byte| byte.as_u64());
    let max = Byte::from_u64_with_unit(1000, Unit::MiB).map_or(1000 * 1024 * 1024, |byte| {
        byte.as_u64()
    });
    min..=max
}

fn parse_item_size(s: &str) -> Result<u64, String> {
    let size = match Byte::parse_str(s, true) {
        Ok(bytes) => bytes.as_u64(),
        Err(byte_error) => return Err(format!("{}", byte_error)),
    };
    let range = item_size_range();
    if size < *range.start() {
        return Err(format!(
            "Max item size cannot be lower than: {}",
            Byte::from_u64(*range.start()).get_appropriate_unit(byte_unit::UnitType::Decimal)
        ));
    }
    if size > *range.end() {
        return Err(format!(
            "Max item size cannot be greater than: {}",
            Byte::from_u64(*range.end()).get_appropriate_unit(byte_unit::UnitType::Binary)
        ));
    }
    Ok(size)
}

fn parse_fanout_limit(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err(String::from("fanout limit must be at least 1")),
        Ok(limit) => Ok(limit),
        Err(_) => Err(format!("`{s}` isn't a valid fanout limit")),
    }
}

impl MemtxtdConfig {
    fn from_args(args: Vec<String>) -> Result<MemtxtdConfig, String> {
        let config = MemtxtdConfig::parse_from(args.iter());
        if config.threads == 0 {
            return Err(String::from("Number of threads must be at least 1"));
        }
        Ok(config)
    }
}

pub fn parse(args: Vec<String>) -> Result<MemtxtdConfig, String> {
    MemtxtdConfig::from_args(args)
}
