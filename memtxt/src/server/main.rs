use crate::memcache;
use crate::memcache::cli::parser::MemtxtdConfig;
use crate::memcache_server;
use crate::memcache_server::server_context::ServerContext;
use log::{error, info};
use std::process;
use tracing_log::LogTracer;
extern crate clap;

#[cfg(feature = "jemallocator")]
use jemallocator::Jemalloc;

#[cfg(feature = "jemallocator")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn get_log_level(verbose: u8) -> tracing::Level {
    // Vary the output based on how many times the user used the "verbose" flag
    // (i.e. 'memtxtd -v -v -v' or 'memtxtd -vvv' vs 'memtxtd -v'
    match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn log_config(cli_config: &MemtxtdConfig) {
    info!("Listen address: {}", cli_config.listen_address);
    info!("Listen port: {}", cli_config.port);
    info!("Connection limit: {}", cli_config.connection_limit);
    info!("Listen backlog: {}", cli_config.backlog_limit);
    info!("Number of threads: {}", cli_config.threads);
    info!("Store engine: {}", cli_config.store_engine.as_str());
    info!("Eviction policy: {}", cli_config.eviction_policy.as_str());
    info!("Runtime type: {}", cli_config.runtime_type.as_str());
    info!("Idle timeout: {}s", cli_config.idle_timeout);
    info!("Multi-get fan-out limit: {}", cli_config.fanout_limit);
    info!(
        "Max item size: {}",
        byte_unit::Byte::from_u64(cli_config.item_size_limit)
            .get_appropriate_unit(byte_unit::UnitType::Decimal)
    );
    info!(
        "Memory limit: {}",
        byte_unit::Byte::from_u64(cli_config.memory_limit)
            .get_appropriate_unit(byte_unit::UnitType::Binary)
    );
}

pub fn run(args: Vec<String>) {
    if let Err(err) = LogTracer::init() {
        eprintln!("Cannot initialize logger: {}", err);
        process::exit(1);
    }

    let cli_config = match memcache::cli::parser::parse(args) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", err);
            process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(get_log_level(cli_config.verbose))
        .init();

    log_config(&cli_config);

    let store_config = memcache::builder::MemcacheStoreConfig::new(
        cli_config.store_engine,
        cli_config.memory_limit,
        cli_config.eviction_policy,
    );
    let ctx = ServerContext::get_default_server_context(store_config);
    let parent_runtime =
        match memcache_server::runtime_builder::create_memtxt_server(cli_config, &ctx) {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("Cannot start server: {}", err);
                process::exit(1);
            }
        };

    let system_timer = ctx.system_timer();
    let cancellation_token = ctx.cancellation_token();
    parent_runtime.block_on(async move {
        let timer_handle = tokio::spawn(async move { system_timer.run().await });
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(err) => error!("Cannot listen for shutdown signal: {}", err),
        }
        cancellation_token.cancel();
        if let Err(err) = timer_handle.await {
            error!("System timer failed: {}", err);
        }
    });
}
