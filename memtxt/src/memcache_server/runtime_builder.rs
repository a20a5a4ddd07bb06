extern crate core_affinity;
use crate::memcache::cli::parser::{MemtxtdConfig, RuntimeType};
use crate::memcache_server;
use crate::memcache_server::server_context::ServerContext;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Builder;

fn get_worker_thread_name() -> String {
    static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
    let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
    format!("memtxtd-wrk-{}", id)
}

fn create_multi_thread_runtime(worker_threads: usize) -> io::Result<tokio::runtime::Runtime> {
    Builder::new_multi_thread()
        .thread_name_fn(get_worker_thread_name)
        .worker_threads(worker_threads)
        .enable_all()
        .build()
}

fn create_current_thread_runtime() -> io::Result<tokio::runtime::Runtime> {
    Builder::new_current_thread()
        .thread_name_fn(get_worker_thread_name)
        .enable_all()
        .build()
}

fn get_server_config(config: &MemtxtdConfig) -> memcache_server::memc_tcp::MemcacheServerConfig {
    memcache_server::memc_tcp::MemcacheServerConfig::new(
        config.idle_timeout,
        config.connection_limit,
        config.item_size_limit,
        config.backlog_limit,
        config.fanout_limit,
    )
}

fn create_tcp_server(
    config: &MemtxtdConfig,
    ctx: &ServerContext,
) -> memcache_server::memc_tcp::MemcacheTcpServer {
    memcache_server::memc_tcp::MemcacheTcpServer::new(
        get_server_config(config),
        ctx.store(),
        ctx.system_timer(),
        ctx.cancellation_token(),
    )
}

fn create_current_thread_server(
    config: MemtxtdConfig,
    ctx: &ServerContext,
) -> io::Result<tokio::runtime::Runtime> {
    let addr = SocketAddr::new(config.listen_address, config.port);
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();

    let task_runner = ctx.pending_tasks_runner();
    std::thread::spawn(move || match create_current_thread_runtime() {
        Ok(child_runtime) => child_runtime.block_on(task_runner.run()),
        Err(err) => error!("Cannot create pending tasks runtime: {}", err),
    });

    for i in 0..config.threads {
        let mut tcp_server = create_tcp_server(&config, ctx);
        let core_id = if core_ids.is_empty() {
            None
        } else {
            Some(core_ids[i % core_ids.len()])
        };
        std::thread::spawn(move || {
            debug!("Creating runtime {}", i);
            match core_id {
                Some(core_id) if core_affinity::set_for_current(core_id) => {
                    debug!(
                        "Thread pinned {:?} to core {:?}",
                        std::thread::current().id(),
                        core_id.id
                    );
                }
                Some(core_id) => warn!("Cannot pin thread to core {}", core_id.id),
                None => warn!("Core ids unavailable, thread {} not pinned", i),
            }
            let child_runtime = match create_current_thread_runtime() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("Cannot create runtime {}: {}", i, err);
                    return;
                }
            };
            if let Err(err) = child_runtime.block_on(tcp_server.run(addr)) {
                error!("Server runtime {} failed: {}", i, err);
            }
        });
    }
    create_current_thread_runtime()
}

fn create_threadpool_server(
    config: MemtxtdConfig,
    ctx: &ServerContext,
) -> io::Result<tokio::runtime::Runtime> {
    let addr = SocketAddr::new(config.listen_address, config.port);
    let runtime = create_multi_thread_runtime(config.threads)?;
    let mut tcp_server = create_tcp_server(&config, ctx);
    let task_runner = ctx.pending_tasks_runner();
    runtime.spawn(async move { task_runner.run().await });
    runtime.spawn(async move {
        if let Err(err) = tcp_server.run(addr).await {
            error!("Server failed: {}", err);
        }
    });
    Ok(runtime)
}

/// Starts listeners for `config` and returns the runtime the caller
/// should block on
pub fn create_memtxt_server(
    config: MemtxtdConfig,
    ctx: &ServerContext,
) -> io::Result<tokio::runtime::Runtime> {
    match config.runtime_type {
        RuntimeType::CurrentThread => create_current_thread_server(config, ctx),
        RuntimeType::MultiThread => create_threadpool_server(config, ctx),
    }
}
