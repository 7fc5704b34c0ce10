#![allow(unused_crate_dependencies, clippy::panic)]

pub mod blog;
pub mod entities;

use std::sync::OnceLock;

use subgraph_engine::LogLevel;
use tokio::runtime::Runtime;

#[ctor::ctor]
fn setup_logging() {
    let filter = tracing_subscriber::filter::EnvFilter::builder()
        .parse(std::env::var("RUST_LOG").unwrap_or_else(|_| LogLevel::Debug.filter_directive()))
        .unwrap();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .without_time()
        .try_init();
}

pub fn runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    })
}
