mod attributed;
mod entities;
mod handlers;
mod keyless;
mod plain;

pub use entities::*;

use crate::{attributed::attributed, handlers::handlers, keyless::keyless, plain::plain};
use log::LevelFilter;
use std::env;
use tabula::Connection;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests<C: Connection>(mut connection: C) {
    attributed(&mut connection).await;
    plain(&mut connection).await;
    handlers(&mut connection).await;
    keyless(&mut connection).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
