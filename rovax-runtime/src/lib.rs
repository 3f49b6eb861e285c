// Copyright (C) 2022 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

#[macro_use]
extern crate log;

mod config;

pub mod device;
pub mod driver;
pub mod kernel;
pub mod robot;
pub mod runtime;

pub use self::config::*;
pub use self::runtime::RuntimeContext;

/// Runtime constants.
pub mod consts {
    /// Runtime version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Fuser and program scheduling interval.
    pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(10);

    /// Settle time after every mission action.
    pub const ACTION_SETTLE: std::time::Duration = std::time::Duration::from_millis(200);
}

/// Start the daemon and run a mission to completion.
///
/// This is the entry point for the daemon process. It constructs the
/// asynchronous runtime, brings the device set online and executes the
/// configured mission plan. The call returns when the plan ran to
/// completion or the daemon was shut down.
pub fn start_daemon(config: &Config) -> runtime::Result {
    use runtime::{CsvTracer, NullTracer};

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime_workers)
        .enable_all()
        .build()
        .map_err(runtime::Error::Io)?;

    if config.enable_trace {
        runtime.block_on(runtime::builder::launch::<CsvTracer>(config))
    } else {
        runtime.block_on(runtime::builder::launch::<NullTracer>(config))
    }
}
