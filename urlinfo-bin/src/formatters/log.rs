use env_logger::{Builder, Env};
use std::io::Write;

use crate::verbosity::Verbosity;

/// Initialize the logging system with the given verbosity level.
///
/// Log lines go to stderr, so they never mix with the descriptors on stdout.
pub(crate) fn init_logging(verbose: &Verbosity) {
    // Set a base level for all modules to `warn`, which is a reasonable default.
    // It will be overridden by RUST_LOG if it's set.
    let env = Env::default().filter_or("RUST_LOG", "warn");

    let mut builder = Builder::from_env(env);
    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if std::env::var("RUST_LOG").is_err() {
        // Adjust the base log level filter based on the verbosity from CLI.
        let level_filter = verbose.log_level_filter();

        // Other crates (hyper, reqwest, ...) never get more verbose than `warn`
        builder.filter_level(level_filter.min(log::LevelFilter::Warn));

        builder
            .filter_module("urlinfo", level_filter)
            .filter_module("urlinfo_lib", level_filter);
    }

    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    builder.init();
}
