//! `urlinfo` describes the web resources behind a list of links.
//!
//! For every link it reports whether something answers over HTTP, the
//! declared content type, whether the content is too large to download and,
//! for HTML pages, the title and the favicon location.
//!
//! The urlinfo binary is a wrapper around urlinfo-lib, which provides
//! convenience functions for calling urlinfo from the command-line.
//!
//! Describe a few links:
//! ```sh
//! urlinfo https://example.com github.com "not a link"
//! ```
//!
//! Read links from a JSON array and print the results as JSON:
//! ```sh
//! urlinfo --input-json links.json --format json
//! echo '["example.com", 42]' | urlinfo --input-json -
//! ```
//!
//! Give up on slow servers and large pages early:
//! ```sh
//! urlinfo --timeout 2 --max-body-size 1048576 https://example.com
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![warn(
    absolute_paths_not_starting_with_crate,
    rustdoc::invalid_html_tags,
    missing_copy_implementations,
    missing_debug_implementations,
    semicolon_in_expressions_from_macros,
    unreachable_pub,
    unused_extern_crates,
    variant_size_differences,
    clippy::missing_const_for_fn
)]
#![deny(anonymous_parameters, macro_use_extern_crate)]
#![deny(missing_docs)]

use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

use anyhow::{Context, Error, Result, anyhow, bail};
use clap::Parser;
use futures::{StreamExt, TryStreamExt, stream};
use log::{error, info};

use formatters::{get_info_formatter, info::Described, log::init_logging};
use options::{Config, URLINFO_CONFIG_FILE, UrlinfoOptions};

mod formatters;
mod options;
mod verbosity;

/// Number of links resolved at the same time
const MAX_CONCURRENCY: usize = 128;

/// A C-like enum that can be cast to `i32` and used as process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitCode {
    Success = 0,
    // NOTE: exit code 1 is used for any `Result::Err` bubbled up to `main()`
    // using the `?` operator.
    #[allow(unused)]
    UnexpectedFailure = 1,
    NotAWebResource = 2,
    ConfigFile = 3,
}

fn main() -> Result<()> {
    // std::process::exit doesn't guarantee that all destructors will be run,
    // therefore we wrap the main code in another function to ensure that.
    // See: https://doc.rust-lang.org/stable/std/process/fn.exit.html
    let exit_code = run_main()?;
    std::process::exit(exit_code);
}

/// Merge all provided config options into one.
/// This includes a potential config file, command-line- and environment variables
fn load_config() -> Result<UrlinfoOptions> {
    let mut opts = UrlinfoOptions::parse();
    let merged = merge_config_file(&mut opts);

    // Logging starts once the config file had its say on verbosity. If the
    // file is broken, the command-line verbosity reports that.
    init_logging(&opts.config.verbose);

    merged.map(|()| opts)
}

/// Load a potentially existing config file and merge it into the config from
/// the CLI
fn merge_config_file(opts: &mut UrlinfoOptions) -> Result<()> {
    if let Some(config_file) = &opts.config_file {
        match Config::load_from_file(config_file) {
            Ok(c) => opts.config.merge(c),
            Err(e) => {
                bail!(
                    "Cannot load configuration file `{}`: {e:?}",
                    config_file.display()
                );
            }
        }
    } else {
        // If no config file was explicitly provided, we try to load the default
        // config file from the current directory if the file exists. This will
        // raise an error if the file is invalid, just like the explicit provided
        // config file.
        let default_config = PathBuf::from(URLINFO_CONFIG_FILE);
        if default_config.is_file() {
            match Config::load_from_file(&default_config) {
                Ok(c) => opts.config.merge(c),
                Err(e) => {
                    bail!(
                        "Cannot load default configuration file `{}`: {e:?}",
                        default_config.display()
                    );
                }
            }
        }
    }
    Ok(())
}

/// Set up runtime and call urlinfo entrypoint
fn run_main() -> Result<i32> {
    use std::process::exit;

    let opts = match load_config() {
        Ok(opts) => opts,
        Err(e) => {
            error!("Error while loading config: {e}");
            exit(ExitCode::ConfigFile as i32);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;

    match runtime.block_on(run(&opts)) {
        Err(e) if Some(ErrorKind::BrokenPipe) == underlying_io_error_kind(&e) => {
            exit(ExitCode::Success as i32);
        }
        res => res,
    }
}

/// Check if the given error can be traced back to an `io::ErrorKind`
/// This is helpful for troubleshooting the root cause of an error.
/// Code is taken from the anyhow documentation.
fn underlying_io_error_kind(error: &Error) -> Option<io::ErrorKind> {
    for cause in error.chain() {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
    }
    None
}

/// Attach the details of a library error, if it has any
fn library_error(error: urlinfo_lib::ErrorKind) -> Error {
    match error.details() {
        Some(details) => anyhow!("{error} ({details})"),
        None => Error::new(error),
    }
}

/// Run urlinfo on the given links
async fn run(opts: &UrlinfoOptions) -> Result<i32> {
    let links = opts.links()?;
    let client = opts
        .config
        .client_builder()?
        .client()
        .map_err(library_error)
        .context("Failed to create request client")?;

    info!("Resolving {} link(s)", links.len());

    // Lookups run concurrently, results keep the input order
    let infos: Vec<_> = stream::iter(links.iter().map(|link| client.resolve_value(link)))
        .buffered(MAX_CONCURRENCY)
        .map_err(library_error)
        .try_collect()
        .await?;

    let described: Vec<_> = links
        .iter()
        .zip(&infos)
        .map(|(link, info)| Described { link, info })
        .collect();

    let formatter = get_info_formatter(opts.config.format);
    let output = formatter.format(&described)?;
    if !output.is_empty() {
        writeln!(io::stdout(), "{output}")?;
    }

    let exit_code = if infos.iter().all(|info| info.is_web_resource) {
        ExitCode::Success
    } else {
        ExitCode::NotAWebResource
    };
    Ok(exit_code as i32)
}
