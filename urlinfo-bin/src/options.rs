use crate::verbosity::Verbosity;
use anyhow::{Context, Error, Result, anyhow};
use clap::builder::PossibleValuesParser;
use clap::{Parser, builder::TypedValueParser};
use const_format::{concatcp, formatcp};
use http::{
    HeaderMap,
    header::{HeaderName, HeaderValue},
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::{fs, path::PathBuf, str::FromStr, time::Duration};
use strum::{Display, EnumString, VariantNames};
use urlinfo_lib::{ClientBuilder, DEFAULT_MAX_BODY_SIZE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

pub(crate) const URLINFO_CONFIG_FILE: &str = "urlinfo.toml";

// this exists because clap requires `&str` type values for defaults
// whereas serde expects owned `String` types
// (we can't use e.g. `TIMEOUT` or `timeout()` which gets created for serde)
const TIMEOUT_STR: &str = concatcp!(DEFAULT_TIMEOUT_SECS);
const MAX_BODY_SIZE_STR: &str = concatcp!(DEFAULT_MAX_BODY_SIZE);
// We use a custom help message here because we want to show the default
// value of the config file, but also be able to check if the user has
// provided a custom value. If they didn't, we won't throw an error if
// the file doesn't exist.
const HELP_MSG_CONFIG_FILE: &str = formatcp!(
    "Configuration file to use\n\n[default: {}]",
    URLINFO_CONFIG_FILE,
);

/// The format of the descriptors printed to stdout
#[derive(
    Debug, Deserialize, Default, Clone, Copy, Display, EnumString, VariantNames, PartialEq, Eq,
)]
#[non_exhaustive]
pub(crate) enum OutputFormat {
    /// One line per link, meant for humans.
    #[serde(rename = "plain")]
    #[strum(serialize = "plain", ascii_case_insensitive)]
    #[default]
    Plain,

    /// A single JSON array of `{ "link": ..., "info": ... }` objects.
    ///
    /// Useful for scripting, the `info` object uses the same camel-cased
    /// field names as the library's serialized `UrlInfo`.
    #[serde(rename = "json")]
    #[strum(serialize = "json", ascii_case_insensitive)]
    Json,
}

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            #[allow(clippy::missing_const_for_fn)]
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    timeout: u64 = DEFAULT_TIMEOUT_SECS;
    max_body_size: u64 = DEFAULT_MAX_BODY_SIZE;
    user_agent: String = DEFAULT_USER_AGENT.to_string();
    verbosity: Verbosity = Verbosity::default();
}

// Macro for merging configuration values
macro_rules! fold_in {
    ($cli:ident , $toml:ident ; $ty:ident { $(..$ignore:ident,)* $( $key:ident : $default:expr, )* } ) => {
        if (false) {
            #[allow(dead_code, unused, clippy::diverging_sub_expression)]
            let _check_fold_in_exhaustivity = $ty {
                $($key: unreachable!(), )*
                $($ignore: unreachable!(), )*
            };
        };
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

/// Parse a single header into a [`HeaderName`] and [`HeaderValue`]
///
/// Headers are expected to be in format `Header-Name: Header-Value`.
/// The header name and value are trimmed of whitespace.
///
/// If the header contains multiple colons, the part after the first colon is
/// considered the value.
///
/// # Errors
///
/// This fails if the header does not contain a `:` character or
/// if the header name contains non-ASCII characters.
fn parse_single_header(header: &str) -> Result<(HeaderName, HeaderValue)> {
    let Some((name, value)) = header.split_once(':') else {
        return Err(anyhow!(
            "Invalid header format. Expected colon-separated string in the format 'HeaderName: HeaderValue'"
        ));
    };
    let name = name.trim();
    let name = HeaderName::from_str(name)
        .map_err(|e| anyhow!("Unable to convert header name '{name}': {e}"))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|e| anyhow!("Unable to read value of header with name '{name}': {e}"))?;
    Ok((name, value))
}

/// Parses a single HTTP header into a tuple of (String, String)
///
/// This does NOT merge multiple headers into one.
#[derive(Clone, Debug)]
struct HeaderParser;

impl TypedValueParser for HeaderParser {
    type Value = (String, String);

    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let invalid = |message: String| clap::Error::raw(clap::error::ErrorKind::InvalidValue, message);

        let header_str = value
            .to_str()
            .ok_or_else(|| invalid("Header value contains invalid UTF-8".to_string()))?;
        let (name, value) = parse_single_header(header_str).map_err(|e| invalid(e.to_string()))?;
        let value = value
            .to_str()
            .map_err(|_| invalid("Header value contains invalid UTF-8".to_string()))?;

        Ok((name.to_string(), value.to_string()))
    }
}

/// Extension trait for converting a Vec of header pairs to a `HeaderMap`
pub(crate) trait HeaderMapExt {
    /// Convert a collection of header key-value pairs to a `HeaderMap`
    fn from_header_pairs(headers: &[(String, String)]) -> Result<HeaderMap, Error>;
}

impl HeaderMapExt for HeaderMap {
    fn from_header_pairs(headers: &[(String, String)]) -> Result<HeaderMap, Error> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow!("Invalid header name '{name}': {e}"))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| anyhow!("Invalid header value '{value}': {e}"))?;
            header_map.insert(header_name, header_value);
        }
        Ok(header_map)
    }
}

/// urlinfo describes the web resources behind a list of links.
///
/// For every link it reports whether something answers over HTTP, the
/// declared content type and, for HTML pages, the title and favicon.
#[derive(Parser, Debug)]
#[command(version, about, next_display_order = None)]
pub(crate) struct UrlinfoOptions {
    /// Links to describe
    #[arg(
        name = "links",
        required_unless_present = "input_json",
        long_help = "Links to describe. A missing scheme is filled in with `http://`,
so `example.com` and `http://example.com` are the same link.

NOTE: Use `--` to separate links from options that allow multiple arguments."
    )]
    raw_links: Vec<String>,

    /// Read additional links from a JSON array in the given file or stdin (if path is '-')
    #[arg(
        long,
        value_name = "PATH",
        long_help = "Read additional links from a JSON array in the given file or stdin (if path is '-').

Elements which are not strings are reported as invalid links instead of
aborting the run, e.g. `[\"example.com\", 42, null]` yields three results."
    )]
    input_json: Option<PathBuf>,

    /// Configuration file to use
    #[arg(short, long = "config")]
    #[arg(help = HELP_MSG_CONFIG_FILE)]
    pub(crate) config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub(crate) config: Config,
}

impl UrlinfoOptions {
    /// All candidates in input order: positional links first, then the
    /// elements of `--input-json`.
    pub(crate) fn links(&self) -> Result<Vec<Value>> {
        let mut links: Vec<Value> = self.raw_links.iter().cloned().map(Value::String).collect();
        if let Some(path) = &self.input_json {
            links.extend(read_input_json(path)?);
        }
        Ok(links)
    }
}

/// Read a JSON array of candidates from `path`, or from stdin for `-`
fn read_input_json(path: &Path) -> Result<Vec<Value>> {
    let contents = if path == Path::new("-") {
        io::read_to_string(io::stdin()).context("Cannot read links from stdin")?
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Cannot read links from `{}`", path.display()))?
    };
    serde_json::from_str(&contents)
        .with_context(|| format!("`{}` does not contain a JSON array", path.display()))
}

// Custom deserializer function for the header field
fn deserialize_headers<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = HashMap::<String, String>::deserialize(deserializer)?;
    Ok(map.into_iter().collect())
}

/// The main configuration for urlinfo
#[derive(Parser, Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Verbose program output
    #[clap(flatten)]
    #[serde(default = "verbosity")]
    pub(crate) verbose: Verbosity,

    /// Timeout in seconds for each request, from connect to response finished
    #[arg(short, long, default_value = TIMEOUT_STR)]
    #[serde(default = "timeout")]
    pub(crate) timeout: u64,

    /// Maximum number of bytes downloaded per link
    #[arg(
        long,
        value_name = "BYTES",
        default_value = MAX_BODY_SIZE_STR,
        long_help = "Maximum number of bytes downloaded per link.

Links declaring a larger `Content-Length` are not downloaded at all, bodies
growing past the limit while streaming are dropped. Either way the link is
reported as too large and no title or favicon is extracted."
    )]
    #[serde(default = "max_body_size")]
    pub(crate) max_body_size: u64,

    /// User agent
    #[arg(short, long, default_value = DEFAULT_USER_AGENT)]
    #[serde(default = "user_agent")]
    pub(crate) user_agent: String,

    /// Proceed for server connections considered insecure (invalid TLS)
    #[arg(short, long)]
    #[serde(default)]
    pub(crate) insecure: bool,

    /// Set custom header for requests
    #[arg(
        short = 'H',
        long,
        // Note: We use a `Vec<(String, String)>` for headers, because
        // `clap::ArgAction::Append` collects multiple values and `clap` cannot
        // automatically convert these tuples into a `HashMap<String, String>`.
        action = clap::ArgAction::Append,
        value_parser = HeaderParser,
        value_name = "HEADER:VALUE",
        long_help = "Set custom header for requests

You can specify custom headers in the format 'Name: Value'. For example, 'Accept-Language: de'.
This is the same format that other tools like curl or wget use.
Multiple headers can be specified by using the flag multiple times.
The specified headers are used for ALL requests."
    )]
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_headers")]
    pub(crate) header: Vec<(String, String)>,

    /// Output format of the descriptors
    #[arg(short, long, default_value = "plain", ignore_case = true, value_parser = PossibleValuesParser::new(OutputFormat::VARIANTS).map(|s| s.parse::<OutputFormat>().unwrap()))]
    #[serde(default)]
    pub(crate) format: OutputFormat,
}

impl Config {
    /// Special handling for merging headers
    ///
    /// Headers given on the command line win over headers of the same name
    /// from `other`.
    fn merge_headers(&mut self, other: &[(String, String)]) {
        let self_map = self
            .header
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()));
        let other_map = other
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()));

        let merged_map: HashMap<_, _> = other_map.chain(self_map).collect();

        self.header = merged_map.into_iter().collect();
    }

    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &Path) -> Result<Config> {
        // Read configuration file
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| "Failed to parse configuration file")
    }

    /// Merge the configuration from TOML into the CLI configuration
    pub(crate) fn merge(&mut self, toml: Config) {
        // Special handling for headers before fold_in!
        self.merge_headers(&toml.header);

        // NOTE: if you see an error within this macro call, check to make sure that
        // that the fields provided to fold_in! match all the fields of the Config struct.
        fold_in! {
            // Destination and source configs
            self, toml;

            Config {
                // Keys which are handled outside of fold_in
                ..header,

                // Keys with defaults to assign
                format: OutputFormat::Plain,
                insecure: false,
                max_body_size: DEFAULT_MAX_BODY_SIZE,
                timeout: DEFAULT_TIMEOUT_SECS,
                user_agent: DEFAULT_USER_AGENT,
                verbose: Verbosity::default(),
            }
        }
    }

    /// Build the client builder described by this configuration
    pub(crate) fn client_builder(&self) -> Result<ClientBuilder> {
        let custom_headers = HeaderMap::from_header_pairs(&self.header)?;

        Ok(ClientBuilder::builder()
            .timeout(Duration::from_secs(self.timeout))
            .max_body_size(self.max_body_size)
            .user_agent(self.user_agent.clone())
            .custom_headers(custom_headers)
            .allow_insecure(self.insecure)
            .build())
    }
}
