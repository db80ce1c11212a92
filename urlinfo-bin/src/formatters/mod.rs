pub(crate) mod info;
pub(crate) mod log;

use self::info::InfoFormatter;
use crate::options::OutputFormat;

/// Create a formatter for the descriptors based on the given format option
pub(crate) fn get_info_formatter(format: OutputFormat) -> Box<dyn InfoFormatter> {
    match format {
        OutputFormat::Plain => Box::new(info::Plain::new()),
        OutputFormat::Json => Box::new(info::Json::new()),
    }
}
