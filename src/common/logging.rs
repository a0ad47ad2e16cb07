use anyhow::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use time::macros::format_description;

/// Dependencies whose debug output drowns the per-reference log
const QUIET_MODULES: &[&str] = &["sled", "reqwest", "hyper", "hyper_util", "polars"];

/// Parse a `--log-level` value; unknown values fall back to INFO
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        "OFF" => LevelFilter::Off,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO.", level);
            LevelFilter::Info
        }
    }
}

/// Install the process logger. Below TRACE, the store and HTTP crates are capped at WARN.
pub fn setup_logging(log_level: &str) -> Result<()> {
    let level = parse_log_level(log_level);
    let mut logger = SimpleLogger::new()
        .with_level(level)
        .with_timestamp_format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"));
    if level < LevelFilter::Trace {
        for module in QUIET_MODULES {
            logger = logger.with_module_level(module, level.min(LevelFilter::Warn));
        }
    }
    logger.init()?;
    Ok(())
}
