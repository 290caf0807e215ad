pub use log::LevelFilter::*;

/// Installs the process-wide logger. Fails if a logger is already set.
pub fn setup_logging(verbosity: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .level(verbosity)
        .format(|out, message, record| out.finish(format_args!("({}) {}: {}", record.level(), record.target(), message)))
        .chain(std::io::stderr())
        .apply()
}
