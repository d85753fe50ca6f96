use crate::error::{Result as ServerErrorResult, ServerError};

use std::path::PathBuf;
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::info;

/// Wire up fern for the bridge: one sink, either an append-mode file or
/// stdout. Lines carry the module target, which pairs with the
/// `[rcon]`/`[ws]`/`[countdown]` prefixes the subsystems put in their
/// messages. Colors apply to stdout only.
pub fn initialize(
    level: mcb_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let sink = match &log_file {
        Some(path) => format!("file {}", path.display()),
        None => String::from("stdout"),
    };

    let dispatch = Dispatch::new().level(level.0);
    let dispatch = match log_file {
        Some(path) => {
            let file = fern::log_file(&path).map_err(|e| ServerError::Logger {
                message: format!("cannot open log file {}: {}", path.display(), e),
            })?;
            dispatch
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} {:<5} [{}] {}",
                        humantime::format_rfc3339_seconds(SystemTime::now()),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file)
        }
        None if colored => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);
            dispatch
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "{} {:<5} [{}] {}",
                        humantime::format_rfc3339_seconds(SystemTime::now()),
                        colors.color(record.level()),
                        record.target(),
                        message
                    ))
                })
                .chain(std::io::stdout())
        }
        // Plain stdout for non-TTY consumers (systemd, docker logs).
        None => dispatch
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} {:<5} [{}] {}",
                    humantime::format_rfc3339_seconds(SystemTime::now()),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(std::io::stdout()),
    };

    dispatch.apply().map_err(|e| ServerError::Logger {
        message: format!("cannot install logger: {e}"),
    })?;

    info!("Logger ready: level={}, output={}", level.0, sink);
    Ok(())
}
