// Logging bridge: routes binding diagnostics to an embedder-installed sink.

use std::sync::OnceLock;

/// Log level constants for the `dl_log!` macro.
pub const LOG_DISPLAY: u8 = 0;
pub const LOG_WARNING: u8 = 1;
pub const LOG_ERROR: u8 = 2;

/// Receives `(level, message)`.
pub type LogSink = fn(u8, &str);

static SINK: OnceLock<LogSink> = OnceLock::new();

/// Install the process-wide log sink. Only the first call wins; returns
/// whether this call installed it. Until a sink is installed, logging is a no-op.
pub fn set_log_sink(sink: LogSink) -> bool {
    SINK.set(sink).is_ok()
}

/// A sink printing `[wasmtime-dl] <level>: <message>` to stderr.
pub fn stderr_sink(level: u8, msg: &str) {
    let tag = match level {
        LOG_DISPLAY => "info",
        LOG_WARNING => "warning",
        _ => "error",
    };
    eprintln!("[wasmtime-dl] {tag}: {msg}");
}

#[doc(hidden)]
pub fn enabled() -> bool {
    SINK.get().is_some()
}

#[doc(hidden)]
pub fn log(level: u8, msg: &str) {
    if let Some(sink) = SINK.get() {
        sink(level, msg);
    }
}

/// Log a message through the installed sink.
///
/// ```ignore
/// dl_log!(LOG_DISPLAY, "bound {}::{}", module, name);
/// dl_log!(LOG_ERROR, "fatal: {err}");
/// ```
#[macro_export]
macro_rules! dl_log {
    ($level:expr, $($arg:tt)*) => {{
        if $crate::logging::enabled() {
            $crate::logging::log($level, &format!($($arg)*));
        }
    }};
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static CAPTURED: Mutex<Vec<(u8, String)>> = Mutex::new(Vec::new());

    fn capture(level: u8, msg: &str) {
        CAPTURED.lock().unwrap().push((level, msg.to_string()));
    }

    #[test]
    fn sink_receives_formatted_messages() {
        // Other tests in this binary may log concurrently, so only look for our own line.
        set_log_sink(capture);
        assert!(enabled());
        crate::dl_log!(LOG_WARNING, "slot {} of {}", 2, "env::abs");
        let captured = CAPTURED.lock().unwrap();
        assert!(captured.contains(&(LOG_WARNING, "slot 2 of env::abs".to_string())));
    }
}
