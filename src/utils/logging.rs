use serde::Serialize;

/// Longest upstream body excerpt that ends up in a log line.
pub const BODY_PREVIEW_CHARS: usize = 300;

/// Run `log_action` with `value` as pretty JSON, only when debug logging is on.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    log_action(&pretty);
}

/// Lossy UTF-8 excerpt of a raw upstream body.
pub(crate) fn body_preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}
