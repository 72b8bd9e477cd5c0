//! Small helpers shared by the logging layers: ANSI scrubbing, cache paths,
//! and UTC timestamps.
use std::path::PathBuf;

/// Remove ANSI escape sequences so log-file lines stay plain text.
///
/// CSI sequences (`ESC [` up to a final byte in `@`..`~`) are dropped whole;
/// a bare escape followed by one character is dropped as well.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('\x1b') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        rest = if let Some(csi) = tail.strip_prefix('[') {
            // The final byte of a CSI sequence is always ASCII.
            csi.find(|c| ('@'..='~').contains(&c))
                .map_or("", |end| &csi[end + 1..])
        } else {
            tail.char_indices().nth(1).map_or("", |(i, _)| &tail[i..])
        };
    }
    out.push_str(rest);
    out
}

/// Per-command install log path: `$XDG_CACHE_HOME/mms-setup/<command>.log`,
/// falling back to `~/.cache/mms-setup/`.
///
/// Only composes the path; the file layer creates the directory when it
/// opens the log.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    let base = std::env::var_os("XDG_CACHE_HOME").map_or_else(
        || {
            std::env::var_os("HOME")
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    base.join("mms-setup").join(format!("{command}.log"))
}

/// Current UTC date and time, `YYYY-MM-DD HH:MM:SS`.
pub(super) fn utc_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current UTC time of day, `HH:MM:SS`.
pub(super) fn utc_clock() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
