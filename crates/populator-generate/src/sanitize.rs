use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest name kept when sanitizing, leaving room for the base path.
pub const WINDOWS_SAFE_NAME_LENGTH: usize = 200;

/// Longest file name on common non-Windows filesystems.
pub const MAX_NAME_LENGTH: usize = 255;

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// When Windows-safe name rewriting applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizeMode {
    /// Only when running on Windows.
    #[default]
    Auto,
    Always,
    Never,
}

impl SanitizeMode {
    pub fn is_active(self) -> bool {
        match self {
            SanitizeMode::Auto => cfg!(windows),
            SanitizeMode::Always => true,
            SanitizeMode::Never => false,
        }
    }
}

fn invalid_chars() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"[<>:"/\\|?*&^%]"#).ok())
        .as_ref()
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

fn clean(raw: &str) -> String {
    let replaced = match invalid_chars() {
        Some(pattern) => pattern.replace_all(raw, "_").into_owned(),
        None => raw.to_string(),
    };
    replaced.trim_matches(|c| c == ' ' || c == '.').to_string()
}

pub(crate) fn truncate_chars(value: &mut String, max: usize) {
    if let Some((index, _)) = value.char_indices().nth(max) {
        value.truncate(index);
    }
}

/// Make a file name safe for Windows when `mode` is active.
pub fn sanitize_file_name(file_name: &str, mode: SanitizeMode) -> String {
    if !mode.is_active() {
        return file_name.to_string();
    }

    let (base, ext) = match file_name.rsplit_once('.') {
        Some((base, ext)) => (base, format!(".{ext}")),
        None => (file_name, String::new()),
    };

    let mut base = clean(base);
    if is_reserved(&base) {
        base.push_str("_file");
    }
    truncate_chars(&mut base, WINDOWS_SAFE_NAME_LENGTH.saturating_sub(ext.len()));

    base + &ext
}

/// Make a directory name safe for Windows when `mode` is active.
pub fn sanitize_dir_name(dir_name: &str, mode: SanitizeMode) -> String {
    if !mode.is_active() {
        return dir_name.to_string();
    }

    let mut name = clean(dir_name);
    if is_reserved(&name) {
        name.push_str("_dir");
    }
    truncate_chars(&mut name, WINDOWS_SAFE_NAME_LENGTH);
    name
}

/// Longest file name produced under `mode`, counted in characters.
pub fn name_length_limit(mode: SanitizeMode) -> usize {
    if mode.is_active() {
        WINDOWS_SAFE_NAME_LENGTH
    } else {
        MAX_NAME_LENGTH
    }
}

/// Longest file name the current platform accepts for generated files.
pub fn max_file_name_length() -> usize {
    name_length_limit(SanitizeMode::Auto)
}
