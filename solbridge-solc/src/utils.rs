//! Utility functions

use once_cell::sync::Lazy;
use regex::Regex;

/// A regex that matches a complete solidity version pragma up to (not including) the closing
/// semicolon: `pragma solidity ^0.5.2;` => `pragma solidity ^0.5.2`
pub static RE_SOL_PRAGMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pragma\s+solidity[^;]*").unwrap());

/// Converts a path into the form solc expects, regardless of the OS it was produced on.
///
/// Backslashes become forward slashes and a leading drive letter is turned into a root
/// directory: `C:\a\b.sol` => `/C/a/b.sol`. Anything else is returned unchanged.
///
/// ```
/// use solbridge_solc::utils::normalize_path;
/// assert_eq!(normalize_path(r"C:\a\b.sol"), "/C/a/b.sol");
/// assert_eq!(normalize_path("/already/posix.sol"), "/already/posix.sol");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        normalized.remove(1);
        normalized.insert(0, '/');
    }
    normalized
}

/// Returns the first complete version pragma statement found in the given text, without the
/// trailing semicolon.
pub fn find_pragma_statement(text: &str) -> Option<&str> {
    RE_SOL_PRAGMA.find(text).map(|m| m.as_str())
}

/// Strips a single leading `0x` from a hex string, if present
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}
