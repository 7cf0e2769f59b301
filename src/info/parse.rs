//! Parsing of raw info responses.

use crate::error::{Result, SafeStopError};
use std::collections::{BTreeSet, HashMap};

/// Parse an info response into a key/value map.
///
/// Items are separated by `del`, keys from values by the first `sep`.
/// Empty items are skipped; an item without `sep` is an error.
pub fn parse_info_map(s: &str, del: char, sep: char) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for item in s.split(del) {
        if item.is_empty() {
            continue;
        }
        let (key, value) = item
            .split_once(sep)
            .ok_or_else(|| SafeStopError::InfoParse(format!("error parsing info item {}", item)))?;
        map.insert(key.to_string(), value.to_string());
    }

    Ok(map)
}

/// Parse a roster value such as `BB9@1,BB8@1` into node ids.
///
/// Rack suffixes are dropped and the literal `null` is an empty roster.
pub fn parse_roster(value: &str) -> BTreeSet<String> {
    let value = value.trim();
    if value.is_empty() || value == "null" {
        return BTreeSet::new();
    }

    value
        .split(',')
        .map(|entry| entry.split('@').next().unwrap_or(entry).trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
