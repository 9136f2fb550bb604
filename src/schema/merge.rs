//! Static + derived column merging.

use super::types::Column;
use crate::config::NamingConvention;
use std::collections::HashSet;

/// Static columns followed by derived columns not already named, or derived
/// columns only under `ApiNative` when there are any.
pub fn merge_columns(static_columns: &[Column], derived: &[Column], convention: NamingConvention) -> Vec<Column> {
    if convention == NamingConvention::ApiNative && !derived.is_empty() {
        return derived.to_vec();
    }
    let seen: HashSet<&str> = static_columns.iter().map(|c| c.name.as_str()).collect();
    let mut columns = static_columns.to_vec();
    columns.extend(derived.iter().filter(|c| !seen.contains(c.name.as_str())).cloned());
    columns
}
