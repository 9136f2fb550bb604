//! Case conversion between local column names (lower snake_case) and Salesforce field names (UpperCamelCase).
//!
//! Custom fields (suffix `__c`) are opaque: they are never split into words, so a
//! column name carrying the suffix maps back to the remote field unchanged.

/// Suffix marking an organization-defined (custom) field or object.
pub const CUSTOM_SUFFIX: &str = "__c";

pub fn is_custom(name: &str) -> bool {
    name.ends_with(CUSTOM_SUFFIX)
}

/// Local column name -> Salesforce field name.
/// e.g. "account_id" -> "AccountId", "my_field__c" -> "my_field__c"
pub fn to_remote_name(local: &str) -> String {
    if is_custom(local) {
        return local.to_string();
    }
    to_upper_camel_case(local)
}

/// Split on '_' and capitalize the first letter of each segment; the rest of a segment is kept.
/// e.g. "created_by_id" -> "CreatedById", "Name" -> "Name"
pub fn to_upper_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a single identifier from UpperCamelCase to snake_case.
/// Acronym runs stay one word and digit runs are words of their own:
/// "BillingCity" -> "billing_city", "SLAExpiration" -> "sla_expiration", "Address2Street" -> "address_2_street".
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();
        let starts_word = match prev {
            None | Some('_') => false,
            Some(p) if c.is_ascii_digit() => p.is_alphabetic(),
            Some(p) if p.is_ascii_digit() => c.is_alphabetic(),
            Some(p) if c.is_uppercase() && p.is_lowercase() => true,
            Some(p) if c.is_uppercase() && p.is_uppercase() => next.map(|n| n.is_lowercase()).unwrap_or(false),
            _ => false,
        };
        if starts_word {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Local column name for a Salesforce field under the snake_case convention.
/// Custom fields are lowercased verbatim; everything else is word-split.
pub fn to_local_name(remote: &str) -> String {
    if is_custom(remote) {
        remote.to_lowercase()
    } else {
        to_snake_case(remote)
    }
}
