//! String-level path resolution for manifest entries.
//!
//! Job identity is the resolved *string*, so these helpers never touch the
//! filesystem and never canonicalize. Both `/` and `\` count as separators so
//! manifests written on either platform resolve the same way everywhere.

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// True for paths starting with a separator or a drive-letter prefix (`C:`).
pub fn is_absolute(path: &str) -> bool {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(first), _) if is_separator(first) => true,
        (Some(first), Some(':')) => first.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Join `leaf` onto `base` with exactly one separator.
pub fn join(base: &str, leaf: &str) -> String {
    if base.is_empty() {
        return leaf.to_string();
    }
    if leaf.is_empty() {
        return base.to_string();
    }
    if base.ends_with(is_separator) {
        format!("{base}{leaf}")
    } else {
        format!("{base}/{leaf}")
    }
}

/// `leaf` if it is absolute, otherwise `leaf` joined onto `base`.
pub fn resolve(base: &str, leaf: &str) -> String {
    if is_absolute(leaf) {
        leaf.to_string()
    } else {
        join(base, leaf)
    }
}

/// Everything before the last separator, or `"."` when there is none.
pub fn directory_of(path: &str) -> String {
    match path.rfind(is_separator) {
        Some(idx) => path[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Last path segment with everything from its first `.` removed.
///
/// `"/data/netlib/afiro.mps.gz"` becomes `"afiro"`. Only used for the
/// human-readable `instance` column.
pub fn instance_name(path: &str) -> String {
    let base = match path.rfind(is_separator) {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    match base.find('.') {
        Some(dot) => base[..dot].to_string(),
        None => base.to_string(),
    }
}
