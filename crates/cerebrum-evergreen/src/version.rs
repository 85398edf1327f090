//! Best-effort dotted version comparison

/// Parse the leading dotted-integer prefix of a version string.
///
/// Empty tokens are skipped and parsing stops at the first token that is not
/// an integer, so `"3.12.1rc1"` yields `[3, 12]`.
pub fn version_tuple(raw: &str) -> Vec<u64> {
    let mut parts = Vec::new();
    for token in raw.split('.') {
        if token.is_empty() {
            continue;
        }
        match token.parse::<u64>() {
            Ok(value) => parts.push(value),
            Err(_) => break,
        }
    }
    parts
}

/// True when `candidate` is strictly newer than `baseline`.
pub fn is_newer(candidate: &str, baseline: &str) -> bool {
    version_tuple(candidate) > version_tuple(baseline)
}
