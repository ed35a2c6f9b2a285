use std::cmp::Ordering;

/// True when `latest` is a strictly newer release than `current`.
///
/// Dotted numeric versions are compared component by component, with missing
/// components treated as zero. Anything else falls back to string ordering.
pub fn is_newer(latest: &str, current: &str) -> bool {
    let latest = latest.trim().trim_start_matches('v');
    let current = current.trim().trim_start_matches('v');
    if latest.is_empty() {
        return false;
    }
    match (numeric_parts(latest), numeric_parts(current)) {
        (Some(l), Some(c)) => compare_parts(&l, &c) == Ordering::Greater,
        _ => latest > current,
    }
}

fn numeric_parts(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

fn compare_parts(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    for idx in 0..len {
        let l = left.get(idx).copied().unwrap_or(0);
        let r = right.get(idx).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numeric_components_compare_as_numbers() {
        assert!(is_newer("0.10.0", "0.9.3"));
        assert!(!is_newer("0.9.3", "0.10.0"));
        assert!(!is_newer("1.0", "1.0.0"));
        assert!(is_newer("1.0.1", "1.0"));
    }

    #[test]
    fn empty_latest_is_never_newer() {
        assert!(!is_newer("", "0"));
    }

    #[test]
    fn non_numeric_versions_use_string_order() {
        assert!(is_newer("1.0.0-rc2", "1.0.0-rc1"));
    }

    proptest! {
        #[test]
        fn version_is_never_newer_than_itself(parts in prop::collection::vec(0u64..50, 1..4)) {
            let version = parts.iter().map(ToString::to_string).collect::<Vec<_>>().join(".");
            prop_assert!(!is_newer(&version, &version));
        }

        #[test]
        fn bumping_patch_is_newer(major in 0u64..20, minor in 0u64..20, patch in 0u64..20) {
            let current = format!("{major}.{minor}.{patch}");
            let latest = format!("{major}.{minor}.{}", patch + 1);
            prop_assert!(is_newer(&latest, &current));
            prop_assert!(!is_newer(&current, &latest));
        }
    }
}
