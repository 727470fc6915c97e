//! Version ordering.
//!
//! Versions are compared by semantic-version precedence. Vendors publish
//! two-component and four-component numbers too, so parsing is lenient. If
//! any element still cannot be parsed, the whole list is ordered
//! lexicographically instead so the order stays total.

use std::cmp::Ordering;

use semver::Version;
use tracing::debug;

/// How a list ended up ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Semantic,
    Lexicographic,
}

/// Parse a version leniently: leading `v` removed, missing minor/patch
/// components filled with zero, extra numeric components folded into build
/// metadata.
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let raw = raw.trim().trim_start_matches('v');
    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }

    let (core, suffix) = match raw.find(['-', '+']) {
        Some(idx) => raw.split_at(idx),
        None => (raw, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.iter().any(|p| p.parse::<u64>().is_err()) {
        return None;
    }

    let normalized = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], suffix),
        2 => format!("{}.{}.0{}", parts[0], parts[1], suffix),
        3 => return None,
        _ => format!(
            "{}.{}.{}+{}",
            parts[0],
            parts[1],
            parts[2],
            parts[3..].join(".")
        ),
    };
    Version::parse(&normalized).ok()
}

/// Sort newest first.
pub fn sort_descending(versions: &mut [String]) -> SortOrder {
    let parsed: Option<Vec<Version>> = versions.iter().map(|v| parse_lenient(v)).collect();

    match parsed {
        Some(parsed) => {
            let mut pairs: Vec<(Version, String)> =
                parsed.into_iter().zip(versions.iter().cloned()).collect();
            pairs.sort_by(|a, b| compare(&b.0, &a.0).then_with(|| b.1.cmp(&a.1)));
            for (slot, (_, raw)) in versions.iter_mut().zip(pairs) {
                *slot = raw;
            }
            SortOrder::Semantic
        }
        None => {
            debug!("Unparseable version in list; ordering lexicographically");
            versions.sort_by(|a, b| b.cmp(a));
            SortOrder::Lexicographic
        }
    }
}

/// Precedence including build metadata, so four-component versions order
/// by their last component too.
fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp_precedence(b).then_with(|| a.build.cmp(&b.build))
}
