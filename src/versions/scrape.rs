//! Version extraction from release-notes pages.

use std::sync::LazyLock;

use regex::Regex;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h[1-3][^>]*>(.*?)</h[1-3]\s*>").unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+\.\d+\.\d+)\b").unwrap());

/// Versions mentioned in level 1-3 headings, in page order, without
/// duplicates.
pub fn versions_from_headings(html: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for heading in HEADING.captures_iter(html) {
        let text = TAG.replace_all(&heading[1], " ");
        for version in VERSION.captures_iter(&text) {
            let version = version[1].to_string();
            if !found.contains(&version) {
                found.push(version);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_versions_from_headings() {
        let html = r##"
            <h1>Docker Desktop release notes</h1>
            <h2 id="4-12-0">4.12.0</h2>
            <p>Upgraded to 20.10.17</p>
            <h2 id="4-11-1"><a href="#4-11-1">4.11.1</a></h2>
            <h3>Bug fixes for 4.11.0</h3>
        "##;
        assert_eq!(versions_from_headings(html), vec!["4.12.0", "4.11.1", "4.11.0"]);
    }

    #[test]
    fn ignores_body_text() {
        let html = "<p>Docker Engine 24.0.6</p><h4>4.20.0</h4>";
        assert!(versions_from_headings(html).is_empty());
    }

    #[test]
    fn deduplicates() {
        let html = "<h2>4.9.1</h2><h3>4.9.1 security</h3>";
        assert_eq!(versions_from_headings(html), vec!["4.9.1"]);
    }

    #[test]
    fn heading_spanning_lines() {
        let html = "<H2 class=\"x\">\n  Docker Desktop\n  4.8.2\n</H2>";
        assert_eq!(versions_from_headings(html), vec!["4.8.2"]);
    }
}
