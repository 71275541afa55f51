//! Front matter parsing.
//!
//! Hugo-style content files may start with a metadata block in one of four
//! formats: YAML between `---` delimiters, TOML between `+++`, a leading
//! JSON object followed by a blank line, or a run of org-mode `#+KEY: value`
//! lines. A block that fails to deserialize is stripped and logged, and the
//! document renders with default metadata; the body is never lost to a
//! malformed header.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::warn;

const YAML_DELIMITER: &str = "---\n";
const TOML_DELIMITER: &str = "+++\n";

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(\{[\s\S]*\})\n\n").unwrap());
static ORG_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(?:#\+\w+: ?[^\n]*\n)+").unwrap());
static ORG_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<\[](\d{4}-\d{2}-\d{2}) .*[>\]]").unwrap());

/// Recognized front matter properties.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: String,
    #[serde(rename = "draft")]
    pub is_draft: bool,
    pub layout: String,
    #[serde(rename = "date", deserialize_with = "date_string")]
    raw_date: String,
    pub summary: String,
    #[serde(rename = "headless")]
    pub is_headless: bool,
}

impl Metadata {
    /// The date exactly as written in the front matter.
    pub fn raw_date(&self) -> &str {
        &self.raw_date
    }

    /// The date parsed as RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`
    /// (midnight), whichever fits first.
    pub fn date(&self) -> Option<NaiveDateTime> {
        let raw = self.raw_date.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.naive_local());
        }
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date.and_time(NaiveTime::MIN));
        }
        None
    }
}

/// Accepts dates written as strings as well as the native datetime values
/// TOML front matter carries, normalizing both to their text form.
fn date_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct DateVisitor;

    impl<'de> Visitor<'de> for DateVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a date string or datetime")
        }

        fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_owned())
        }

        fn visit_string<E: serde::de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        // toml presents its datetime values as a one-entry map with a
        // private key; the value is the datetime's string form
        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<String, A::Error> {
            let mut out = String::new();
            while let Some((_, value)) = map.next_entry::<String, String>()? {
                out = value;
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(DateVisitor)
}

/// Split front matter off `source`, returning the remaining body and the
/// parsed metadata. Without front matter the body is `source` itself.
pub fn parse_front_matter(source: &str) -> (&str, Metadata) {
    if let Some(rest) = source.strip_prefix(YAML_DELIMITER) {
        if let Some(end) = rest.find(YAML_DELIMITER) {
            let body = &rest[end + YAML_DELIMITER.len()..];
            let metadata = match serde_yaml::from_str(&rest[..end]) {
                Ok(metadata) => metadata,
                Err(error) => {
                    warn!(%error, "ignoring unparseable YAML front matter");
                    Metadata::default()
                }
            };
            return (body, metadata);
        }
    } else if let Some(rest) = source.strip_prefix(TOML_DELIMITER) {
        if let Some(end) = rest.find(TOML_DELIMITER) {
            let body = &rest[end + TOML_DELIMITER.len()..];
            let metadata = match toml::from_str(&rest[..end]) {
                Ok(metadata) => metadata,
                Err(error) => {
                    warn!(%error, "ignoring unparseable TOML front matter");
                    Metadata::default()
                }
            };
            return (body, metadata);
        }
    } else if let Some(captures) = JSON_OBJECT.captures(source) {
        let whole = captures.get(0).map_or(0, |m| m.end());
        let block = captures.get(1).map_or("", |m| m.as_str());
        let body = &source[whole..];
        let metadata = match serde_json::from_str(block) {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(%error, "ignoring unparseable JSON front matter");
                Metadata::default()
            }
        };
        return (body, metadata);
    } else if let Some(header) = ORG_HEADER.find(source) {
        let body = &source[header.end()..];
        return (body, parse_org(header.as_str()));
    }
    (source, Metadata::default())
}

fn parse_org(header: &str) -> Metadata {
    let mut metadata = Metadata::default();
    for line in header.lines() {
        let Some(rest) = line.strip_prefix("#+") else {
            continue;
        };
        let Some((key, value)) = rest.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.to_ascii_lowercase().as_str() {
            "title" => metadata.title = value.to_string(),
            "draft" => metadata.is_draft = value.parse().unwrap_or(false),
            "layout" => metadata.layout = value.to_string(),
            "date" => metadata.raw_date = org_date(value),
            "summary" => metadata.summary = value.to_string(),
            "headless" => metadata.is_headless = value.parse().unwrap_or(false),
            _ => {}
        }
    }
    metadata
}

/// Org dates come wrapped in active or inactive timestamps like
/// `<2021-05-01 Sat>`; the plain date inside is what we keep.
fn org_date(value: &str) -> String {
    match ORG_DATE.captures(value).and_then(|c| c.get(1)) {
        Some(date) => date.as_str().to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn yaml_front_matter_is_split_off() {
        let source = "---\ntitle: Hello\ndraft: true\ndate: 2021-05-01\n---\nBody\n";
        let (body, metadata) = parse_front_matter(source);
        assert_eq!(body, "Body\n");
        assert_eq!(metadata.title, "Hello");
        assert!(metadata.is_draft);
        assert_eq!(metadata.raw_date(), "2021-05-01");
    }

    #[test]
    fn toml_front_matter_is_split_off() {
        let source = "+++\ntitle = \"Hello\"\ndate = \"2021-05-01 10:00:00\"\n+++\nBody\n";
        let (body, metadata) = parse_front_matter(source);
        assert_eq!(body, "Body\n");
        assert_eq!(metadata.title, "Hello");
        assert_eq!(
            metadata.date(),
            NaiveDate::from_ymd_opt(2021, 5, 1)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
        );
    }

    #[test]
    fn json_front_matter_needs_a_blank_line() {
        let source = "{\"title\": \"Hello\"}\n\nBody\n";
        let (body, metadata) = parse_front_matter(source);
        assert_eq!(body, "Body\n");
        assert_eq!(metadata.title, "Hello");
    }

    #[test]
    fn org_front_matter_reads_keyword_lines() {
        let source = "#+title: Hello World\n#+date: <2021-05-01 Sat>\n#+draft: true\nBody\n";
        let (body, metadata) = parse_front_matter(source);
        assert_eq!(body, "Body\n");
        assert_eq!(metadata.title, "Hello World");
        assert_eq!(metadata.raw_date(), "2021-05-01");
        assert!(metadata.is_draft);
    }

    #[test]
    fn unparseable_front_matter_is_stripped_with_defaults() {
        let source = "---\ntitle: [unclosed\n---\nBody\n";
        let (body, metadata) = parse_front_matter(source);
        assert_eq!(body, "Body\n");
        assert_eq!(metadata.title, "");
    }

    #[test]
    fn unterminated_front_matter_is_left_alone() {
        let source = "---\ntitle: Hello\nBody\n";
        let (body, metadata) = parse_front_matter(source);
        assert_eq!(body, source);
        assert_eq!(metadata.title, "");
    }

    #[test]
    fn missing_front_matter_returns_the_source() {
        let (body, metadata) = parse_front_matter("Just a document.\n");
        assert_eq!(body, "Just a document.\n");
        assert!(metadata.title.is_empty());
        assert!(metadata.date().is_none());
    }

    #[test]
    fn date_formats_parse_lazily() {
        let mut metadata = Metadata::default();
        metadata.raw_date = "2021-05-01T10:30:00+03:00".to_string();
        assert_eq!(
            metadata.date(),
            NaiveDate::from_ymd_opt(2021, 5, 1)
                .and_then(|d| d.and_hms_opt(10, 30, 0))
        );
        metadata.raw_date = "2021-05-01".to_string();
        assert_eq!(
            metadata.date(),
            NaiveDate::from_ymd_opt(2021, 5, 1).map(|d| d.and_time(NaiveTime::MIN))
        );
        metadata.raw_date = "not a date".to_string();
        assert_eq!(metadata.date(), None);
    }
}
