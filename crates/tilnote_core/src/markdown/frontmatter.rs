//! Frontmatter block detection and parsing.
//!
//! A block opens with a first line that is exactly `---` and closes at the
//! next line that is exactly `---`. Without a closing line there is no block.

use super::line_spans;
use crate::model::note::Frontmatter;
use log::debug;
use serde_json::Value;
use serde_yaml::Value as YamlValue;

const DELIMITER: &str = "---";

/// Splits `content` into `(frontmatter block, body)`.
///
/// The block excludes both delimiter lines. When no complete block exists the
/// whole content is returned as body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let mut lines = line_spans(content);
    let Some(first) = lines.next() else {
        return (None, content);
    };
    if first.text != DELIMITER {
        return (None, content);
    }

    for line in lines {
        if line.text == DELIMITER {
            return (Some(&content[first.end..line.start]), &content[line.end..]);
        }
    }
    (None, content)
}

/// Returns the body of `content` with any frontmatter block removed.
pub fn strip_frontmatter(content: &str) -> &str {
    split_frontmatter(content).1
}

/// Parses the frontmatter of `content` into a mapping.
///
/// Absent, empty, malformed, or non-mapping blocks yield an empty mapping.
pub fn parse_frontmatter(content: &str) -> Frontmatter {
    match split_frontmatter(content).0 {
        Some(block) => parse_block(block),
        None => Frontmatter::new(),
    }
}

/// Parses one raw YAML block into a mapping.
///
/// Tagged values (`!custom x`) keep their inner value and lose the tag.
pub fn parse_block(block: &str) -> Frontmatter {
    let yaml = match serde_yaml::from_str::<YamlValue>(block) {
        Ok(yaml) => untag(yaml),
        Err(err) => {
            debug!(
                "event=frontmatter_parse module=markdown status=degraded reason=yaml_error line={}",
                err.location().map(|loc| loc.line()).unwrap_or(0)
            );
            return Frontmatter::new();
        }
    };

    match serde_json::to_value(yaml) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Frontmatter::new(),
        Err(_) => {
            debug!("event=frontmatter_parse module=markdown status=degraded reason=unsupported_key");
            Frontmatter::new()
        }
    }
}

fn untag(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untag(tagged.value),
        YamlValue::Sequence(items) => YamlValue::Sequence(items.into_iter().map(untag).collect()),
        YamlValue::Mapping(entries) => YamlValue::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (untag(key), untag(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Returns the string entries of a frontmatter list field, in order.
///
/// Non-list values yield an empty vector; non-string list entries are skipped.
pub fn string_list(frontmatter: &Frontmatter, key: &str) -> Vec<String> {
    match frontmatter.get(key) {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_frontmatter, split_frontmatter, string_list, strip_frontmatter};
    use serde_json::json;

    #[test]
    fn splits_block_and_body() {
        let (block, body) = split_frontmatter("---\ntitle: x\n---\n# Body\n");
        assert_eq!(block, Some("title: x\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn missing_closing_marker_means_no_frontmatter() {
        let content = "---\ntitle: x\n# Body";
        assert_eq!(split_frontmatter(content), (None, content));
    }

    #[test]
    fn opening_marker_must_be_first_line() {
        let content = "\n---\ntitle: x\n---\n";
        assert_eq!(split_frontmatter(content).0, None);
    }

    #[test]
    fn closing_marker_must_be_exact_line() {
        let content = "---\na: 1\n----\nb: 2\n---\nbody";
        let (block, body) = split_frontmatter(content);
        assert_eq!(block, Some("a: 1\n----\nb: 2\n"));
        assert_eq!(body, "body");
    }

    #[test]
    fn empty_block_is_supported() {
        let (block, body) = split_frontmatter("---\n---\nbody");
        assert_eq!(block, Some(""));
        assert_eq!(body, "body");
        assert!(parse_frontmatter("---\n---\nbody").is_empty());
    }

    #[test]
    fn parses_yaml_mapping_values() {
        let fm = parse_frontmatter("---\ndate: 2024-01-15\ntags:\n  - til\n  - rust\n---\n");
        assert_eq!(fm.get("date"), Some(&json!("2024-01-15")));
        assert_eq!(string_list(&fm, "tags"), vec!["til", "rust"]);
    }

    #[test]
    fn malformed_yaml_yields_empty_mapping() {
        let fm = parse_frontmatter("---\ntags: [unclosed\n---\nbody");
        assert!(fm.is_empty());
        assert_eq!(strip_frontmatter("---\ntags: [unclosed\n---\nbody"), "body");
    }

    #[test]
    fn tagged_values_keep_their_inner_value() {
        let fm = parse_frontmatter(
            "---\nmeta: !custom x\ntags: [c]\nnested:\n  - !ref { id: 1 }\n---\n",
        );
        assert_eq!(fm.get("meta"), Some(&json!("x")));
        assert_eq!(string_list(&fm, "tags"), vec!["c"]);
        assert_eq!(fm.get("nested"), Some(&json!([{ "id": 1 }])));
    }

    #[test]
    fn scalar_document_yields_empty_mapping() {
        assert!(parse_frontmatter("---\njust text\n---\n").is_empty());
    }

    #[test]
    fn string_list_skips_non_strings_and_non_lists() {
        let fm = parse_frontmatter("---\ntags:\n  - a\n  - 3\nsingle: b\n---\n");
        assert_eq!(string_list(&fm, "tags"), vec!["a"]);
        assert!(string_list(&fm, "single").is_empty());
        assert!(string_list(&fm, "missing").is_empty());
    }
}
