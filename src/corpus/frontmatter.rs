//! Frontmatter splitting and YAML parsing.
//!
//! Parsing is tolerant: every malformed shape degrades to an empty mapping
//! plus a coded warning so the document still flows through validation and
//! scoring.
use crate::corpus::Warning;
use std::collections::BTreeMap;

/// Result of splitting raw file text into frontmatter and body.
#[derive(Debug)]
pub struct SplitDocument {
    pub frontmatter: BTreeMap<String, serde_yaml::Value>,
    pub body: String,
    pub warnings: Vec<Warning>,
}

/// Split a document on its frontmatter delimiter pair.
///
/// The opening delimiter is a first line of exactly `---` (trailing
/// whitespace tolerated); the block runs to the next such line. A document
/// without an opening delimiter is legal and yields an empty mapping with
/// no warning.
pub fn split_frontmatter(text: &str) -> SplitDocument {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let first_line_end = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    if text[..first_line_end].trim_end() != "---" {
        return SplitDocument {
            frontmatter: BTreeMap::new(),
            body: text.to_string(),
            warnings: Vec::new(),
        };
    }

    let mut block_range = None;
    let mut pos = first_line_end;
    for line in text[first_line_end..].split_inclusive('\n') {
        if line.trim_end() == "---" {
            block_range = Some((pos, pos + line.len()));
            break;
        }
        pos += line.len();
    }

    let Some((block_end, body_start)) = block_range else {
        return SplitDocument {
            frontmatter: BTreeMap::new(),
            body: text.to_string(),
            warnings: vec![Warning::new(
                "frontmatter_unclosed",
                "frontmatter block has no closing delimiter",
            )],
        };
    };

    let block = &text[first_line_end..block_end];
    let body = text[body_start..].to_string();
    let (frontmatter, warnings) = parse_block(block);
    SplitDocument {
        frontmatter,
        body,
        warnings,
    }
}

fn parse_block(block: &str) -> (BTreeMap<String, serde_yaml::Value>, Vec<Warning>) {
    if block.trim().is_empty() {
        return (BTreeMap::new(), Vec::new());
    }
    let value: serde_yaml::Value = match serde_yaml::from_str(block) {
        Ok(value) => value,
        Err(err) => {
            return (
                BTreeMap::new(),
                vec![Warning::new(
                    "frontmatter_invalid_yaml",
                    format!("frontmatter YAML did not parse: {err}"),
                )],
            );
        }
    };
    match value {
        serde_yaml::Value::Null => (BTreeMap::new(), Vec::new()),
        serde_yaml::Value::Mapping(mapping) => {
            let mut fields = BTreeMap::new();
            for (key, entry) in mapping {
                if let Some(name) = key.as_str() {
                    fields.insert(name.to_string(), entry);
                }
            }
            (fields, Vec::new())
        }
        _ => (
            BTreeMap::new(),
            vec![Warning::new(
                "frontmatter_not_mapping",
                "frontmatter top level is not a mapping",
            )],
        ),
    }
}
