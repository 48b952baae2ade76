//! Placeholder extraction and declared-variable cross-checking.
//!
//! Placeholders come from the body (`{{NAME}}` and bare `[NAME]` tokens);
//! declarations come from a `Variables` section (table rows or bullet
//! entries). The mismatch lists are advisory.
use crate::corpus::PromptDocument;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Placeholder usage vs. declaration for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableReport {
    /// Placeholder names used in the body.
    pub placeholders: BTreeSet<String>,
    /// Names declared in the Variables section.
    pub declared: BTreeSet<String>,
    /// Declared name to description, where the declaration carried one.
    pub descriptions: BTreeMap<String, String>,
    pub undeclared_used: Vec<String>,
    pub unused_declared: Vec<String>,
}

/// Extract placeholders and declarations from a document body.
pub fn extract_variables(document: &PromptDocument) -> VariableReport {
    let placeholders = extract_placeholders(&document.body);
    let (declared, descriptions) = parse_declarations(&document.body);
    let undeclared_used = placeholders.difference(&declared).cloned().collect();
    let unused_declared = declared.difference(&placeholders).cloned().collect();
    VariableReport {
        placeholders,
        declared,
        descriptions,
        undeclared_used,
        unused_declared,
    }
}

/// Find placeholder tokens in body text.
///
/// `{{NAME}}` always counts (inner whitespace trimmed). `[NAME]` counts
/// only when the content is a single bare token: prose like `[Score 1-10]`,
/// markdown links `[text](url)`, and numeric footnote refs `[1]` are
/// excluded.
fn extract_placeholders(body: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let double = Regex::new(r"\{\{([^{}]+)\}\}").expect("regex for double-brace placeholders");
    for captures in double.captures_iter(body) {
        if let Some(inner) = captures.get(1) {
            let name = inner.as_str().trim();
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }
    let single = Regex::new(r"\[([^\[\]]+)\]").expect("regex for single-bracket placeholders");
    for captures in single.captures_iter(body) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let name = inner.as_str();
        if name.is_empty()
            || name.contains(char::is_whitespace)
            || name.contains(['{', '}'])
            || name.chars().all(|c| c.is_ascii_digit())
            || body[whole.end()..].starts_with('(')
        {
            continue;
        }
        names.insert(name.to_string());
    }
    names
}

/// Parse the `Variables` section into declared names and descriptions.
///
/// The section starts at any heading whose text is "Variables" and runs to
/// the next heading. Inside it, markdown table rows (first cell = name,
/// second = description) and `- NAME: description` bullets both declare.
fn parse_declarations(body: &str) -> (BTreeSet<String>, BTreeMap<String, String>) {
    let mut declared = BTreeSet::new();
    let mut descriptions = BTreeMap::new();
    let heading = Regex::new(r"(?i)^#{1,6}\s*variables\s*$").expect("regex for variables heading");

    let mut in_section = false;
    let mut table: Vec<&str> = Vec::new();
    for line in body.lines() {
        let trimmed = line.trim();
        if heading.is_match(trimmed) {
            in_section = true;
            continue;
        }
        if in_section && trimmed.starts_with('#') {
            flush_table(&mut table, &mut declared, &mut descriptions);
            in_section = false;
            continue;
        }
        if !in_section {
            continue;
        }
        if trimmed.starts_with('|') {
            table.push(trimmed);
            continue;
        }
        flush_table(&mut table, &mut declared, &mut descriptions);
        if let Some(entry) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            if let Some((name, description)) = parse_bullet(entry) {
                record(&mut declared, &mut descriptions, name, description);
            }
        }
    }
    flush_table(&mut table, &mut declared, &mut descriptions);
    (declared, descriptions)
}

fn flush_table(
    table: &mut Vec<&str>,
    declared: &mut BTreeSet<String>,
    descriptions: &mut BTreeMap<String, String>,
) {
    if table.is_empty() {
        return;
    }
    // Rows above the |---| separator are the header. A table with no
    // separator and multiple rows is assumed to start with one anyway.
    let start = match table.iter().position(|line| is_separator_row(line)) {
        Some(index) => index + 1,
        None if table.len() > 1 => 1,
        None => 0,
    };
    for line in table.iter().skip(start) {
        if is_separator_row(line) {
            continue;
        }
        if let Some((name, description)) = parse_table_row(line) {
            record(declared, descriptions, name, description);
        }
    }
    table.clear();
}

fn record(
    declared: &mut BTreeSet<String>,
    descriptions: &mut BTreeMap<String, String>,
    name: String,
    description: Option<String>,
) {
    if let Some(text) = description {
        descriptions.insert(name.clone(), text);
    }
    declared.insert(name);
}

fn is_separator_row(line: &str) -> bool {
    let inner = line.trim().trim_matches('|').trim();
    !inner.is_empty()
        && inner
            .chars()
            .all(|c| matches!(c, '-' | ':' | '|' | ' ' | '\t'))
}

fn parse_table_row(line: &str) -> Option<(String, Option<String>)> {
    let inner = line.trim().strip_prefix('|')?;
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let mut cells = inner.split('|').map(str::trim);
    let name = clean_name(cells.next()?)?;
    let description = cells.next().and_then(non_empty);
    Some((name, description))
}

fn parse_bullet(entry: &str) -> Option<(String, Option<String>)> {
    let entry = entry.trim();
    if let Some(rest) = entry.strip_prefix('`') {
        let (name, tail) = rest.split_once('`')?;
        let description = tail.trim_start_matches([':', '-', '—', '–', ' ']);
        return Some((clean_name(name)?, non_empty(description)));
    }
    let (name, description) = entry
        .split_once(':')
        .or_else(|| entry.split_once('—'))
        .or_else(|| entry.split_once(" - "))?;
    Some((clean_name(name)?, non_empty(description)))
}

/// Strip backticks and placeholder wrapping from a declared name.
fn clean_name(raw: &str) -> Option<String> {
    let mut name = raw.trim().trim_matches('`').trim();
    for (open, close) in [("{{", "}}"), ("[", "]"), ("{", "}")] {
        if let Some(inner) = name
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            name = inner.trim();
        }
    }
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
