//! Frontmatter handling for `SKILL.md`.
//!
//! Skill files are frequently written by an LLM rather than a human, so the
//! metadata block arrives in all kinds of slightly-wrong shapes: a BOM, blank
//! lines or a stray `# Heading` before the opening `---`, a closing `---` with
//! no trailing newline, or YAML that does not parse. Everything in here is a
//! pure text transformation; the parser decides what to persist.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Frontmatter at position 0. The block may be empty and the closing `---`
/// may sit at end of file.
static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)??---[ \t]*(?:\r?\n|\z)")
        .expect("frontmatter regex")
});

/// First complete frontmatter block anywhere in the text.
static EMBEDDED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:\A|\n)(---[ \t]*\r?\n(?:.*?\r?\n)??---[ \t]*(?:\r?\n|\z))")
        .expect("embedded block regex")
});

/// `key: value` on an unindented line, used when the YAML is broken.
static FIELD_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)\s*:\s*(.*?)\s*$").expect("field line regex")
});

/// Result of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// A frontmatter block was found below some leading text and moved to the
    /// top; the leading text was dropped.
    pub relocated: bool,
}

/// Bring raw `SKILL.md` content into a shape the frontmatter regex can match.
///
/// Strips a BOM and leading whitespace, guarantees a trailing newline and, if
/// the text does not open with `---`, lifts the first delimited block to the
/// front. Content without any block is returned otherwise untouched.
pub fn normalize(raw: &str) -> Normalized {
    let mut text = raw.trim_start_matches('\u{feff}').trim_start().to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    if text.starts_with("---") {
        return Normalized {
            text,
            relocated: false,
        };
    }

    let lifted = EMBEDDED_BLOCK_RE.captures(&text).and_then(|caps| {
        let whole = caps.get(0)?;
        let block = caps.get(1)?;
        Some(format!("{}{}", block.as_str(), &text[whole.end()..]))
    });

    match lifted {
        Some(lifted) => Normalized {
            text: lifted,
            relocated: true,
        },
        None => Normalized {
            text,
            relocated: false,
        },
    }
}

/// Split normalized text into `(metadata_block, body)`.
///
/// Returns `None` when the text does not start with a complete block.
pub fn split(text: &str) -> Option<(&str, &str)> {
    let caps = FRONTMATTER_RE.captures(text)?;
    let whole = caps.get(0)?;
    let block = caps.get(1).map_or("", |m| m.as_str());
    Some((block, &text[whole.end()..]))
}

/// Build a minimal frontmatter block for a file that has none and prepend it.
///
/// The name comes from the directory, the description from the first
/// Markdown heading (falling back to the name).
pub fn synthesize(dir_name: &str, text: &str, default_version: &str) -> String {
    let description = first_heading(text).unwrap_or(dir_name);
    let mut meta = serde_yaml::Mapping::new();
    meta.insert("name".into(), dir_name.into());
    meta.insert("description".into(), description.into());
    meta.insert("version".into(), default_version.into());

    let yaml = serde_yaml::to_string(&meta).unwrap_or_else(|_| {
        format!("name: {dir_name}\ndescription: {dir_name}\nversion: {default_version}\n")
    });
    format!("---\n{yaml}---\n{text}")
}

fn first_heading(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| l.starts_with('#'))
        .map(|l| l.trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
}

/// Parse a metadata block as a YAML mapping.
///
/// An empty block yields an empty map. Anything that is not a mapping is an
/// error, reported with the YAML parser's message where there is one.
pub fn parse_metadata(block: &str) -> Result<Map<String, Value>, String> {
    let value: serde_yaml::Value = serde_yaml::from_str(block).map_err(|e| e.to_string())?;
    match yaml_to_json(&value) {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(format!(
            "expected a mapping of fields, found {}",
            json_kind(&other)
        )),
    }
}

/// Line-by-line recovery for metadata that is not valid YAML.
///
/// Picks up every unindented `key: value` line. Surrounding quotes are
/// removed, an empty value becomes null, and a `[a, b]` flow list becomes an
/// array so `allowed-tools` still works.
pub fn recover_fields(block: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for line in block.lines() {
        let Some(caps) = FIELD_LINE_RE.captures(line) else {
            continue;
        };
        let key = caps[1].to_string();
        let raw = caps[2].trim();
        let value = if raw.is_empty() {
            Value::Null
        } else if raw.starts_with('[') && raw.ends_with(']') {
            Value::Array(
                raw[1..raw.len() - 1]
                    .split(',')
                    .map(|t| unquote(t.trim()))
                    .filter(|t| !t.is_empty())
                    .map(Value::String)
                    .collect(),
            )
        } else {
            Value::String(unquote(raw))
        };
        // First occurrence wins.
        map.entry(key).or_insert(value);
    }
    map
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    let quoted = s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')));
    if quoted {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Convert a YAML value to JSON. Non-string mapping keys are stringified.
pub fn yaml_to_json(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.to_string()))
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => Value::Array(seq.iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(m) => Value::Object(
            m.iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    match yaml_to_json(key) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
