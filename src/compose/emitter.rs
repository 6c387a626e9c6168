//! Compose file emitter
//!
//! Writes block-style YAML with an explicit scalar quoting policy instead of
//! whatever `serde_yaml` picks. Strings holding a newline, a colon or a
//! bracket are always double-quoted; strings that would read back as
//! something other than a string are single-quoted; the rest stay plain.

use crate::error::{ConvertError, Result};
use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fmt::Write as _;
use std::sync::LazyLock;

/// Scalars that YAML resolves to numbers or timestamps
static NON_STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"[-+]?(?:[0-9][0-9_]*(?:\.[0-9_]*)?|\.[0-9_]+)(?:[eE][-+]?[0-9]+)?",
        r"|[-+]?0x[0-9a-fA-F_]+",
        r"|[-+]?0o[0-7_]+",
        r"|[-+]?0b[01_]+",
        r"|[-+]?\.(?:inf|Inf|INF)",
        r"|\.(?:nan|NaN|NAN)",
        r"|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}.*",
        r")$"
    ))
    .expect("valid regex")
});

/// Words YAML 1.1 or 1.2 read as null or booleans
const RESERVED_WORDS: &[&str] = &[
    "~", "null", "Null", "NULL", "true", "True", "TRUE", "false", "False", "FALSE", "yes", "Yes",
    "YES", "no", "No", "NO", "on", "On", "ON", "off", "Off", "OFF", "y", "Y", "n", "N", "<<",
];

/// Longest key a YAML parser accepts in `key: value` form; longer keys are
/// written as explicit `? key` entries
const MAX_SIMPLE_KEY_LEN: usize = 1024;

/// Emitter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Spaces per nesting level
    pub indent: usize,
    /// Characters that force double-quoted style
    pub double_quote_chars: Vec<char>,
    /// Indent sequence items under their parent key
    pub indent_sequences: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            double_quote_chars: vec!['\n', ':', '{', '}', '[', ']'],
            indent_sequences: false,
        }
    }
}

/// Compose file emitter
#[derive(Debug, Clone, Default)]
pub struct ComposeEmitter {
    config: EmitterConfig,
}

impl ComposeEmitter {
    /// Create an emitter with the given configuration
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// Serialize any value to YAML text
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<String> {
        let value = serde_yaml::to_value(value)?;
        self.emit_value(&value)
    }

    /// Write an already-built YAML value
    pub fn emit_value(&self, value: &Value) -> Result<String> {
        let mut out = String::new();
        match value {
            Value::Mapping(mapping) if !mapping.is_empty() => {
                self.write_mapping(mapping, 0, &mut out)?
            }
            Value::Sequence(items) if !items.is_empty() => {
                self.write_sequence(items, 0, &mut out)?
            }
            other => {
                out.push_str(&self.scalar(other)?);
                out.push('\n');
            }
        }
        Ok(out)
    }

    fn write_mapping(&self, mapping: &Mapping, indent: usize, out: &mut String) -> Result<()> {
        for (key, value) in mapping {
            let key = self.key(key)?;
            pad(out, indent);
            if key.chars().count() >= MAX_SIMPLE_KEY_LEN {
                out.push_str("? ");
                out.push_str(&key);
                out.push('\n');
                pad(out, indent);
            } else {
                out.push_str(&key);
            }
            out.push(':');
            self.write_value(value, indent, out)?;
        }
        Ok(())
    }

    fn write_sequence(&self, items: &[Value], indent: usize, out: &mut String) -> Result<()> {
        for item in items {
            pad(out, indent);
            out.push('-');
            match item {
                Value::Mapping(mapping) if !mapping.is_empty() => {
                    let mut nested = String::new();
                    self.write_mapping(mapping, indent + 2, &mut nested)?;
                    out.push(' ');
                    out.push_str(&nested[indent + 2..]);
                }
                Value::Sequence(inner) if !inner.is_empty() => {
                    let mut nested = String::new();
                    self.write_sequence(inner, indent + 2, &mut nested)?;
                    out.push(' ');
                    out.push_str(&nested[indent + 2..]);
                }
                other => self.write_value(other, indent, out)?,
            }
        }
        Ok(())
    }

    /// Write whatever follows `key:` or `-`, where `indent` is the
    /// indentation of that key or dash
    fn write_value(&self, value: &Value, indent: usize, out: &mut String) -> Result<()> {
        match value {
            Value::Mapping(mapping) if !mapping.is_empty() => {
                out.push('\n');
                self.write_mapping(mapping, indent + self.config.indent, out)
            }
            Value::Sequence(items) if !items.is_empty() => {
                out.push('\n');
                let indent = if self.config.indent_sequences {
                    indent + self.config.indent
                } else {
                    indent
                };
                self.write_sequence(items, indent, out)
            }
            Value::Tagged(tagged) => {
                let _ = write!(out, " {}", tagged.tag);
                self.write_value(&tagged.value, indent, out)
            }
            scalar => {
                out.push(' ');
                out.push_str(&self.scalar(scalar)?);
                out.push('\n');
                Ok(())
            }
        }
    }

    fn key(&self, key: &Value) -> Result<String> {
        match key {
            Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_) => Err(ConvertError::Yaml(
                "complex mapping keys are not supported".to_string(),
            )),
            other => self.scalar(other),
        }
    }

    fn scalar(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.quote(s),
            Value::Mapping(m) if m.is_empty() => "{}".to_string(),
            Value::Sequence(s) if s.is_empty() => "[]".to_string(),
            Value::Tagged(tagged) => format!("{} {}", tagged.tag, self.scalar(&tagged.value)?),
            _ => {
                return Err(ConvertError::Yaml(
                    "collection used where a scalar is required".to_string(),
                ))
            }
        })
    }

    /// Render a string scalar in the style the quoting policy asks for
    pub fn quote(&self, s: &str) -> String {
        if s
            .chars()
            .any(|c| needs_escape(c) || self.config.double_quote_chars.contains(&c))
        {
            double_quoted(s)
        } else if !is_plain_safe(s) {
            format!("'{}'", s.replace('\'', "''"))
        } else {
            s.to_string()
        }
    }
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if needs_escape(c) => {
                let code = c as u32;
                if code <= 0xff {
                    let _ = write!(out, "\\x{:02X}", code);
                } else {
                    let _ = write!(out, "\\u{:04X}", code);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Characters that may not appear raw in a YAML scalar: controls, the
/// Unicode line and paragraph separators, and anything outside the YAML
/// printable set
fn needs_escape(c: char) -> bool {
    let printable = matches!(
        c,
        ' '..='~' | '\u{A0}'..='\u{2027}' | '\u{202A}'..='\u{D7FF}' | '\u{E000}'..='\u{FEFE}'
            | '\u{FF00}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    );
    !printable
}

/// Whether a string reads back as the same string when written plain
fn is_plain_safe(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if first.is_whitespace() || s.ends_with(char::is_whitespace) {
        return false;
    }
    if ",[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if "-?:".contains(first) && chars.next().map_or(true, char::is_whitespace) {
        return false;
    }
    if s.starts_with("---") || s.starts_with("...") {
        return false;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return false;
    }

    !(RESERVED_WORDS.contains(&s) || NON_STRING_RE.is_match(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(s: &str) -> String {
        ComposeEmitter::default().quote(s)
    }

    #[test]
    fn test_double_quote_triggers() {
        assert_eq!(quote("32400:32400/tcp"), "\"32400:32400/tcp\"");
        assert_eq!(quote("http://[IP]:[PORT:80]"), "\"http://[IP]:[PORT:80]\"");
        assert_eq!(quote("{json}"), "\"{json}\"");
        assert_eq!(quote("a]b"), "\"a]b\"");
        assert_eq!(quote("line1\nline2"), "\"line1\\nline2\"");
        assert_eq!(quote("say \"hi\": x"), "\"say \\\"hi\\\": x\"");
    }

    #[test]
    fn test_control_characters_are_escaped() {
        assert_eq!(quote("a\tb"), "\"a\\tb\"");
        assert_eq!(quote("bell\u{7}"), "\"bell\\x07\"");
    }

    #[test]
    fn test_line_separators_and_non_printables_are_escaped() {
        assert_eq!(quote("a\u{2028}b"), "\"a\\Lb\"");
        assert_eq!(quote("a\u{2029}b"), "\"a\\Pb\"");
        assert_eq!(quote("x\u{fffe}"), "\"x\\uFFFE\"");
        assert_eq!(quote("\u{feff}bom"), "\"\\uFEFFbom\"");
        assert_eq!(quote("caf\u{e9} \u{1F600}"), "caf\u{e9} \u{1F600}");

        for raw in ["hello\u{2028}world", "p\u{2029}", "x\u{fffe}", "y\u{ffff}", "z\u{feff}", "nel\u{85}"] {
            let mut mapping = Mapping::new();
            mapping.insert(Value::from("k"), Value::from(raw));
            let value = Value::Mapping(mapping);
            let emitted = ComposeEmitter::default().emit_value(&value).unwrap();
            let reparsed: Value = serde_yaml::from_str(&emitted).unwrap();
            assert_eq!(reparsed, value, "{:?}", emitted);
        }
    }

    #[test]
    fn test_long_keys_are_explicit() {
        let long_key = "K".repeat(1100);
        let mut inner = Mapping::new();
        inner.insert(Value::from(long_key.clone()), Value::from("v"));
        inner.insert(Value::from("short"), Value::from("w"));
        let mut mapping = Mapping::new();
        mapping.insert(Value::from("environment"), Value::Mapping(inner));
        mapping.insert(
            Value::from("items"),
            Value::Sequence(vec![Value::Mapping(
                [(Value::from(long_key.clone()), Value::from(1))].into_iter().collect(),
            )]),
        );
        let value = Value::Mapping(mapping);

        let emitted = ComposeEmitter::default().emit_value(&value).unwrap();
        assert!(emitted.starts_with(&format!("environment:\n  ? {}\n  : v\n  short: w\n", long_key)));
        assert!(emitted.ends_with(&format!("items:\n- ? {}\n  : 1\n", long_key)));

        let reparsed: Value = serde_yaml::from_str(&emitted).unwrap();
        assert_eq!(reparsed, value);
    }

    #[test]
    fn test_single_quote_for_non_strings() {
        assert_eq!(quote(""), "''");
        assert_eq!(quote("1.5"), "'1.5'");
        assert_eq!(quote("99"), "'99'");
        assert_eq!(quote("true"), "'true'");
        assert_eq!(quote("No"), "'No'");
        assert_eq!(quote("~"), "'~'");
        assert_eq!(quote("0x1F"), "'0x1F'");
        assert_eq!(quote(".inf"), "'.inf'");
        assert_eq!(quote("2024-01-02"), "'2024-01-02'");
        assert_eq!(quote("it's 1"), "it's 1");
        assert_eq!(quote("'quoted'"), "'''quoted'''");
    }

    #[test]
    fn test_single_quote_for_indicators_and_spaces() {
        assert_eq!(quote("*alias"), "'*alias'");
        assert_eq!(quote("#comment"), "'#comment'");
        assert_eq!(quote("- item"), "'- item'");
        assert_eq!(quote("-"), "'-'");
        assert_eq!(quote(" padded"), "' padded'");
        assert_eq!(quote("padded "), "'padded '");
        assert_eq!(quote("a #b"), "'a #b'");
        assert_eq!(quote("---"), "'---'");
    }

    #[test]
    fn test_plain_strings() {
        assert_eq!(quote("plexinc/pms"), "plexinc/pms");
        assert_eq!(quote("unless-stopped"), "unless-stopped");
        assert_eq!(quote("512m"), "512m");
        assert_eq!(quote("0,1"), "0,1");
        assert_eq!(quote("-v"), "-v");
        assert_eq!(quote("kuma.monitor.type=docker"), "kuma.monitor.type=docker");
        assert_eq!(quote("Europe/Berlin"), "Europe/Berlin");
    }

    #[test]
    fn test_block_layout() {
        let yaml = "services:\n  web:\n    image: nginx\n    ports:\n    - '80'\n    labels:\n      a.b: c\n    networks: []\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let emitted = ComposeEmitter::default().emit_value(&value).unwrap();
        assert_eq!(emitted, yaml);
    }

    #[test]
    fn test_sequence_of_mappings() {
        let yaml = "items:\n- name: a\n  value: 1\n- - x\n  - y\n- {}\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let emitted = ComposeEmitter::default().emit_value(&value).unwrap();
        assert_eq!(emitted, yaml);
    }

    #[test]
    fn test_indent_config() {
        let emitter = ComposeEmitter::new(EmitterConfig {
            indent: 4,
            indent_sequences: true,
            ..EmitterConfig::default()
        });
        let value: Value = serde_yaml::from_str("a:\n  b:\n  - c\n").unwrap();
        assert_eq!(emitter.emit_value(&value).unwrap(), "a:\n    b:\n        - c\n");
    }

    #[test]
    fn test_scalars() {
        let value: Value = serde_yaml::from_str("a: null\nb: true\nc: 1024\nd: 1.5\n").unwrap();
        let emitted = ComposeEmitter::default().emit_value(&value).unwrap();
        assert_eq!(emitted, "a: null\nb: true\nc: 1024\nd: 1.5\n");
    }

    #[test]
    fn test_complex_keys_are_rejected() {
        let mut mapping = Mapping::new();
        mapping.insert(
            Value::Sequence(vec![Value::from("a"), Value::from("b")]),
            Value::from("c"),
        );
        let result = ComposeEmitter::default().emit_value(&Value::Mapping(mapping));
        assert!(matches!(result, Err(ConvertError::Yaml(_))));
    }

    #[test]
    fn test_reparse_is_stable() {
        let yaml = "text: \"multi\\nline\"\nodd: '  spaced'\nnum: '007'\nurl: \"http://x:1/[a]\"\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let emitter = ComposeEmitter::default();
        let first = emitter.emit_value(&value).unwrap();
        let reparsed: Value = serde_yaml::from_str(&first).unwrap();
        assert_eq!(reparsed, value);
        assert_eq!(emitter.emit_value(&reparsed).unwrap(), first);
    }
}
