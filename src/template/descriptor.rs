//! unRAID template descriptor
//!
//! Reads the raw XML of an unRAID Docker template into a flat descriptor.
//! Only direct children of the root element are considered; for tags that
//! appear more than once the first occurrence wins, except `Config`, which
//! is collected in document order.

use crate::error::{ConvertError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;

/// Config entry kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKind {
    /// Environment variable
    Variable,
    /// Host path mounted into the container
    Path,
    /// Published port
    Port,
    /// Any other type (Device, Label, ...), ignored by the parser
    Other(String),
}

impl From<&str> for ConfigKind {
    fn from(s: &str) -> Self {
        match s {
            "Variable" => ConfigKind::Variable,
            "Path" => ConfigKind::Path,
            "Port" => ConfigKind::Port,
            other => ConfigKind::Other(other.to_string()),
        }
    }
}

/// A `<Config>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEntry {
    /// `Type` attribute
    pub kind: Option<ConfigKind>,
    /// `Target` attribute
    pub target: Option<String>,
    /// `Mode` attribute
    pub mode: Option<String>,
    /// Element text
    pub value: Option<String>,
}

/// Parsed unRAID template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub name: Option<String>,
    pub repository: Option<String>,
    pub privileged: Option<String>,
    pub network: Option<String>,
    pub extra_params: Option<String>,
    pub cpuset: Option<String>,
    pub webui: Option<String>,
    pub support: Option<String>,
    pub project: Option<String>,
    pub configs: Vec<ConfigEntry>,
}

/// Child element currently being read
struct OpenChild {
    tag: Vec<u8>,
    config: Option<ConfigEntry>,
    text: String,
    /// Set once a nested element is seen; later text is not the child's own
    sealed: bool,
}

impl TemplateDescriptor {
    /// Parse a descriptor from XML text
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut descriptor = TemplateDescriptor::default();
        let mut depth = 0usize;
        let mut seen_root = false;
        let mut child: Option<OpenChild> = None;
        let mut seen_tags: HashSet<Vec<u8>> = HashSet::new();

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(ConvertError::XmlSyntax(format!(
                        "{} (at byte {})",
                        e,
                        reader.buffer_position()
                    )))
                }
            };

            match event {
                Event::Start(e) => {
                    match depth {
                        0 => open_root(&mut seen_root)?,
                        1 => child = Some(OpenChild::new(&e)?),
                        _ => seal(&mut child),
                    }
                    depth += 1;
                }
                Event::Empty(e) => match depth {
                    0 => open_root(&mut seen_root)?,
                    1 => descriptor.accept(OpenChild::new(&e)?, &mut seen_tags),
                    _ => seal(&mut child),
                },
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 1 {
                        if let Some(open) = child.take() {
                            descriptor.accept(open, &mut seen_tags);
                        }
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    if depth == 0 {
                        if !text.trim().is_empty() {
                            return Err(ConvertError::XmlSyntax(
                                "text outside of the root element".to_string(),
                            ));
                        }
                    } else if depth == 2 {
                        push_text(&mut child, &text);
                    }
                }
                Event::CData(c) => {
                    if depth == 2 {
                        push_text(&mut child, &String::from_utf8_lossy(&c));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(ConvertError::XmlSyntax("no element found".to_string()));
        }
        if depth != 0 {
            return Err(ConvertError::XmlSyntax(
                "unexpected end of document, unclosed element".to_string(),
            ));
        }

        Ok(descriptor)
    }

    /// Record a finished child. The first element with a given tag decides
    /// its field even when that element has no text.
    fn accept(&mut self, child: OpenChild, seen_tags: &mut HashSet<Vec<u8>>) {
        let value = if child.text.is_empty() {
            None
        } else {
            Some(child.text)
        };

        if let Some(mut config) = child.config {
            config.value = value;
            self.configs.push(config);
            return;
        }

        let slot = match child.tag.as_slice() {
            b"Name" => &mut self.name,
            b"Repository" => &mut self.repository,
            b"Privileged" => &mut self.privileged,
            b"Network" => &mut self.network,
            b"ExtraParams" => &mut self.extra_params,
            b"CPUset" => &mut self.cpuset,
            b"WebUI" => &mut self.webui,
            b"Support" => &mut self.support,
            b"Project" => &mut self.project,
            _ => return,
        };
        if seen_tags.insert(child.tag) {
            *slot = value;
        }
    }
}

impl OpenChild {
    fn new(start: &BytesStart<'_>) -> Result<Self> {
        let tag = start.name().as_ref().to_vec();
        let config = if tag == b"Config" {
            Some(read_config_attributes(start)?)
        } else {
            None
        };

        Ok(Self {
            tag,
            config,
            text: String::new(),
            sealed: false,
        })
    }
}

fn open_root(seen_root: &mut bool) -> Result<()> {
    if *seen_root {
        return Err(ConvertError::XmlSyntax(
            "junk after document element".to_string(),
        ));
    }
    *seen_root = true;
    Ok(())
}

fn seal(child: &mut Option<OpenChild>) {
    if let Some(open) = child {
        open.sealed = true;
    }
}

fn push_text(child: &mut Option<OpenChild>, text: &str) {
    if let Some(open) = child {
        if !open.sealed {
            open.text.push_str(text);
        }
    }
}

fn read_config_attributes(start: &BytesStart<'_>) -> Result<ConfigEntry> {
    let mut entry = ConfigEntry::default();

    for attr in start.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"Type" => entry.kind = Some(ConfigKind::from(value.as_str())),
            b"Target" => entry.target = Some(value),
            b"Mode" => entry.mode = Some(value),
            _ => {}
        }
    }

    Ok(entry)
}
