//! The externally supplied component: its name and ordered port list.
//!
//! The port list comes either from `[component] ports` in `tether.toml` or
//! from the ANSI module header of a Verilog/SystemVerilog file.

use crate::errors::ElaborateError;
use serde::{Deserialize, Serialize};
use tether_common::Direction;
use tether_config::ComponentConfig;

/// One port declared by the component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentPort {
    /// The port name.
    pub name: String,
    /// The port direction.
    pub direction: Direction,
    /// The port width in bits.
    pub width: u32,
}

impl ComponentPort {
    /// Creates a port.
    pub fn new(name: impl Into<String>, direction: Direction, width: u32) -> Self {
        Self {
            name: name.into(),
            direction,
            width,
        }
    }
}

/// A component's name and its ports in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInterface {
    /// The component (module) name.
    pub name: String,
    /// Ports in declaration order.
    pub ports: Vec<ComponentPort>,
}

impl ComponentInterface {
    /// Creates an interface from its parts.
    pub fn new(name: impl Into<String>, ports: Vec<ComponentPort>) -> Self {
        Self {
            name: name.into(),
            ports,
        }
    }

    /// Builds the interface from an inline `[component] ports` list.
    pub fn from_config(config: &ComponentConfig) -> Self {
        Self {
            name: config.name.clone(),
            ports: config
                .ports
                .iter()
                .map(|p| ComponentPort::new(p.name.clone(), p.direction, p.width))
                .collect(),
        }
    }

    /// Looks up a port by name.
    pub fn port(&self, name: &str) -> Option<&ComponentPort> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Returns the number of declared ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Returns `true` if the component declares no ports.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Keywords that may sit between the direction and the port name.
const NET_KEYWORDS: &[&str] = &[
    "wire", "reg", "logic", "tri", "wand", "wor", "signed", "unsigned", "var", "bit",
];

/// Reads the ANSI port list of `module` from Verilog or SystemVerilog text.
///
/// Handles comments, attributes, an optional `#(...)` parameter list, net
/// types, and constant `[hi:lo]` ranges. A name without its own direction
/// continues the previous declaration (`input [7:0] a, b`).
pub fn scan_verilog_header(text: &str, module: &str) -> Result<ComponentInterface, ElaborateError> {
    let source = strip_comments(text);
    let invalid = |reason: &str| ElaborateError::InvalidInterface {
        module: module.to_string(),
        reason: reason.to_string(),
    };

    let after_name = find_module(&source, module).ok_or_else(|| {
        ElaborateError::ComponentNotFound {
            module: module.to_string(),
        }
    })?;
    let mut rest = after_name.trim_start();

    if let Some(params) = rest.strip_prefix('#') {
        let params = params.trim_start();
        let end = matching_paren(params).ok_or_else(|| invalid("unterminated parameter list"))?;
        rest = params[end + 1..].trim_start();
    }

    if rest.starts_with(';') {
        return Ok(ComponentInterface::new(module, Vec::new()));
    }
    if !rest.starts_with('(') {
        return Err(invalid("expected `(` after the module name"));
    }
    let end = matching_paren(rest).ok_or_else(|| invalid("unterminated port list"))?;
    let list = &rest[1..end];

    let mut ports = Vec::new();
    let mut current: Option<(Direction, u32)> = None;
    for item in list.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let mut tokens = tokenize(item).into_iter().peekable();

        if let Some(direction) = tokens.peek().and_then(|t| direction_keyword(t)) {
            tokens.next();
            let mut width = 1;
            while let Some(token) = tokens.peek() {
                if NET_KEYWORDS.contains(&token.as_str()) {
                    tokens.next();
                } else if token.starts_with('[') {
                    width = range_width(token).ok_or_else(|| {
                        invalid(&format!(
                            "range `{token}` is not a constant `[hi:lo]` of countable width"
                        ))
                    })?;
                    tokens.next();
                } else {
                    break;
                }
            }
            current = Some((direction, width));
        }

        let (direction, width) =
            current.ok_or_else(|| invalid("port list is not in ANSI style"))?;
        let name = tokens
            .next()
            .ok_or_else(|| invalid("port declaration without a name"))?;
        if !is_identifier(&name) {
            return Err(invalid(&format!("`{name}` is not a port name")));
        }
        if tokens.next().is_some() {
            return Err(invalid(&format!(
                "unsupported declaration after port `{name}`"
            )));
        }
        ports.push(ComponentPort::new(name, direction, width));
    }

    Ok(ComponentInterface::new(module, ports))
}

/// Removes `//`, `/* */` comments and `(* *)` attributes.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) | ('(', Some('*')) => {
                let close = if c == '/' { '/' } else { ')' };
                chars.next();
                // `(*)` in an event control is not an attribute.
                let mut prev = if c == '(' { '*' } else { ' ' };
                for c in chars.by_ref() {
                    if prev == '*' && c == close {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Returns the text following `module <name>`.
fn find_module<'a>(source: &'a str, module: &str) -> Option<&'a str> {
    let mut words = WordIter::new(source);
    while let Some((_, word)) = words.next() {
        if word == "module" || word == "macromodule" {
            if let Some((end, name)) = words.next() {
                if name == module {
                    return Some(&source[end..]);
                }
            }
        }
    }
    None
}

/// Iterates over identifier-like words, yielding the byte offset just past
/// each word along with the word.
struct WordIter<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> WordIter<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }
}

impl<'a> Iterator for WordIter<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();
        while self.pos < bytes.len() && !is_ident_byte(bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }
        let start = self.pos;
        while self.pos < bytes.len() && is_ident_byte(bytes[self.pos]) {
            self.pos += 1;
        }
        Some((self.pos, &self.source[start..self.pos]))
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(is_ident_byte)
}

/// Index of the `)` closing the `(` at the start of `s`.
fn matching_paren(s: &str) -> Option<usize> {
    if !s.starts_with('(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits a declaration into words and bracketed ranges.
fn tokenize(item: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = item.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '[' {
            let mut range = String::new();
            for c in chars.by_ref() {
                if !c.is_whitespace() {
                    range.push(c);
                }
                if c == ']' {
                    break;
                }
            }
            tokens.push(range);
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '[' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(word);
        }
    }
    tokens
}

fn direction_keyword(token: &str) -> Option<Direction> {
    match token {
        "input" => Some(Direction::Input),
        "output" => Some(Direction::Output),
        "inout" => Some(Direction::InOut),
        _ => None,
    }
}

/// Width of a constant `[hi:lo]` range. `None` for anything else, including
/// a range too wide to count in `u32`.
fn range_width(range: &str) -> Option<u32> {
    let inner = range.strip_prefix('[')?.strip_suffix(']')?;
    let (hi, lo) = inner.split_once(':')?;
    let hi: u32 = hi.parse().ok()?;
    let lo: u32 = lo.parse().ok()?;
    hi.abs_diff(lo).checked_add(1)
}
