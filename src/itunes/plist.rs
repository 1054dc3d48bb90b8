use roxmltree::{Document, Node, ParsingOptions};

use crate::itunes::error::LibraryParseError;

/// A decoded XML property list value.
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    String(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Date(String),
    Data(String),
    Array(Vec<PlistValue>),
    Dict(PlistDict),
}

/// A property list dictionary. Entries keep document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlistDict {
    entries: Vec<(String, PlistValue)>,
}

impl PlistDict {
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlistValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(PlistValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(PlistValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(PlistValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn dict(&self, key: &str) -> Option<&PlistDict> {
        match self.get(key) {
            Some(PlistValue::Dict(d)) => Some(d),
            _ => None,
        }
    }

    pub fn array(&self, key: &str) -> Option<&[PlistValue]> {
        match self.get(key) {
            Some(PlistValue::Array(a)) => Some(a),
            _ => None,
        }
    }
}

/// Parse an XML property list document and return its top level value.
pub fn parse_document(xml: &str) -> Result<PlistValue, LibraryParseError> {
    // Library exports carry a DOCTYPE declaration.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;

    let root = doc.root_element();
    if root.tag_name().name() != "plist" {
        return Err(LibraryParseError::UnexpectedElement(
            root.tag_name().name().to_string(),
        ));
    }

    let value = root
        .children()
        .find(Node::is_element)
        .ok_or(LibraryParseError::MissingKey("plist value"))?;

    parse_value(value)
}

fn parse_value(node: Node<'_, '_>) -> Result<PlistValue, LibraryParseError> {
    let text = || node.text().unwrap_or_default().to_string();

    match node.tag_name().name() {
        "string" => Ok(PlistValue::String(text())),
        "integer" => {
            let raw = text();
            raw.trim()
                .parse()
                .map(PlistValue::Integer)
                .map_err(|_| LibraryParseError::InvalidValue {
                    kind: "integer",
                    value: raw,
                })
        }
        "real" => {
            let raw = text();
            raw.trim()
                .parse()
                .map(PlistValue::Real)
                .map_err(|_| LibraryParseError::InvalidValue {
                    kind: "real",
                    value: raw,
                })
        }
        "true" => Ok(PlistValue::Bool(true)),
        "false" => Ok(PlistValue::Bool(false)),
        "date" => Ok(PlistValue::Date(text())),
        "data" => Ok(PlistValue::Data(text().split_whitespace().collect())),
        "array" => node
            .children()
            .filter(Node::is_element)
            .map(parse_value)
            .collect::<Result<Vec<_>, _>>()
            .map(PlistValue::Array),
        "dict" => parse_dict(node).map(PlistValue::Dict),
        other => Err(LibraryParseError::UnexpectedElement(other.to_string())),
    }
}

fn parse_dict(node: Node<'_, '_>) -> Result<PlistDict, LibraryParseError> {
    let mut entries = Vec::new();
    let mut children = node.children().filter(Node::is_element);

    while let Some(key_node) = children.next() {
        if key_node.tag_name().name() != "key" {
            return Err(LibraryParseError::UnexpectedElement(
                key_node.tag_name().name().to_string(),
            ));
        }
        let key = key_node.text().unwrap_or_default().to_string();
        let value_node = children
            .next()
            .ok_or_else(|| LibraryParseError::DanglingKey(key.clone()))?;
        entries.push((key, parse_value(value_node)?));
    }

    Ok(PlistDict { entries })
}
