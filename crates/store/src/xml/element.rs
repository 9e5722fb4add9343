//! Generic element tree read from quick-xml events

use crate::error::{Result, StoreError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One XML element with its attributes in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated text content, trimmed
    pub text: String,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Tag comparison ignoring ASCII case
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Attribute lookup ignoring ASCII case
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(tag))
    }

    /// Parse a complete document and return its root element
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position() as u64;
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    stack.push(Self::from_start(&e, position)?);
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::from_start(&e, position)?;
                    Self::close(&mut stack, &mut root, element, position)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| syntax(position, "unexpected end tag"))?;
                    Self::close(&mut stack, &mut root, element, position)?;
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| syntax(position, &e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(t)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(syntax(reader.error_position() as u64, &e.to_string())),
            }
        }

        if !stack.is_empty() {
            return Err(syntax(reader.buffer_position() as u64, "unexpected end of document"));
        }
        root.ok_or_else(|| syntax(0, "document has no root element"))
    }

    fn from_start(start: &BytesStart<'_>, position: u64) -> Result<XmlElement> {
        let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| syntax(position, &e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| syntax(position, &e.to_string()))?
                .to_string();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn close(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
        position: u64,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(syntax(position, "multiple root elements")),
        }
        Ok(())
    }
}

fn syntax(position: u64, message: &str) -> StoreError {
    StoreError::MalformedDocument {
        path: format!("byte {}", position),
        message: message.to_string(),
    }
}
