use std::io;
use std::io::ErrorKind;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A loosely typed XML element. Names keep their namespace prefix (`wp:status`),
/// which is how both export formats are addressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart) -> io::Result<XmlElement> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let mut attrs = vec![];
        for attr in start.attributes() {
            let attr = attr.map_err(|e| invalid_data(format!("Invalid attribute in <{}>: {}", name, e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value()
                .map_err(|e| invalid_data(format!("Invalid value for attribute {} in <{}>: {}", key, name, e)))?;
            attrs.push((key, value.into_owned()));
        }

        Ok(XmlElement {
            name,
            attrs,
            children: vec![],
            text: String::new(),
        })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item=&'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Text of the first child with the given name, if that child exists
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Follows a path of child names, e.g. `["channel", "item"]`, taking the first match at each step
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        let mut cur = self;
        for name in path {
            cur = cur.child(name)?;
        }
        Some(cur)
    }
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, msg)
}

/// Reads a whole document into a tree and returns the root element.
pub fn parse_document(content: &str) -> io::Result<XmlElement> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut stack: Vec<XmlElement> = vec![];
    let mut root: Option<XmlElement> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(invalid_data(format!("Error parsing XML at position {}: {}", reader.error_position(), e)));
            }
        };

        match event {
            Event::Start(start) => {
                stack.push(XmlElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => set_root(&mut root, element)?,
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(invalid_data(format!("Unexpected closing tag at position {}", reader.buffer_position())));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => set_root(&mut root, element)?,
                }
            }
            Event::Text(text) => {
                if let Some(cur) = stack.last_mut() {
                    let text = text.unescape()
                        .map_err(|e| invalid_data(format!("Invalid text in <{}>: {}", cur.name, e)))?;
                    cur.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(cur) = stack.last_mut() {
                    cur.text.push_str(&String::from_utf8_lossy(data.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(invalid_data(format!("Element <{}> is never closed", open.name)));
    }

    root.ok_or_else(|| invalid_data("Document has no root element".to_string()))
}

fn set_root(root: &mut Option<XmlElement>, element: XmlElement) -> io::Result<()> {
    if root.is_some() {
        return Err(invalid_data(format!("Unexpected second root element <{}>", element.name)));
    }
    *root = Some(element);
    Ok(())
}
