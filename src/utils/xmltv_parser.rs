//! Quick-XML based XMLTV parser
//!
//! Streams through an XMLTV document and keeps only the `<programme>` fields
//! the grabber emits again.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use std::collections::HashMap;

use crate::errors::{FetchError, FetchResult};

/// Programme fields as they appear in the document, times still unparsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleXmltvProgram {
    pub channel: String,
    pub start: String,
    pub stop: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
}

/// Parse every `<programme>` element in `content`
pub fn parse_xmltv_programs(content: &str) -> FetchResult<Vec<SimpleXmltvProgram>> {
    let mut reader = Reader::from_str(content);

    let mut programs = Vec::new();
    let mut current_program: Option<SimpleXmltvProgram> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"programme" {
                    let attrs = parse_attributes(e);
                    current_program = Some(SimpleXmltvProgram {
                        channel: attrs.get("channel").cloned().unwrap_or_default(),
                        start: attrs.get("start").cloned().unwrap_or_default(),
                        stop: attrs.get("stop").cloned(),
                        ..SimpleXmltvProgram::default()
                    });
                }
                current_text.clear();
            }

            Ok(Event::End(ref e)) => {
                if let Some(ref mut program) = current_program {
                    let text = current_text.trim();
                    match e.name().as_ref() {
                        b"title" if !text.is_empty() && program.title.is_none() => {
                            program.title = Some(text.to_string());
                        }
                        b"desc" if !text.is_empty() && program.description.is_none() => {
                            program.description = Some(text.to_string());
                        }
                        b"category" if !text.is_empty() && program.category.is_none() => {
                            program.category = Some(text.to_string());
                        }
                        b"programme" => {
                            if let Some(program) = current_program.take() {
                                programs.push(program);
                            }
                        }
                        _ => {}
                    }
                }
                current_text.clear();
            }

            Ok(Event::Empty(ref e)) => {
                if let Some(ref mut program) = current_program {
                    if e.name().as_ref() == b"icon" {
                        if let Some(src) = parse_attributes(e).remove("src") {
                            program.icon = Some(src);
                        }
                    }
                }
            }

            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|e| FetchError::parse(format!("Invalid text in XMLTV: {e}")))?;
                current_text.push_str(&text);
            }

            Ok(Event::GeneralRef(e)) => {
                let text = resolve_entity(&e).map_err(FetchError::parse)?;
                current_text.push_str(&text);
            }

            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| FetchError::parse(format!("Invalid UTF-8 in CDATA: {e}")))?;
                current_text.push_str(text);
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(FetchError::parse(format!(
                    "XML parsing error at position {}: {e}",
                    reader.buffer_position()
                )));
            }

            _ => {}
        }
    }

    Ok(programs)
}

/// Resolve an entity reference (`&amp;`, `&#38;`) to the text it stands for
pub(crate) fn resolve_entity(entity: &BytesRef) -> Result<String, String> {
    if let Some(ch) = entity.resolve_char_ref().map_err(|e| e.to_string())? {
        return Ok(ch.to_string());
    }
    let name = entity.decode().map_err(|e| e.to_string())?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| format!("Unknown entity '&{name};'"))
}

/// Parse XML attributes into a map, unescaping values
pub(crate) fn parse_attributes(element: &BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();

    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(attr.key.as_ref()),
            attr.unescape_value(),
        ) {
            attrs.insert(key.to_string(), value.into_owned());
        }
    }
    attrs
}
