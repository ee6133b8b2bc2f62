//! `*.channels.xml` parser
//!
//! ```xml
//! <channels>
//!   <channel site="dummy.ca" lang="en" xmltv_id="Channel1.ca" site_id="channel1">Dummy Channel 1</channel>
//! </channels>
//! ```

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::errors::{AppError, AppResult};
use crate::models::ChannelDeclaration;
use crate::utils::xmltv_parser::{parse_attributes, resolve_entity};

/// Parse channel declarations. Empty attributes are read as absent; the
/// queue builder decides what to do with incomplete entries.
pub fn parse_channels_xml(content: &str, origin: &str) -> AppResult<Vec<ChannelDeclaration>> {
    let mut reader = Reader::from_str(content);

    let mut declarations = Vec::new();
    let mut current: Option<ChannelDeclaration> = None;
    let mut name = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"channel" => {
                current = Some(declaration_from_attributes(e));
                name.clear();
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"channel" => {
                declarations.push(declaration_from_attributes(e));
            }
            Ok(Event::Text(e)) if current.is_some() => {
                let text = e.decode().map_err(|e| AppError::xml(origin, e.to_string()))?;
                name.push_str(&text);
            }
            Ok(Event::GeneralRef(e)) if current.is_some() => {
                let text = resolve_entity(&e).map_err(|message| AppError::xml(origin, message))?;
                name.push_str(&text);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"channel" => {
                if let Some(mut declaration) = current.take() {
                    declaration.name = non_empty(name.trim());
                    declarations.push(declaration);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::xml(
                    origin,
                    format!("at position {}: {e}", reader.buffer_position()),
                ));
            }
            _ => {}
        }
    }

    Ok(declarations)
}

fn declaration_from_attributes(element: &quick_xml::events::BytesStart) -> ChannelDeclaration {
    let mut attrs = parse_attributes(element);
    let mut take = |key: &str| attrs.remove(key).and_then(|v| non_empty(v.trim()));
    ChannelDeclaration {
        site: take("site"),
        site_id: take("site_id"),
        xmltv_id: take("xmltv_id"),
        lang: take("lang"),
        logo: take("logo"),
        name: None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
