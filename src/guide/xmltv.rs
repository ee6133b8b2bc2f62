//! XMLTV and channels.xml rendering
//!
//! Output depends only on the guide contents: same input, same bytes.

use quick_xml::escape::escape;

use super::Guide;
use crate::models::Channel;
use crate::utils::time::format_xmltv_datetime;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

fn lang_attr(lang: &str) -> String {
    if lang.is_empty() {
        String::new()
    } else {
        format!(" lang=\"{}\"", escape(lang))
    }
}

/// Render the guide as an XMLTV document
pub fn render_xmltv(guide: &Guide) -> String {
    let mut xmltv = String::from(XML_HEADER);
    xmltv.push_str(&format!("<tv date=\"{}\">\n", guide.date.format("%Y%m%d")));

    for channel in &guide.channels {
        let lang = lang_attr(&channel.lang);
        let mut line = format!("  <channel id=\"{}\">", escape(&channel.xmltv_id));
        line.push_str(&format!(
            "<display-name{}>{}</display-name>",
            lang,
            escape(&channel.name)
        ));
        if let Some(logo) = &channel.logo {
            line.push_str(&format!("<icon src=\"{}\"/>", escape(logo)));
        }
        line.push_str(&format!("<url>https://{}</url>", escape(&channel.site)));
        line.push_str("</channel>\n");
        xmltv.push_str(&line);
    }

    for program in &guide.programs {
        let lang = lang_attr(&program.lang);
        let mut line = format!(
            "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">",
            format_xmltv_datetime(&program.start),
            format_xmltv_datetime(&program.stop),
            escape(&program.channel)
        );
        line.push_str(&format!("<title{}>{}</title>", lang, escape(&program.title)));
        if let Some(description) = &program.description {
            line.push_str(&format!("<desc{}>{}</desc>", lang, escape(description)));
        }
        if let Some(category) = &program.category {
            line.push_str(&format!("<category{}>{}</category>", lang, escape(category)));
        }
        if let Some(icon) = &program.icon {
            line.push_str(&format!("<icon src=\"{}\"/>", escape(icon)));
        }
        line.push_str("</programme>\n");
        xmltv.push_str(&line);
    }

    xmltv.push_str("</tv>\n");
    xmltv
}

/// Render channels in the `*.channels.xml` declaration format
pub fn render_channels_xml(channels: &[Channel]) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str("<channels>\n");
    for channel in channels {
        xml.push_str(&format!(
            "  <channel site=\"{}\" lang=\"{}\" xmltv_id=\"{}\" site_id=\"{}\"",
            escape(&channel.site),
            escape(&channel.lang),
            escape(&channel.xmltv_id),
            escape(&channel.site_id)
        ));
        if let Some(logo) = &channel.logo {
            xml.push_str(&format!(" logo=\"{}\"", escape(logo)));
        }
        xml.push_str(&format!(">{}</channel>\n", escape(&channel.name)));
    }
    xml.push_str("</channels>\n");
    xml
}
