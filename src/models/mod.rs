use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A channel entry as read from a `*.channels.xml` file.
///
/// Every field is optional because the files are community-maintained; the
/// queue builder drops entries that lack a site, site id or name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDeclaration {
    pub site: Option<String>,
    pub site_id: Option<String>,
    pub xmltv_id: Option<String>,
    pub name: Option<String>,
    pub lang: Option<String>,
    pub logo: Option<String>,
}

impl ChannelDeclaration {
    /// Create a declaration with the three required fields set
    pub fn new<S, I, N>(site: S, site_id: I, name: N) -> Self
    where
        S: Into<String>,
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            site: Some(site.into()),
            site_id: Some(site_id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_lang<S: Into<String>>(mut self, lang: S) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_xmltv_id<S: Into<String>>(mut self, xmltv_id: S) -> Self {
        self.xmltv_id = Some(xmltv_id.into());
        self
    }

    pub fn with_logo<S: Into<String>>(mut self, logo: S) -> Self {
        self.logo = Some(logo.into());
        self
    }
}

/// A resolved channel, ready to be grabbed.
///
/// `xmltv_id` is always set: it is either the declared cross-reference id or
/// the site-local id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub site: String,
    pub site_id: String,
    pub xmltv_id: String,
    pub name: String,
    pub lang: String,
    pub logo: Option<String>,
}

impl Channel {
    /// Identity used to collapse repeated additions of the same channel
    pub fn identity(&self) -> (&str, &str, &str, &str) {
        (&self.site, &self.site_id, &self.lang, &self.xmltv_id)
    }
}

/// One program as reported by a site adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Cross-reference id of the owning channel
    pub channel: String,
    pub site: String,
    pub lang: String,
    pub start: DateTime<FixedOffset>,
    pub stop: DateTime<FixedOffset>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
}

impl Program {
    /// Create a program bound to `channel`
    pub fn new<S: Into<String>>(
        channel: &Channel,
        start: DateTime<FixedOffset>,
        stop: DateTime<FixedOffset>,
        title: S,
    ) -> Self {
        Self {
            channel: channel.xmltv_id.clone(),
            site: channel.site.clone(),
            lang: channel.lang.clone(),
            start,
            stop,
            title: title.into(),
            description: None,
            category: None,
            icon: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }
}
