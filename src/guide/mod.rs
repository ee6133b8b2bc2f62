//! Guide assembly and output

pub mod writer;
pub mod xmltv;

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

use crate::config::RunOptions;
use crate::ingestor::GrabOutcome;
use crate::models::{Channel, Program};

pub use writer::{GuideWriter, WrittenGuide};

/// The merged result of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guide {
    /// Reference date of the run, emitted as `<tv date>`
    pub date: NaiveDate,
    pub channels: Vec<Channel>,
    pub programs: Vec<Program>,
}

impl Guide {
    pub fn to_xmltv(&self) -> String {
        xmltv::render_xmltv(self)
    }

    pub fn to_channels_xml(&self) -> String {
        xmltv::render_channels_xml(&self.channels)
    }
}

/// Turns a grab outcome into a [`Guide`]
#[derive(Debug, Clone)]
pub struct GuideAssembler {
    lang: Option<String>,
    date: NaiveDate,
}

impl GuideAssembler {
    pub fn new(options: &RunOptions) -> Self {
        Self {
            lang: options.lang.clone(),
            date: options.reference_date(),
        }
    }

    /// Re-apply the language filter and collapse repeated channels, keeping
    /// the first occurrence and the incoming order
    pub fn assemble(&self, outcome: GrabOutcome) -> Guide {
        let keep_lang = |lang: &str| self.lang.as_deref().is_none_or(|wanted| wanted == lang);

        let mut duplicates = 0usize;
        let mut keep = Vec::with_capacity(outcome.channels.len());
        {
            let mut seen = HashSet::new();
            for channel in &outcome.channels {
                let wanted = keep_lang(&channel.lang);
                let fresh = wanted && seen.insert(channel.identity());
                if wanted && !fresh {
                    duplicates += 1;
                }
                keep.push(fresh);
            }
        }
        let channels: Vec<Channel> = outcome
            .channels
            .into_iter()
            .zip(keep)
            .filter_map(|(channel, fresh)| fresh.then_some(channel))
            .collect();

        let programs: Vec<Program> = outcome
            .programs
            .into_iter()
            .filter(|program| keep_lang(&program.lang))
            .collect();

        debug!(
            "Assembled guide: {} channel(s) ({} duplicate(s) collapsed), {} program(s)",
            channels.len(),
            duplicates,
            programs.len()
        );

        Guide {
            date: self.date,
            channels,
            programs,
        }
    }
}
