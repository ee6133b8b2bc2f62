//! Expands channel declarations into the task queue of one run

use chrono::Days;
use tracing::{debug, info, warn};

use super::task_queue::TaskQueue;
use super::types::{FetchTask, TaskKey};
use crate::catalog::ChannelCatalog;
use crate::config::RunOptions;
use crate::config::defaults::DEFAULT_DAYS;
use crate::models::{Channel, ChannelDeclaration};
use crate::sites::SiteRegistry;

/// Builds a [`TaskQueue`] from declarations, the site registry and the
/// channel catalog. Deterministic for a fixed reference date.
pub struct QueueBuilder<'a> {
    registry: &'a SiteRegistry,
    catalog: &'a dyn ChannelCatalog,
    options: &'a RunOptions,
}

impl<'a> QueueBuilder<'a> {
    pub fn new(
        registry: &'a SiteRegistry,
        catalog: &'a dyn ChannelCatalog,
        options: &'a RunOptions,
    ) -> Self {
        Self {
            registry,
            catalog,
            options,
        }
    }

    /// Build the queue, processing declarations in order
    pub fn build(&self, declarations: &[ChannelDeclaration]) -> TaskQueue {
        let reference_date = self.options.reference_date();
        let mut queue = TaskQueue::new();
        let mut malformed = 0usize;
        let mut filtered = 0usize;
        let mut unresolved = 0usize;

        for declaration in declarations {
            let (Some(site), Some(site_id), Some(name)) = (
                declaration.site.as_deref(),
                declaration.site_id.as_deref(),
                declaration.name.as_deref(),
            ) else {
                malformed += 1;
                continue;
            };

            let lang = declaration.lang.clone().unwrap_or_default();
            if let Some(wanted) = self.options.lang.as_deref() {
                if lang != wanted {
                    filtered += 1;
                    continue;
                }
            }

            let adapter = match self.registry.resolve(site) {
                Ok(adapter) => adapter,
                Err(e) => {
                    warn!("{}: skipping channel '{}' ({})", e, name, site_id);
                    unresolved += 1;
                    continue;
                }
            };
            let config = adapter.config();

            let channel = self.reconcile(declaration, site, site_id, name, lang);
            // Zero counts as unset, at either level
            let days = self
                .options
                .days
                .filter(|d| *d > 0)
                .or(config.days.filter(|d| *d > 0))
                .unwrap_or(DEFAULT_DAYS);

            for day in 0..days {
                let Some(date) = reference_date.checked_add_days(Days::new(u64::from(day))) else {
                    break;
                };
                let key = TaskKey::for_channel(&channel, date);
                if queue.missing(&key) {
                    let task = FetchTask::new(channel.clone(), date, config.clone(), adapter.clone());
                    queue.put(key, task);
                } else {
                    debug!("Skipping duplicate task: {}", key);
                }
            }
        }

        if malformed > 0 {
            debug!("Dropped {} malformed channel declaration(s)", malformed);
        }
        if filtered > 0 {
            debug!("Skipped {} channel(s) not matching the language filter", filtered);
        }
        info!(
            "Queued {} task(s) from {} declaration(s) starting {} ({} unresolved)",
            queue.size(),
            declarations.len(),
            reference_date,
            unresolved
        );
        queue
    }

    /// Resolve the channel identity: a declared cross-reference id found in
    /// the catalog takes the catalog's name and logo, a missing one falls back
    /// to the site-local id.
    fn reconcile(
        &self,
        declaration: &ChannelDeclaration,
        site: &str,
        site_id: &str,
        name: &str,
        lang: String,
    ) -> Channel {
        let mut channel = Channel {
            site: site.to_string(),
            site_id: site_id.to_string(),
            xmltv_id: site_id.to_string(),
            name: name.to_string(),
            lang,
            logo: declaration.logo.clone(),
        };

        if let Some(xmltv_id) = declaration.xmltv_id.as_deref() {
            channel.xmltv_id = xmltv_id.to_string();
            if let Some(entry) = self.catalog.lookup(xmltv_id) {
                channel.name = entry.name;
                channel.logo = entry.logo;
            }
        }
        channel
    }
}
