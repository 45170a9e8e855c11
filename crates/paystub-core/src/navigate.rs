//! The view-state walk: years → statements → download → back to browse.
//!
//! The portal has no addressable URLs below the listing page. Every view
//! transition is a POST of the previous page's hidden-form snapshot plus
//! one overlaid selector key, and the server tracks which view the session
//! is in. Getting the cycle wrong (submitting a stale snapshot, or not
//! returning to the browse view before selecting the next year) desyncs
//! the session silently and the portal starts rendering the wrong view.
//!
//! Generic over [`Transport`] and [`StatementStore`] via traits, enabling
//! dependency injection and testability without a live portal.

use crate::config::PortalConfig;
use crate::error::AppError;
use crate::page::{self, DONE_FIELD};
use crate::traits::{StatementStore, Transport};

/// Counters for one full navigation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub downloaded: usize,
    pub skipped: usize,
}

/// Drives the navigation state machine over an authenticated transport.
pub struct Navigator<T, S>
where
    T: Transport,
    S: StatementStore,
{
    transport: T,
    store: S,
    config: PortalConfig,
}

impl<T, S> Navigator<T, S>
where
    T: Transport,
    S: StatementStore,
{
    pub fn new(transport: T, store: S, config: PortalConfig) -> Self {
        Self {
            transport,
            store,
            config,
        }
    }

    /// Walk every year, most recent first, downloading each statement not
    /// already present in the store.
    ///
    /// For each year: select it from the current browse page, walk its
    /// statements newest-first, then submit the done marker to return to
    /// the browse view, which becomes the base page for the next year.
    /// Every submitted snapshot is captured from the page immediately
    /// preceding the submission, never replayed across more than one step.
    pub async fn run(&self) -> Result<RunReport, AppError> {
        let listing_url = self.config.listing_url.as_str();
        let mut report = RunReport::default();

        let mut browse_page = self.transport.get(listing_url).await?;
        let mut years = page::extract_years(&browse_page);
        // most recent first; stable sort keeps page order on equal labels
        years.sort_by(|a, b| b.label.cmp(&a.label));
        tracing::info!(count = years.len(), "years available");

        for year in &years {
            tracing::info!(year = %year.label, "processing year");
            let select = page::extract_form_snapshot(&browse_page)?
                .with_field(&year.selector_id, &year.selector_id);
            let documents_page = self.transport.post_form(listing_url, &select).await?;

            let mut documents = page::extract_documents(&documents_page)?;
            documents.sort_by(|a, b| b.date_key.cmp(&a.date_key));
            tracing::info!(
                count = documents.len(),
                year = %year.label,
                "statements found"
            );

            for document in &documents {
                let file_name = document.file_name();
                if self.store.contains(&file_name) {
                    tracing::info!(file = %file_name, "already downloaded, skipping");
                    report.skipped += 1;
                    continue;
                }

                // snapshot the documents page, not the browse page:
                // form state is page-local
                let select = page::extract_form_snapshot(&documents_page)?
                    .with_field(&document.selector_id, &document.selector_id);
                let viewer_page = self.transport.post_form(listing_url, &select).await?;

                let src = page::extract_frame_src(&viewer_page)?;
                let download_url = self.config.host.join(&src).map_err(|e| {
                    AppError::PageStructureError(format!(
                        "frame src '{src}' does not resolve against portal host: {e}"
                    ))
                })?;

                tracing::info!(url = %download_url, file = %file_name, "downloading");
                let bytes = self.transport.get_bytes(download_url.as_str()).await?;
                let path = self.store.write(&file_name, &bytes)?;
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "written");
                report.downloaded += 1;
            }

            // return to the browse view so the next year's selection lands
            let done = page::extract_form_snapshot(&documents_page)?
                .with_field(DONE_FIELD, DONE_FIELD);
            browse_page = self.transport.post_form(listing_url, &done).await?;
        }

        Ok(report)
    }
}
