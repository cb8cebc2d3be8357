use serde::{Deserialize, Serialize};

use crate::{provider::ContentProvider, Result};

use super::article::{ArticleSummary, PageResult, PageToken};

/// All article summaries loaded so far in one viewing session.
///
/// Items are only ever appended. Overlapping provider pages are kept as-is, so
/// an id may repeat if the provider returns it twice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedListing {
    pub items: Vec<ArticleSummary>,
    pub next_page_token: Option<PageToken>,
}

impl AccumulatedListing {
    pub fn initialize(seed: PageResult) -> Self {
        Self {
            items: seed.items,
            next_page_token: seed.next_page_token,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_page_token.is_none()
    }

    /// Appends a fetched page and takes over its token.
    pub fn append(mut self, fetched: PageResult) -> Self {
        self.items.extend(fetched.items);
        self.next_page_token = fetched.next_page_token;
        self
    }
}

/// Fetches the page after `current` and returns the merged listing.
///
/// `current` is left untouched, so a failed fetch leaves the caller with its
/// previous state. Calling this on an exhausted listing is a caller error and
/// returns `current` unchanged without contacting the provider.
pub async fn load_more<P>(current: &AccumulatedListing, provider: &P) -> Result<AccumulatedListing>
where
    P: ContentProvider + ?Sized,
{
    let Some(token) = &current.next_page_token else {
        tracing::warn!("Load more requested on an exhausted listing.");
        return Ok(current.clone());
    };

    tracing::debug!("Loading page '{}'.", token);
    let fetched = provider.fetch_page(token).await?;
    tracing::debug!(
        "Loaded {} items, listing has {} now.",
        fetched.items.len(),
        current.items.len() + fetched.items.len()
    );

    Ok(current.clone().append(fetched))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState {
    Empty,
    Loaded,
    Exhausted,
}

/// Listing owned by a single view, guarding against overlapping loads.
///
/// A load is split into [`ListingSession::begin_load_more`], which disables
/// the trigger and hands out the token, and [`ListingSession::finish_load_more`],
/// which applies the fetched page. Results arriving after
/// [`ListingSession::unmount`] are dropped.
#[derive(Debug, Default)]
pub struct ListingSession {
    listing: Option<AccumulatedListing>,
    pending: bool,
    unmounted: bool,
}

impl ListingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, seed: PageResult) {
        if self.listing.is_some() {
            tracing::warn!("Listing initialized twice, replacing previous state.");
        }

        self.listing = Some(AccumulatedListing::initialize(seed));
        self.pending = false;
        self.unmounted = false;
    }

    pub fn state(&self) -> ListingState {
        match &self.listing {
            None => ListingState::Empty,
            Some(listing) if listing.is_exhausted() => ListingState::Exhausted,
            Some(_) => ListingState::Loaded,
        }
    }

    pub fn listing(&self) -> Option<&AccumulatedListing> {
        self.listing.as_ref()
    }

    pub fn into_listing(self) -> Option<AccumulatedListing> {
        self.listing
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Whether the "load more" trigger should be enabled.
    pub fn can_load_more(&self) -> bool {
        !self.pending && !self.unmounted && self.state() == ListingState::Loaded
    }

    /// Items appended after the first `already_shown` ones.
    pub fn appended_since(&self, already_shown: usize) -> &[ArticleSummary] {
        match &self.listing {
            Some(listing) => listing.items.get(already_shown..).unwrap_or_default(),
            None => &[],
        }
    }

    pub fn begin_load_more(&mut self) -> Option<PageToken> {
        if !self.can_load_more() {
            return None;
        }

        let token = self.listing.as_ref()?.next_page_token.clone()?;
        self.pending = true;
        Some(token)
    }

    /// Applies the outcome of a fetch started with [`ListingSession::begin_load_more`].
    ///
    /// On failure the listing is unchanged and the error is handed back so the
    /// caller can report it; the trigger is enabled again for a retry.
    /// Completions without a pending load are ignored.
    pub fn finish_load_more(&mut self, fetched: Result<PageResult>) -> Result<()> {
        if !self.pending {
            tracing::warn!("Ignoring a load completion with no load pending.");
            return Ok(());
        }
        self.pending = false;

        if self.unmounted {
            tracing::trace!("Discarding page fetched after the listing was unmounted.");
            return Ok(());
        }

        let page = fetched?;
        if let Some(listing) = self.listing.take() {
            self.listing = Some(listing.append(page));
        }

        Ok(())
    }

    /// Loads the next page inline. Returns `false` when no load was started.
    ///
    /// The session is only touched once the fetch succeeded, so dropping the
    /// returned future mid-fetch leaves it as it was.
    pub async fn load_more<P>(&mut self, provider: &P) -> Result<bool>
    where
        P: ContentProvider + ?Sized,
    {
        if !self.can_load_more() {
            return Ok(false);
        }
        let Some(token) = self
            .listing
            .as_ref()
            .and_then(|listing| listing.next_page_token.clone())
        else {
            return Ok(false);
        };

        let page = provider.fetch_page(&token).await?;
        if let Some(listing) = self.listing.take() {
            self.listing = Some(listing.append(page));
        }
        Ok(true)
    }

    pub fn unmount(&mut self) {
        self.unmounted = true;
        self.listing = None;
    }
}
