//! Incremental retrieval of question pages.
//!
//! [`Paginator`] owns every item fetched in the session and decides when a
//! new page may be requested. Fetching is split in two so the UI loop never
//! awaits: [`Paginator::begin_fetch`] hands out a [`PageRequest`] and flips the
//! in-flight guard, [`Paginator::complete`] folds the result back in. Callers
//! that can await use [`Paginator::fetch_next_page`] which does both.

use crate::api::QuestionSource;
use crate::error::FetchError;
use crate::models::{QuestionItem, QuestionsPage};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Loaded,
    /// Terminal. No request is handed out after this.
    Exhausted,
    /// Last fetch failed; holds the inline message. Items are untouched.
    Errored(String),
}

/// Ticket for the one outstanding fetch. Results are only accepted for the
/// ticket that is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Nothing was requested: already loading, exhausted or torn down.
    Skipped,
    /// The page was accepted; holds how many items were appended.
    Appended(usize),
    Failed,
    /// Stale or post-teardown result, dropped without touching state.
    Discarded,
}

#[derive(Debug)]
pub struct Paginator {
    page: u32,
    page_size: u32,
    max_items: usize,
    items: Vec<QuestionItem>,
    status: FetchStatus,
    in_flight: Option<PageRequest>,
    next_seq: u64,
    mounted: bool,
    torn_down: bool,
}

impl Paginator {
    pub fn new(page_size: u32, max_items: usize) -> Self {
        Self {
            page: 1,
            page_size,
            max_items,
            items: Vec::new(),
            status: FetchStatus::Idle,
            in_flight: None,
            next_seq: 0,
            mounted: false,
            torn_down: false,
        }
    }

    pub fn items(&self) -> &[QuestionItem] {
        &self.items
    }

    /// Page number the next request will ask for.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.status == FetchStatus::Exhausted
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Errored(msg) => Some(msg),
            _ => None,
        }
    }

    /// The initial load. Only the first call hands out a request.
    pub fn mount(&mut self) -> Option<PageRequest> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        self.begin_fetch()
    }

    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if self.torn_down || self.in_flight.is_some() || self.is_exhausted() {
            debug!(
                page = self.page,
                loading = self.in_flight.is_some(),
                exhausted = self.is_exhausted(),
                "fetch trigger ignored"
            );
            return None;
        }

        let request = PageRequest {
            page: self.page,
            page_size: self.page_size,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.in_flight = Some(request);
        self.status = FetchStatus::Loading;
        Some(request)
    }

    pub fn complete(
        &mut self,
        request: PageRequest,
        result: Result<QuestionsPage, FetchError>,
    ) -> Completion {
        if self.torn_down || self.in_flight != Some(request) {
            debug!(page = request.page, "discarding result for stale request");
            return Completion::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(page) => self.accept(page),
            Err(err) => {
                warn!(page = request.page, error = %err, "failed to fetch questions");
                self.status = FetchStatus::Errored(err.user_message());
                Completion::Failed
            }
        }
    }

    fn accept(&mut self, page: QuestionsPage) -> Completion {
        if page.items.is_empty() {
            info!(page = self.page, "empty page, no more questions");
            self.status = FetchStatus::Exhausted;
            return Completion::Appended(0);
        }

        let has_more = page.has_more();
        let count = page.items.len();
        self.items.extend(page.items);
        self.page += 1;

        if !has_more {
            info!(total = self.items.len(), "source reports no more questions");
            self.status = FetchStatus::Exhausted;
        } else if self.items.len() >= self.max_items {
            info!(
                total = self.items.len(),
                cap = self.max_items,
                "item cap reached, no more questions"
            );
            self.status = FetchStatus::Exhausted;
        } else {
            self.status = FetchStatus::Loaded;
        }
        Completion::Appended(count)
    }

    pub async fn fetch_next_page(&mut self, source: &dyn QuestionSource) -> Completion {
        let Some(request) = self.begin_fetch() else {
            return Completion::Skipped;
        };
        let result = source.fetch_page(request.page, request.page_size).await;
        self.complete(request, result)
    }

    /// Any result still on its way is dropped on arrival.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
    }
}
