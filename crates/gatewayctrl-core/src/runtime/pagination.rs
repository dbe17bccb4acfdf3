// crates/gatewayctrl-core/src/runtime/pagination.rs
// ============================================================================
// Module: API Listing Stream
// Description: Lazy iterator that drains vendor pagination on demand.
// Purpose: Bound memory and page count for large API catalogs.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`ApiStream`] pulls pages from a [`PageSource`] only as items are consumed.
//! The first page is fetched on the first call to `next`, so building a stream
//! performs no I/O. A traversal stops at the first error, after `max_pages`
//! pages, or when a vendor hands back a cursor it already returned; the latter
//! two surface as [`GatewayError::UnexpectedResponse`] rather than looping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::collections::VecDeque;
use std::fmt;

use crate::core::NormalizedApi;
use crate::core::PageCursor;
use crate::interfaces::ApiPage;
use crate::interfaces::GatewayError;
use crate::interfaces::PageSource;

// ============================================================================
// SECTION: Closure Source
// ============================================================================

/// Adapts a closure into a [`PageSource`].
struct FnSource<F> {
    /// Page fetch closure.
    fetch: F,
}

impl<F> PageSource for FnSource<F>
where
    F: FnMut(Option<&PageCursor>) -> Result<ApiPage, GatewayError>,
{
    fn fetch_page(&mut self, cursor: Option<&PageCursor>) -> Result<ApiPage, GatewayError> {
        (self.fetch)(cursor)
    }
}

// ============================================================================
// SECTION: Api Stream
// ============================================================================

/// Lazy, bounded iterator over the APIs of one gateway.
///
/// # Invariants
/// - At most `max_pages` pages are fetched.
/// - No cursor is followed twice.
/// - After an error is yielded the stream is exhausted.
pub struct ApiStream<'a> {
    /// Page source; `None` for streams built from a fixed outcome.
    source: Option<Box<dyn PageSource + 'a>>,
    /// Items fetched but not yet yielded.
    buffer: VecDeque<NormalizedApi>,
    /// Cursor for the next fetch.
    cursor: Option<PageCursor>,
    /// Cursors already followed.
    seen: HashSet<PageCursor>,
    /// Error to yield once the buffer drains.
    pending_error: Option<GatewayError>,
    /// Pages fetched so far.
    pages: usize,
    /// Page limit.
    max_pages: usize,
    /// Whether the first page has been requested.
    started: bool,
    /// Whether the traversal has ended.
    finished: bool,
}

impl<'a> ApiStream<'a> {
    /// Creates a stream over a page source.
    #[must_use]
    pub fn new(source: impl PageSource + 'a, max_pages: usize) -> Self {
        Self {
            source: Some(Box::new(source)),
            buffer: VecDeque::new(),
            cursor: None,
            seen: HashSet::new(),
            pending_error: None,
            pages: 0,
            max_pages: max_pages.max(1),
            started: false,
            finished: false,
        }
    }

    /// Creates a stream over a page fetch closure.
    #[must_use]
    pub fn from_fn<F>(fetch: F, max_pages: usize) -> Self
    where
        F: FnMut(Option<&PageCursor>) -> Result<ApiPage, GatewayError> + 'a,
    {
        Self::new(
            FnSource {
                fetch,
            },
            max_pages,
        )
    }

    /// Creates a stream that yields a single error.
    #[must_use]
    pub fn from_error(error: GatewayError) -> Self {
        Self {
            source: None,
            buffer: VecDeque::new(),
            cursor: None,
            seen: HashSet::new(),
            pending_error: Some(error),
            pages: 0,
            max_pages: 1,
            started: true,
            finished: false,
        }
    }

    /// Returns the number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Drains the stream, failing on the first error.
    ///
    /// # Errors
    ///
    /// Returns the first [`GatewayError`] the traversal produced.
    pub fn try_collect(self) -> Result<Vec<NormalizedApi>, GatewayError> {
        self.collect()
    }

    /// Fetches the next page into the buffer.
    fn fetch_next(&mut self) {
        if self.started && self.cursor.is_none() {
            self.finished = true;
            return;
        }
        if self.pages >= self.max_pages {
            self.pending_error = Some(GatewayError::unexpected(format!(
                "pagination exceeded {} pages",
                self.max_pages
            )));
            return;
        }
        let Some(source) = self.source.as_mut() else {
            self.finished = true;
            return;
        };
        let cursor = self.cursor.take();
        self.started = true;
        match source.fetch_page(cursor.as_ref()) {
            Ok(page) => {
                self.pages += 1;
                self.buffer.extend(page.items);
                if let Some(next) = page.next {
                    if self.seen.insert(next.clone()) {
                        self.cursor = Some(next);
                    } else {
                        self.pending_error = Some(GatewayError::unexpected(format!(
                            "vendor repeated pagination cursor {next}"
                        )));
                    }
                }
            }
            Err(err) => self.pending_error = Some(err),
        }
    }
}

impl Iterator for ApiStream<'_> {
    type Item = Result<NormalizedApi, GatewayError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.finished {
                return None;
            }
            if let Some(err) = self.pending_error.take() {
                self.finished = true;
                return Some(Err(err));
            }
            self.fetch_next();
        }
    }
}

impl fmt::Debug for ApiStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiStream")
            .field("pages", &self.pages)
            .field("max_pages", &self.max_pages)
            .field("buffered", &self.buffer.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
