//! Owner of the comment list: fetching, paging and post-submit refresh.
//!
//! The held [`CommentPage`] is an immutable snapshot that is swapped as a whole
//! when a response is accepted. Every request is stamped with a sequence number
//! and only the most recently issued one may touch the state, so a slow earlier
//! response can never overwrite a newer page.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::api::{CommentApi, CommentQuery};
use crate::error::{ApiError, FormError, LIST_LOAD_FAILED};
use crate::form::{self, FormFields, FormMode};
use crate::identity::{AnonymousIdentity, IdentityStore};
use crate::model::{CommentCoordinates, CommentPage, ListResult};
use crate::pagination::PageStrip;
use crate::session::SessionContext;

pub const COMMENT_POSTED: &str = "Comment posted";

/// Host hook used to bring the widget back into view after paging.
pub trait Viewport {
    fn scroll_to_top(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopViewport;

impl Viewport for NoopViewport {
    fn scroll_to_top(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the held page.
    Applied,
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
    Failed(ApiError),
    /// Nothing was requested.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted,
    Invalid(FormError),
    Failed(ApiError),
}

impl SubmitOutcome {
    pub fn is_posted(&self) -> bool { matches!(self, Self::Posted) }
}

#[derive(Debug)]
struct ListState {
    page: Rc<CommentPage>,
    phase: Phase,
    issued: u64,
    pending: Option<u64>,
    /// Page asked for by the latest request; cleared when that request settles.
    requested: Option<u32>,
}

impl ListState {
    /// The page the list is heading to: the in-flight target, else the held one.
    fn target_page(&self) -> u32 { self.requested.unwrap_or(self.page.page) }
}

type ChangeListener = Rc<dyn Fn()>;

pub struct CommentListController {
    coordinates: CommentCoordinates,
    api: Rc<dyn CommentApi>,
    session: SessionContext,
    identity: Rc<IdentityStore>,
    viewport: Rc<dyn Viewport>,
    state: RefCell<ListState>,
    listeners: RefCell<Vec<ChangeListener>>,
}

impl fmt::Debug for CommentListController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentListController")
            .field("coordinates", &self.coordinates)
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CommentListController {
    pub fn new(
        coordinates: CommentCoordinates,
        page_size: u32,
        api: Rc<dyn CommentApi>,
        session: SessionContext,
        identity: Rc<IdentityStore>,
        viewport: Rc<dyn Viewport>,
    ) -> Self {
        Self {
            coordinates,
            api,
            session,
            identity,
            viewport,
            state: RefCell::new(ListState {
                page: Rc::new(ListResult::empty(1, page_size.max(1))),
                phase: Phase::Idle,
                issued: 0,
                pending: None,
                requested: None,
            }),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn coordinates(&self) -> &CommentCoordinates { &self.coordinates }

    pub fn session(&self) -> &SessionContext { &self.session }

    pub fn api(&self) -> &Rc<dyn CommentApi> { &self.api }

    /// Current list snapshot; cheap to clone and never mutated in place.
    pub fn page(&self) -> Rc<CommentPage> { Rc::clone(&self.state.borrow().page) }

    pub fn phase(&self) -> Phase { self.state.borrow().phase.clone() }

    pub fn is_fetching(&self) -> bool { self.state.borrow().pending.is_some() }

    /// Full placeholder is shown only while loading with nothing to display.
    pub fn is_loading(&self) -> bool {
        let state = self.state.borrow();
        state.phase == Phase::Loading && state.page.items.is_empty()
    }

    pub fn should_show_pagination(&self) -> bool {
        let state = self.state.borrow();
        state.pending.is_none() && (state.page.has_next || state.page.has_previous)
    }

    pub fn page_strip(&self) -> Option<PageStrip> {
        if !self.should_show_pagination() {
            return None;
        }
        let page = self.page();
        Some(PageStrip::build(page.total, page.size, page.page))
    }

    /// Registers a callback fired after every state change.
    pub fn on_change(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Bootstraps the session and loads the first page concurrently.
    pub async fn mount(&self) -> FetchOutcome {
        let (_, outcome) = futures::join!(self.session.bootstrap(self.api.as_ref()), self.fetch_page(None, false));
        outcome
    }

    /// Requests `page` (or the held page) and swaps the snapshot in on success.
    pub async fn fetch_page(&self, page: Option<u32>, scroll_into_view: bool) -> FetchOutcome {
        let (seq, query) = self.begin(page);
        tracing::debug!(page = query.page, seq, "fetching comments");
        self.notify();

        let result = self.api.list_comments(&query).await;

        let outcome = {
            let mut state = self.state.borrow_mut();
            if state.issued != seq {
                tracing::debug!(seq, latest = state.issued, "discarding stale comment response");
                return FetchOutcome::Stale;
            }
            state.pending = None;
            state.requested = None;
            match result {
                Ok(fresh) => {
                    state.page = Rc::new(fresh);
                    state.phase = Phase::Loaded;
                    FetchOutcome::Applied
                }
                Err(err) => {
                    tracing::warn!(error = %err, page = query.page, "failed to load comments");
                    state.phase = Phase::Error(LIST_LOAD_FAILED.to_string());
                    FetchOutcome::Failed(err)
                }
            }
        };

        if matches!(outcome, FetchOutcome::Failed(_)) {
            self.session.notify_error(LIST_LOAD_FAILED);
        }
        self.notify();
        if scroll_into_view {
            self.viewport.scroll_to_top();
        }
        outcome
    }

    /// Handles a page-change event from the pagination renderer.
    pub async fn on_page_change(&self, requested: u32) -> FetchOutcome {
        let (current, pages) = {
            let state = self.state.borrow();
            (state.target_page(), state.page.total_pages)
        };
        if requested == current {
            return FetchOutcome::Skipped;
        }
        if requested == 0 || requested > pages.max(1) {
            tracing::warn!(requested, pages, "ignoring out of range page");
            return FetchOutcome::Skipped;
        }
        self.fetch_page(Some(requested), true).await
    }

    /// New top-level comments land on the first page, so that is where we go.
    pub async fn on_comment_submitted(&self) -> FetchOutcome {
        self.fetch_page(Some(1), true).await
    }

    /// Validates and posts a comment from the compose form's fields.
    pub async fn submit(&self, fields: &FormFields) -> SubmitOutcome {
        let mode = FormMode::from_session(&self.session.snapshot());
        let request = match form::build_request(fields, &mode, &self.coordinates) {
            Ok(request) => request,
            Err(err) => {
                self.session.notify_error(&err.to_string());
                return SubmitOutcome::Invalid(err);
            }
        };

        if let Err(err) = self.api.create_comment(&request).await {
            tracing::warn!(error = %err, "failed to post comment");
            self.session.notify_error(&err.user_message());
            return SubmitOutcome::Failed(err);
        }

        if let Some(owner) = &request.owner {
            self.identity.set(AnonymousIdentity {
                display_name: owner.display_name.clone(),
                email: owner.email.clone(),
                website: owner.website.clone(),
            });
        }
        self.session.notify_success(COMMENT_POSTED);
        self.on_comment_submitted().await;
        SubmitOutcome::Posted
    }

    fn begin(&self, page: Option<u32>) -> (u64, CommentQuery) {
        let session = self.session.snapshot();
        let mut state = self.state.borrow_mut();
        state.issued += 1;
        state.pending = Some(state.issued);
        state.phase = Phase::Loading;
        let query = CommentQuery {
            coordinates: self.coordinates.clone(),
            page: page.unwrap_or_else(|| state.target_page()).max(1),
            size: state.page.size,
            with_replies: session.with_replies,
            reply_size: session.reply_size,
        };
        state.requested = Some(query.page);
        (state.issued, query)
    }

    fn notify(&self) {
        let listeners: Vec<ChangeListener> = self.listeners.borrow().iter().map(Rc::clone).collect();
        for listener in listeners {
            listener();
        }
    }
}
