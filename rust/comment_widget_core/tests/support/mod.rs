#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use comment_widget_core::api::{CommentApi, CommentQuery, CommentRequest};
use comment_widget_core::controller::{CommentListController, Viewport};
use comment_widget_core::identity::{IdentityStore, MemoryStorage};
use comment_widget_core::model::{Comment, CommentCoordinates, CommentPage, GlobalInfo, ListResult, Metadata, User};
use comment_widget_core::session::{NotificationSink, SessionContext, SessionState};
use comment_widget_core::{ApiError, WidgetConfig};
use futures::channel::oneshot;

type Reply<T> = Result<T, ApiError>;

/// Answers calls either from a queue or, when deferred, only once the test resolves them.
pub struct Responder<T> {
    deferred: Cell<bool>,
    queued: RefCell<Vec<Reply<T>>>,
    waiting: RefCell<Vec<Option<oneshot::Sender<Reply<T>>>>>,
    calls: Cell<usize>,
}

impl<T> Default for Responder<T> {
    fn default() -> Self {
        Self { deferred: Cell::new(false), queued: RefCell::new(Vec::new()), waiting: RefCell::new(Vec::new()), calls: Cell::new(0) }
    }
}

impl<T> Responder<T> {
    pub fn defer(&self) { self.deferred.set(true); }

    pub fn push(&self, reply: Reply<T>) { self.queued.borrow_mut().push(reply); }

    pub fn calls(&self) -> usize { self.calls.get() }

    pub fn waiting(&self) -> usize { self.waiting.borrow().iter().filter(|w| w.is_some()).count() }

    /// Resolves the `index`-th deferred call (in issue order).
    pub fn resolve(&self, index: usize, reply: Reply<T>) {
        let sender = self.waiting.borrow_mut()[index].take().expect("call already resolved");
        let _ = sender.send(reply);
    }

    async fn respond(&self) -> Reply<T> {
        self.calls.set(self.calls.get() + 1);
        if self.deferred.get() {
            let (tx, rx) = oneshot::channel();
            self.waiting.borrow_mut().push(Some(tx));
            return rx.await.unwrap_or_else(|_| Err(ApiError::Network("dropped".into())));
        }
        let mut queued = self.queued.borrow_mut();
        if queued.is_empty() {
            Err(ApiError::Network("no scripted response".into()))
        } else {
            queued.remove(0)
        }
    }
}

#[derive(Default)]
pub struct MockApi {
    pub lists: Responder<CommentPage>,
    pub users: Responder<User>,
    pub infos: Responder<GlobalInfo>,
    pub posts: Responder<()>,
    pub logouts: Responder<()>,
    pub queries: RefCell<Vec<CommentQuery>>,
    pub posted: RefCell<Vec<CommentRequest>>,
    pub logout_tokens: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl CommentApi for MockApi {
    async fn list_comments(&self, query: &CommentQuery) -> Result<CommentPage, ApiError> {
        self.queries.borrow_mut().push(query.clone());
        self.lists.respond().await
    }

    async fn current_user(&self) -> Result<User, ApiError> { self.users.respond().await }

    async fn global_info(&self) -> Result<GlobalInfo, ApiError> { self.infos.respond().await }

    async fn create_comment(&self, request: &CommentRequest) -> Result<(), ApiError> {
        self.posted.borrow_mut().push(request.clone());
        self.posts.respond().await
    }

    async fn logout(&self, xsrf_token: &str) -> Result<(), ApiError> {
        self.logout_tokens.borrow_mut().push(xsrf_token.to_string());
        self.logouts.respond().await
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub errors: RefCell<Vec<String>>,
    pub successes: RefCell<Vec<String>>,
}

impl NotificationSink for RecordingNotifier {
    fn error(&self, message: &str) { self.errors.borrow_mut().push(message.to_string()); }
    fn success(&self, message: &str) { self.successes.borrow_mut().push(message.to_string()); }
}

#[derive(Default)]
pub struct CountingViewport {
    pub scrolls: Cell<usize>,
}

impl Viewport for CountingViewport {
    fn scroll_to_top(&self) { self.scrolls.set(self.scrolls.get() + 1); }
}

pub fn config() -> WidgetConfig {
    WidgetConfig {
        group: "content.halo.run".into(),
        kind: "Post".into(),
        name: "hello".into(),
        version: "v1alpha1".into(),
        page_size: 10,
        ..WidgetConfig::default()
    }
}

pub fn coordinates() -> CommentCoordinates { config().coordinates() }

/// A well-formed page `page` of `total` comments, `size` per page.
pub fn page_of(page: u32, size: u32, total: u64) -> CommentPage {
    let start = u64::from(page - 1) * u64::from(size);
    let count = total.saturating_sub(start).min(u64::from(size));
    let items = (0..count)
        .map(|i| Comment {
            metadata: Metadata { name: format!("c-{}", start + i), creation_timestamp: None },
            ..Comment::default()
        })
        .collect();
    ListResult { page, size, total, items, ..ListResult::empty(page, size) }.with_derived_flags()
}

pub fn user(name: &str) -> User {
    User { metadata: Metadata { name: name.into(), creation_timestamp: None }, ..User::default() }
}

pub struct Harness {
    pub api: Rc<MockApi>,
    pub notifier: Rc<RecordingNotifier>,
    pub viewport: Rc<CountingViewport>,
    pub storage: Rc<MemoryStorage>,
    pub identity: Rc<IdentityStore>,
    pub session: SessionContext,
    pub controller: Rc<CommentListController>,
}

pub fn harness(api: MockApi) -> Harness {
    let api = Rc::new(api);
    let notifier = Rc::new(RecordingNotifier::default());
    let viewport = Rc::new(CountingViewport::default());
    let storage = Rc::new(MemoryStorage::new());
    let identity = Rc::new(IdentityStore::new(storage.clone()));
    let session = SessionContext::new(SessionState::from_config(&config()), notifier.clone());
    let controller = Rc::new(CommentListController::new(
        coordinates(),
        10,
        api.clone(),
        session.clone(),
        identity.clone(),
        viewport.clone(),
    ));
    Harness { api, notifier, viewport, storage, identity, session, controller }
}
