//! Widget-wide session state shared by the controller and the child renderers.
//!
//! The root owns one [`SessionContext`] and hands clones of it to whoever needs
//! to read it. Readers either take a [`SessionState`] snapshot or subscribe to
//! changes; only the bootstrap and logout paths write to it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::api::{xsrf_token_from_cookies, CommentApi};
use crate::config::WidgetConfig;
use crate::error::ApiError;
use crate::model::User;

/// Where user-visible messages go. Implementations must not panic.
pub trait NotificationSink {
    fn error(&self, message: &str);
    fn success(&self, _message: &str) {}
}

/// Sink that only logs, for hosts without a toast surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn error(&self, message: &str) { tracing::error!(%message, "notification"); }
    fn success(&self, message: &str) { tracing::info!(%message, "notification"); }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CurrentUser {
    /// The current-user request has not resolved (or failed).
    #[default]
    Unknown,
    Anonymous,
    Authenticated(User),
}

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Unknown | Self::Anonymous => None,
        }
    }

    pub fn is_logged_in(&self) -> bool { self.user().is_some() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub base_url: String,
    pub current_user: CurrentUser,
    pub allow_anonymous_comments: bool,
    pub with_replies: bool,
    pub reply_size: u32,
    pub emoji_data_url: String,
}

impl SessionState {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            base_url: config.api_root().to_string(),
            current_user: CurrentUser::Unknown,
            allow_anonymous_comments: false,
            with_replies: config.with_replies,
            reply_size: config.reply_size,
            emoji_data_url: config.emoji_data_url.clone(),
        }
    }
}

/// Handle returned by [`SessionContext::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&SessionState)>;

struct Inner {
    state: RefCell<SessionState>,
    notifier: Rc<dyn NotificationSink>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

#[derive(Clone)]
pub struct SessionContext {
    inner: Rc<Inner>,
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    pub fn new(state: SessionState, notifier: Rc<dyn NotificationSink>) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                notifier,
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn from_config(config: &WidgetConfig, notifier: Rc<dyn NotificationSink>) -> Self {
        Self::new(SessionState::from_config(config), notifier)
    }

    pub fn snapshot(&self) -> SessionState { self.inner.state.borrow().clone() }

    pub fn current_user(&self) -> CurrentUser { self.inner.state.borrow().current_user.clone() }

    pub fn allow_anonymous_comments(&self) -> bool { self.inner.state.borrow().allow_anonymous_comments }

    pub fn notifier(&self) -> Rc<dyn NotificationSink> { Rc::clone(&self.inner.notifier) }

    pub fn notify_error(&self, message: &str) { self.inner.notifier.error(message); }

    pub fn notify_success(&self, message: &str) { self.inner.notifier.success(message); }

    /// Calls `listener` with the new state after every change.
    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    pub fn set_current_user(&self, user: CurrentUser) {
        self.update(|state| state.current_user = user);
    }

    pub fn set_allow_anonymous_comments(&self, allow: bool) {
        self.update(|state| state.allow_anonymous_comments = allow);
    }

    /// Resolves the current user and the global flags. The two requests run
    /// side by side and each result is published as soon as it arrives.
    pub async fn bootstrap<A: CommentApi + ?Sized>(&self, api: &A) {
        futures::join!(self.load_current_user(api), self.load_global_info(api));
    }

    pub async fn load_current_user<A: CommentApi + ?Sized>(&self, api: &A) {
        match api.current_user().await {
            Ok(user) if user.is_anonymous() => self.set_current_user(CurrentUser::Anonymous),
            Ok(user) => {
                tracing::debug!(user = %user.metadata.name, "signed in");
                self.set_current_user(CurrentUser::Authenticated(user));
            }
            Err(err) => tracing::warn!(error = %err, "failed to fetch current user"),
        }
    }

    pub async fn load_global_info<A: CommentApi + ?Sized>(&self, api: &A) {
        match api.global_info().await {
            Ok(info) => self.set_allow_anonymous_comments(info.allow_anonymous_comments),
            Err(err) => tracing::warn!(error = %err, "failed to fetch global info"),
        }
    }

    /// Signs the user out using the XSRF token found in `cookies`.
    pub async fn logout<A: CommentApi + ?Sized>(&self, api: &A, cookies: &str) -> Result<(), ApiError> {
        let token = xsrf_token_from_cookies(cookies).unwrap_or_default();
        match api.logout(&token).await {
            Ok(()) => {
                self.set_current_user(CurrentUser::Anonymous);
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to logout");
                Err(err)
            }
        }
    }

    fn update(&self, mutate: impl FnOnce(&mut SessionState)) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            mutate(&mut state);
            state.clone()
        };
        let listeners: Vec<Listener> = self.inner.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
