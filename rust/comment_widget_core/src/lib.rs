//! Headless core of the embeddable comment widget.
//!
//! Hosts provide the seams ([`api::HttpTransport`] or [`api::CommentApi`],
//! [`identity::KeyValueStorage`], [`session::NotificationSink`],
//! [`controller::Viewport`]) and render [`view::WidgetView`] snapshots.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod form;
pub mod identity;
pub mod model;
pub mod pagination;
pub mod session;
pub mod view;
pub mod widget;

pub use api::{CommentApi, HaloClient, HttpTransport};
pub use config::WidgetConfig;
pub use controller::{CommentListController, FetchOutcome, Phase, SubmitOutcome, Viewport};
pub use error::{ApiError, ConfigError, FormError, StorageError};
pub use event::{EventOutcome, WidgetEvent};
pub use identity::{AnonymousIdentity, IdentityStore, KeyValueStorage};
pub use model::{Comment, CommentCoordinates, CommentPage, User};
pub use pagination::{compute_window, PageEntry, PageStrip};
pub use session::{CurrentUser, NotificationSink, SessionContext, SessionState};
pub use widget::CommentWidget;
