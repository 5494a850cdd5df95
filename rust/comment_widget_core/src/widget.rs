//! Root of a widget instance: wires config, session, list controller and form
//! draft together and routes child events to them.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::api::CommentApi;
use crate::config::WidgetConfig;
use crate::controller::{CommentListController, FetchOutcome, Viewport};
use crate::error::ApiError;
use crate::event::{EventOutcome, WidgetEvent};
use crate::form::{self, ComposeDraft, FormMode};
use crate::identity::{IdentityStore, KeyValueStorage};
use crate::session::{NotificationSink, SessionContext};
use crate::view::{CommentItemView, FormView, WidgetView};

#[derive(Debug)]
pub struct CommentWidget {
    config: WidgetConfig,
    controller: CommentListController,
    identity: Rc<IdentityStore>,
    draft: RefCell<ComposeDraft>,
}

impl CommentWidget {
    pub fn new(
        config: WidgetConfig,
        api: Rc<dyn CommentApi>,
        storage: Rc<dyn KeyValueStorage>,
        notifier: Rc<dyn NotificationSink>,
        viewport: Rc<dyn Viewport>,
    ) -> Self {
        let session = SessionContext::from_config(&config, notifier);
        let identity = Rc::new(IdentityStore::new(storage));
        let controller = CommentListController::new(
            config.coordinates(),
            config.page_size,
            api,
            session,
            Rc::clone(&identity),
            viewport,
        );
        let draft = RefCell::new(ComposeDraft::prefilled(&identity.get()));
        Self { config, controller, identity, draft }
    }

    pub fn config(&self) -> &WidgetConfig { &self.config }

    pub fn controller(&self) -> &CommentListController { &self.controller }

    pub fn session(&self) -> &SessionContext { self.controller.session() }

    pub fn identity(&self) -> &IdentityStore { &self.identity }

    pub fn draft(&self) -> ComposeDraft { self.draft.borrow().clone() }

    pub fn set_draft_field(&self, name: &str, value: &str) {
        self.draft.borrow_mut().set_field(name, value);
    }

    pub async fn mount(&self) -> FetchOutcome { self.controller.mount().await }

    /// Routes a child event to its handler.
    pub async fn dispatch(&self, event: WidgetEvent) -> EventOutcome {
        match event {
            WidgetEvent::PageChange { page } => EventOutcome::Fetched(self.controller.on_page_change(page).await),
            WidgetEvent::Submit { fields } => {
                let outcome = self.controller.submit(&fields).await;
                let mut draft = self.draft.borrow_mut();
                if outcome.is_posted() {
                    *draft = ComposeDraft { content: String::new(), ..ComposeDraft::prefilled(&self.identity.get()) };
                } else {
                    for (name, value) in &fields {
                        draft.set_field(name, value);
                    }
                }
                EventOutcome::Submitted(outcome)
            }
            WidgetEvent::EmojiInsert { text } => {
                self.draft.borrow_mut().insert_text(&text);
                EventOutcome::DraftUpdated
            }
        }
    }

    pub async fn logout(&self, cookies: &str) -> Result<(), ApiError> {
        self.session().logout(self.controller.api().as_ref(), cookies).await
    }

    pub fn login_url(&self, page_href: &str) -> String {
        form::login_url(self.controller.coordinates(), page_href)
    }

    /// Snapshot for the renderer, with relative times computed against `now`.
    pub fn view(&self, page_href: &str, now: DateTime<Utc>) -> WidgetView {
        let page = self.controller.page();
        let draft = self.draft();
        WidgetView {
            total: page.total,
            show_spinner: self.controller.is_loading(),
            is_empty: page.total == 0,
            items: page.items.iter().map(|c| CommentItemView::from_comment(c, 1, now)).collect(),
            pagination: self.controller.page_strip(),
            form: FormView {
                mode: FormMode::from_session(&self.session().snapshot()),
                profile_complete: draft.profile_complete(),
                draft,
                login_url: self.login_url(page_href),
            },
        }
    }
}
