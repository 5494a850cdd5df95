mod support;

use comment_widget_core::model::GlobalInfo;
use comment_widget_core::session::CurrentUser;
use comment_widget_core::ApiError;
use futures::executor::{block_on, LocalPool};
use futures::task::LocalSpawnExt;
use support::{harness, user, MockApi};

#[test]
fn bootstrap_results_land_independently() {
    let api = MockApi::default();
    api.users.defer();
    api.infos.defer();
    let h = harness(api);
    let mut pool = LocalPool::new();
    let session = h.session.clone();
    let api = h.api.clone();
    pool.spawner().spawn_local(async move { session.bootstrap(api.as_ref()).await }).unwrap();
    pool.run_until_stalled();
    assert_eq!(h.api.users.waiting(), 1);
    assert_eq!(h.api.infos.waiting(), 1);

    h.api.infos.resolve(0, Ok(GlobalInfo { allow_anonymous_comments: true }));
    pool.run_until_stalled();
    let state = h.session.snapshot();
    assert!(state.allow_anonymous_comments);
    assert_eq!(state.current_user, CurrentUser::Unknown);

    h.api.users.resolve(0, Ok(user("anonymousUser")));
    pool.run_until_stalled();
    assert_eq!(h.session.current_user(), CurrentUser::Anonymous);
}

#[test]
fn signed_in_user_is_stored() {
    let api = MockApi::default();
    api.users.push(Ok(user("admin")));
    api.infos.push(Ok(GlobalInfo { allow_anonymous_comments: false }));
    let h = harness(api);
    block_on(h.session.bootstrap(h.api.as_ref()));
    assert_eq!(h.session.current_user(), CurrentUser::Authenticated(user("admin")));
}

#[test]
fn bootstrap_failures_degrade_quietly() {
    let api = MockApi::default();
    api.users.push(Err(ApiError::Network("offline".into())));
    api.infos.push(Err(ApiError::rejected(404, "")));
    let h = harness(api);
    block_on(h.session.bootstrap(h.api.as_ref()));
    let state = h.session.snapshot();
    assert_eq!(state.current_user, CurrentUser::Unknown);
    assert!(!state.allow_anonymous_comments);
    assert!(h.notifier.errors.borrow().is_empty());
}

#[test]
fn mount_runs_bootstrap_alongside_first_fetch() {
    let api = MockApi::default();
    api.users.push(Ok(user("admin")));
    api.infos.push(Ok(GlobalInfo { allow_anonymous_comments: true }));
    api.lists.push(Err(ApiError::Network("offline".into())));
    let h = harness(api);
    block_on(h.controller.mount());
    assert!(h.session.current_user().is_logged_in());
    assert!(h.session.allow_anonymous_comments());
    assert_eq!(h.notifier.errors.borrow().len(), 1);
}

#[test]
fn logout_clears_user_and_sends_xsrf_token() {
    let api = MockApi::default();
    api.logouts.push(Ok(()));
    api.logouts.push(Err(ApiError::rejected(500, "")));
    let h = harness(api);
    h.session.set_current_user(CurrentUser::Authenticated(user("admin")));

    block_on(h.session.logout(h.api.as_ref(), "theme=dark; XSRF-TOKEN=t0k3n")).unwrap();
    assert_eq!(h.session.current_user(), CurrentUser::Anonymous);
    assert_eq!(*h.api.logout_tokens.borrow(), vec!["t0k3n".to_string()]);

    h.session.set_current_user(CurrentUser::Authenticated(user("admin")));
    assert!(block_on(h.session.logout(h.api.as_ref(), "")).is_err());
    assert!(h.session.current_user().is_logged_in());
}
