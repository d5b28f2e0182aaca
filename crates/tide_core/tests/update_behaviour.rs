use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tide_core::{update, Effect, LoadStatus, Msg, ReactorState, DEFAULT_LOAD_TIMEOUT};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tide_logging::initialize_for_tests);
}

fn attached(base: &str, token: Option<&str>) -> ReactorState {
    let state = ReactorState::new(base, token.map(ToOwned::to_owned));
    let (state, _effects) = update(state, Msg::RendererAttached);
    state
}

fn load_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Load { .. }))
        .count()
}

#[test]
fn first_attach_loads_and_subscribes() {
    init_logging();
    let state = ReactorState::new("https://x.test/app", Some("abc123".to_string()));

    let (mut next, effects) = update(state, Msg::RendererAttached);

    assert_eq!(
        effects,
        vec![
            Effect::Load {
                url: "https://x.test/app?fcm=abc123".to_string(),
                timeout: DEFAULT_LOAD_TIMEOUT,
            },
            Effect::SubscribeRenderer,
        ]
    );
    assert_eq!(next.status(), &LoadStatus::Progressing(0.0));
    assert!(next.consume_dirty());
}

#[test]
fn reloads_do_not_resubscribe() {
    init_logging();
    let state = attached("https://x.test/app", None);
    let (state, _) = update(state, Msg::ConnectivityChanged(false));

    let (_state, effects) = update(state, Msg::ConnectivityChanged(true));

    assert_eq!(
        effects,
        vec![Effect::Load {
            url: "https://x.test/app".to_string(),
            timeout: DEFAULT_LOAD_TIMEOUT,
        }]
    );
}

#[test]
fn reattaching_a_renderer_subscribes_again() {
    init_logging();
    let state = attached("https://x.test/app", None);

    let (_state, effects) = update(state, Msg::RendererAttached);

    assert_eq!(load_count(&effects), 1);
    assert!(effects.contains(&Effect::SubscribeRenderer));
}

#[test]
fn configured_timeout_is_used_for_loads() {
    init_logging();
    let state = ReactorState::new("https://x.test/app", None)
        .with_load_timeout(Duration::from_secs(3));

    let (_state, effects) = update(state, Msg::RendererAttached);

    assert_eq!(
        effects[0],
        Effect::Load {
            url: "https://x.test/app".to_string(),
            timeout: Duration::from_secs(3),
        }
    );
}

#[test]
fn connectivity_loss_overrides_any_status() {
    init_logging();
    let cases = [
        LoadStatus::Standby,
        LoadStatus::Progressing(0.3),
        LoadStatus::Finished,
        LoadStatus::Failure("boom".to_string()),
        LoadStatus::NoConnection,
    ];
    for status in cases {
        let state = attached("https://x.test/app", None);
        let state = drive_to(state, &status);

        let (state, effects) = update(state, Msg::ConnectivityChanged(false));

        assert_eq!(state.status(), &LoadStatus::NoConnection, "from {status:?}");
        assert!(effects.is_empty());
    }
}

#[test]
fn connectivity_restore_only_reloads_when_offline() {
    init_logging();
    let online_cases = [
        LoadStatus::Progressing(0.3),
        LoadStatus::Finished,
        LoadStatus::Failure("boom".to_string()),
    ];
    for status in online_cases {
        let state = drive_to(attached("https://x.test/app", None), &status);
        let (state, effects) = update(state, Msg::ConnectivityChanged(true));
        assert_eq!(load_count(&effects), 0, "from {status:?}");
        assert_eq!(state.status(), &status);
    }

    let state = drive_to(attached("https://x.test/app", None), &LoadStatus::NoConnection);
    let loads_before = state.loads_started();
    let (state, effects) = update(state, Msg::ConnectivityChanged(true));
    assert_eq!(load_count(&effects), 1);
    assert_eq!(state.loads_started(), loads_before + 1);
    assert_eq!(state.status(), &LoadStatus::Progressing(0.0));
}

#[test]
fn connectivity_restore_without_renderer_does_nothing() {
    init_logging();
    let state = ReactorState::new("https://x.test/app", None);
    let (state, _) = update(state, Msg::ConnectivityChanged(false));

    let (state, effects) = update(state, Msg::ConnectivityChanged(true));

    assert!(effects.is_empty());
    assert_eq!(state.status(), &LoadStatus::NoConnection);
}

#[test]
fn token_update_replaces_parameter_and_reloads_once() {
    init_logging();
    let state = attached("https://x.test/app", Some("abc123"));
    assert_eq!(state.current_resource(), "https://x.test/app?fcm=abc123");

    let (state, effects) = update(state, Msg::TokenReceived("xyz789".to_string()));

    assert_eq!(state.current_resource(), "https://x.test/app?fcm=xyz789");
    assert_eq!(
        effects,
        vec![Effect::Load {
            url: "https://x.test/app?fcm=xyz789".to_string(),
            timeout: DEFAULT_LOAD_TIMEOUT,
        }]
    );
}

#[test]
fn repeated_token_is_suppressed() {
    init_logging();
    let state = attached("https://x.test/app", Some("abc123"));
    let (state, _) = update(state, Msg::Progress(1.0));

    let (state, effects) = update(state, Msg::TokenReceived("abc123".to_string()));

    assert!(effects.is_empty());
    assert_eq!(state.status(), &LoadStatus::Finished);
}

#[test]
fn token_before_attach_only_updates_resource() {
    init_logging();
    let state = ReactorState::new("https://x.test/app", None);

    let (state, effects) = update(state, Msg::TokenReceived("abc".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.status(), &LoadStatus::Standby);
    assert_eq!(state.token(), Some("abc"));

    let (_state, effects) = update(state, Msg::RendererAttached);
    assert_eq!(
        effects[0],
        Effect::Load {
            url: "https://x.test/app?fcm=abc".to_string(),
            timeout: DEFAULT_LOAD_TIMEOUT,
        }
    );
}

#[test]
fn current_resource_always_tracks_latest_token() {
    init_logging();
    let mut state = attached("https://x.test/app?lang=en", None);
    for token in ["one", "two", "two", "", "three"] {
        let (next, _) = update(state, Msg::TokenReceived(token.to_string()));
        state = next;
        assert_eq!(
            state.current_resource(),
            tide_core::resolve(state.base_resource(), Some(token))
        );
    }
}

#[test]
fn failure_then_offline_then_online_recovers() {
    init_logging();
    let state = attached("https://x.test/app", None);
    let (state, _) = update(state, Msg::Progress(0.5));
    assert_eq!(state.status(), &LoadStatus::Progressing(0.5));

    let (state, _) = update(state, Msg::NavigationFailed("timeout".to_string()));
    assert_eq!(state.status(), &LoadStatus::Failure("timeout".to_string()));

    let (state, _) = update(state, Msg::ConnectivityChanged(false));
    assert_eq!(state.status(), &LoadStatus::NoConnection);

    let (state, effects) = update(state, Msg::ConnectivityChanged(true));
    assert_eq!(load_count(&effects), 1);
    assert_eq!(state.status(), &LoadStatus::Progressing(0.0));
}

#[test]
fn failure_does_not_retry() {
    init_logging();
    let state = attached("https://x.test/app", None);
    let (state, effects) = update(state, Msg::NavigationFailed("refused".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.status(), &LoadStatus::Failure("refused".to_string()));
}

fn drive_to(state: ReactorState, status: &LoadStatus) -> ReactorState {
    let msg = match status {
        LoadStatus::Standby => return state,
        LoadStatus::Progressing(fraction) => Msg::Progress(*fraction),
        LoadStatus::Finished => Msg::Progress(1.0),
        LoadStatus::Failure(reason) => Msg::NavigationFailed(reason.clone()),
        LoadStatus::NoConnection => Msg::ConnectivityChanged(false),
    };
    let (state, _) = update(state, msg);
    state
}
