use tide_core::{update, Msg, ReactorState};

#[test]
fn update_is_noop() {
    let state = ReactorState::new("https://x.test/app", None);
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
