use crate::{Effect, LoadStatus, Msg, ReactorState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ReactorState, msg: Msg) -> (ReactorState, Vec<Effect>) {
    let effects = match msg {
        Msg::RendererAttached => {
            state.bind_renderer();
            start_load(&mut state)
        }
        Msg::ConnectivityChanged(available) => match (available, state.status()) {
            (true, LoadStatus::NoConnection) => start_load(&mut state),
            (false, _) => {
                // Overrides whatever the in-flight load last reported.
                state.set_status(LoadStatus::NoConnection);
                Vec::new()
            }
            (true, _) => Vec::new(),
        },
        Msg::TokenReceived(token) => {
            if state.apply_token(token) {
                start_load(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::Progress(sample) => {
            state.apply_progress(sample);
            Vec::new()
        }
        Msg::NavigationFailed(reason) => {
            state.set_status(LoadStatus::Failure(reason));
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Without a bound renderer there is nothing to load into; the next attach
/// picks up the current resource.
fn start_load(state: &mut ReactorState) -> Vec<Effect> {
    if !state.renderer_bound() {
        return Vec::new();
    }

    state.begin_load();
    let mut effects = Vec::with_capacity(2);
    effects.push(Effect::Load {
        url: state.current_resource().to_string(),
        timeout: state.load_timeout(),
    });
    if state.take_subscription_request() {
        effects.push(Effect::SubscribeRenderer);
    }
    effects
}
