use crate::api::{shared_client, shared_store};
use crate::models::app_state::AppState;
use crate::routes::MainRoute;
use wasm_bindgen_futures::spawn_local;
use yew::{Html, function_component, html, use_effect_with};
use yew_router::prelude::*;
use yewdux::YewduxRoot;
use yewdux::prelude::use_store;

/// Mirrors every session change into the yewdux store and refreshes the
/// signed-in user once on start.
#[function_component(SessionBridge)]
fn session_bridge() -> Html {
    let (_state, dispatch) = use_store::<AppState>();

    use_effect_with((), move |_| {
        let store = shared_store();
        let subscription = store.subscribe(move |session| {
            dispatch.set(AppState {
                session: session.clone(),
            });
        });

        if store.snapshot().token.is_some() {
            spawn_local(async move {
                if let Err(err) = shared_client().refresh_user().await {
                    web_sys::console::warn_1(&format!("Could not refresh user: {err}").into());
                }
            });
        }

        move || store.unsubscribe(subscription)
    });

    html! {
        <BrowserRouter>
            <Switch<MainRoute> render={crate::routes::switch} />
        </BrowserRouter>
    }
}

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <YewduxRoot>
            <SessionBridge />
        </YewduxRoot>
    }
}
