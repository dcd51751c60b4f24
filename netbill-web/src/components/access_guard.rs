use shared::access::{DENIED_PATH, GuardDecision, LOGIN_PATH};
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::use_selector;

use crate::api::access_guard;
use crate::models::app_state::AppState;
use crate::routes::MainRoute;

#[derive(Properties, PartialEq)]
pub struct AccessGuardProps {
    pub children: Children,
    /// Permission the session must hold; `None` or empty means any session.
    #[prop_or_default]
    pub permission: Option<AttrValue>,
}

/// Renders its children only when the session passes the access guard.
///
/// Re-evaluated on every session change and every change of `permission`.
#[function_component(AccessGuard)]
pub fn access_guard_view(props: &AccessGuardProps) -> Html {
    let session = use_selector(|state: &AppState| state.session.clone());
    let guard = use_memo((), |_| access_guard());

    match guard.evaluate(&session, props.permission.as_deref()) {
        GuardDecision::Render => html! { <>{ props.children.clone() }</> },
        GuardDecision::RedirectToLogin => {
            let to = MainRoute::recognize(LOGIN_PATH).unwrap_or(MainRoute::Login);
            html! { <Redirect<MainRoute> {to} /> }
        }
        GuardDecision::RedirectToDenied => {
            let to = MainRoute::recognize(DENIED_PATH).unwrap_or(MainRoute::Dashboard);
            html! { <ReplaceRoute {to} /> }
        }
    }
}

#[derive(Properties, PartialEq)]
struct ReplaceRouteProps {
    to: MainRoute,
}

/// Like `Redirect`, but replaces the current history entry.
#[function_component(ReplaceRoute)]
fn replace_route(props: &ReplaceRouteProps) -> Html {
    let navigator = use_navigator();
    use_effect_with(props.to.clone(), move |target| {
        if let Some(navigator) = navigator {
            navigator.replace(target);
        }
        || ()
    });
    html! {}
}
