use shared::api::Resource;
use strum::IntoEnumIterator;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;
use yewdux::prelude::use_selector;

use crate::api::{access_guard, shared_client};
use crate::models::app_state::AppState;
use crate::routes::MainRoute;

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    #[prop_or_default]
    pub current_route: Option<MainRoute>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let session = use_selector(|state: &AppState| state.session.clone());
    let navigator = use_navigator();
    let guard = access_guard();

    // Only resources the session may view get a link.
    let visible: Vec<Resource> = Resource::iter()
        .filter(|resource| guard.allows(&session, Some(&resource.view_permission())))
        .collect();

    let user = session.user.as_ref();
    let name = user
        .and_then(|user| user.display_name())
        .unwrap_or("Signed in")
        .to_string();
    let role = user.and_then(|user| user.role()).unwrap_or_default().to_string();

    let on_sign_out = Callback::from(move |_: MouseEvent| {
        let navigator = navigator.clone();
        spawn_local(async move {
            shared_client().sign_out().await;
            if let Some(navigator) = navigator {
                navigator.push(&MainRoute::Login);
            }
        });
    });

    let nav_item = |route: MainRoute, title: &'static str| {
        let active = if props.current_route.as_ref() == Some(&route) {
            "btn-soft"
        } else {
            ""
        };
        html! {
            <li>
                <Link<MainRoute> to={route} classes={classes!("btn", "btn-ghost", "btn-sm", active)}>
                    {title}
                </Link<MainRoute>>
            </li>
        }
    };

    html! {
        <nav class="navbar justify-between bg-base-300">
            <Link<MainRoute> to={MainRoute::Dashboard} classes="btn btn-ghost text-lg">
                {"NetBill"}
            </Link<MainRoute>>
            <ul class="hidden menu lg:menu-horizontal gap-1">
                { nav_item(MainRoute::Dashboard, "Dashboard") }
                { for visible.iter().map(|resource| nav_item(MainRoute::for_resource(*resource), resource.title())) }
            </ul>
            <div class="flex items-center gap-3">
                <div class="flex flex-col items-end text-sm">
                    <span class="font-semibold">{name}</span>
                    if !role.is_empty() {
                        <span class="badge badge-outline badge-sm">{role}</span>
                    }
                </div>
                <button class="btn btn-outline btn-sm" onclick={on_sign_out}>{"Sign out"}</button>
            </div>
        </nav>
    }
}
