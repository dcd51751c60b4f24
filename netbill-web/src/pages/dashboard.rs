use shared::api::Resource;
use strum::IntoEnumIterator;
use yew::{Html, function_component, html};
use yew_router::prelude::*;
use yewdux::prelude::use_selector;

use crate::api::access_guard;
use crate::models::app_state::AppState;
use crate::routes::MainRoute;

/// Dashboard page component
#[function_component(DashboardPage)]
pub fn dashboard_page() -> Html {
    let session = use_selector(|state: &AppState| state.session.clone());
    let guard = access_guard();
    let greeting = session
        .user
        .as_ref()
        .and_then(|user| user.display_name())
        .map_or_else(|| "Welcome".to_string(), |name| format!("Welcome, {name}"));

    let cards: Vec<Resource> = Resource::iter()
        .filter(|resource| guard.allows(&session, Some(&resource.view_permission())))
        .collect();

    html! {
        <div class="p-4 space-y-6">
            <h1 class="text-2xl font-bold">{ greeting }</h1>

            if cards.is_empty() {
                <div class="alert alert-info">
                    <span>{ "Your role has no sections assigned yet. Ask an administrator for access." }</span>
                </div>
            }

            <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6">
                { for cards.into_iter().map(|resource| html! {
                    <div class="card bg-base-200 shadow-xl">
                        <div class="card-body">
                            <h2 class="card-title">{ resource.title() }</h2>
                            <div class="card-actions justify-end">
                                <Link<MainRoute> to={MainRoute::for_resource(resource)} classes="btn btn-primary">
                                    { "Open" }
                                </Link<MainRoute>>
                            </div>
                        </div>
                    </div>
                }) }
            </div>
        </div>
    }
}
