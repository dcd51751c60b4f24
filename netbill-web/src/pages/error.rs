use yew::{Html, function_component, html};
use yew_router::prelude::Link;

use crate::routes::MainRoute;

/// Shown for paths no route matches.
#[function_component(ErrorPage)]
pub fn error_page() -> Html {
    html! {
        <div class="p-4 space-y-6">
            <h1 class="text-2xl font-bold">{ "Page not found" }</h1>
            <p>{ "The page you requested does not exist." }</p>
            <Link<MainRoute> to={MainRoute::Dashboard} classes="btn btn-primary">
                { "Back to dashboard" }
            </Link<MainRoute>>
        </div>
    }
}
