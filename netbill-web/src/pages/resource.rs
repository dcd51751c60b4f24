use serde_json::Value;
use shared::api::Resource;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::shared_client;
use crate::components::{loading::Loading, record_table::RecordTable};

#[derive(Properties, PartialEq)]
pub struct ResourcePageProps {
    pub resource: Resource,
}

#[derive(Clone, PartialEq)]
enum Listing {
    Loading,
    Loaded(Vec<Value>),
    Failed(String),
}

/// Lists the records of one resource collection.
#[function_component(ResourcePage)]
pub fn resource_page(props: &ResourcePageProps) -> Html {
    let listing = use_state(|| Listing::Loading);

    {
        let listing = listing.clone();
        use_effect_with(props.resource, move |resource| {
            let resource = *resource;
            listing.set(Listing::Loading);
            spawn_local(async move {
                match shared_client().list(resource).await {
                    Ok(rows) => listing.set(Listing::Loaded(rows)),
                    Err(err) => listing.set(Listing::Failed(err.user_message())),
                }
            });
            || ()
        });
    }

    let body = match &*listing {
        Listing::Loading => html! { <Loading /> },
        Listing::Failed(message) => html! {
            <div class="alert alert-error">
                <span>{ message.clone() }</span>
            </div>
        },
        Listing::Loaded(rows) => html! { <RecordTable rows={rows.clone()} /> },
    };

    html! {
        <div class="p-4 space-y-6">
            <h1 class="text-2xl font-bold">{ props.resource.title() }</h1>
            { body }
        </div>
    }
}
