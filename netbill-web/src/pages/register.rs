use crate::{api::shared_client, routes::MainRoute};
use shared::models::RegisterRequest;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

fn bind(handle: &UseStateHandle<String>) -> Callback<InputEvent> {
    let handle = handle.clone();
    Callback::from(move |event: InputEvent| {
        if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
            handle.set(input.value());
        }
    })
}

fn field(id: &'static str, label: &'static str, kind: &'static str, handle: &UseStateHandle<String>) -> Html {
    html! {
        <div class="form-control">
            <label class="label" for={id}>
                <span class="label-text">{label}</span>
            </label>
            <input
                id={id}
                class="input input-bordered"
                type={kind}
                required=true
                value={(**handle).clone()}
                oninput={bind(handle)}
            />
        </div>
    }
}

#[function_component(RegisterPage)]
pub fn register_page() -> Html {
    let name = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let confirmation = use_state(String::new);
    let error = use_state(|| None::<String>);
    let loading = use_state(|| false);
    let navigator = use_navigator();

    let onsubmit = {
        let name = name.clone();
        let email = email.clone();
        let password = password.clone();
        let confirmation = confirmation.clone();
        let error = error.clone();
        let loading = loading.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            if *password != *confirmation {
                error.set(Some("Passwords do not match".to_string()));
                return;
            }
            let request = RegisterRequest {
                name: (*name).clone(),
                email: (*email).clone(),
                password: (*password).clone(),
                password_confirmation: (*confirmation).clone(),
            };
            loading.set(true);
            error.set(None);
            let loading = loading.clone();
            let error = error.clone();
            let navigator = navigator.clone();
            spawn_local(async move {
                match shared_client().register(&request).await {
                    Ok(_) => {
                        if let Some(ref nav) = navigator {
                            nav.push(&MainRoute::Dashboard);
                        }
                    }
                    Err(err) => error.set(Some(err.user_message())),
                }
                loading.set(false);
            });
        })
    };

    let is_busy = *loading;

    html! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-lg bg-base-100">
                <form class="card-body" onsubmit={onsubmit}>
                    <h2 class="card-title text-2xl">{"Create an account"}</h2>
                    if let Some(message) = &*error {
                        <div class="alert alert-error">
                            <span>{message.clone()}</span>
                        </div>
                    }
                    { field("name", "Full name", "text", &name) }
                    { field("email", "Email", "email", &email) }
                    { field("password", "Password", "password", &password) }
                    { field("password_confirmation", "Confirm password", "password", &confirmation) }
                    <div class="form-control mt-6">
                        <button class="btn btn-primary" type="submit" disabled={is_busy}>
                            {if is_busy { "Creating account..." } else { "Register" }}
                        </button>
                    </div>
                    <p class="text-sm text-center">
                        {"Already registered? "}
                        <Link<MainRoute> to={MainRoute::Login} classes="link link-primary">
                            {"Sign in"}
                        </Link<MainRoute>>
                    </p>
                </form>
            </div>
        </div>
    }
}
