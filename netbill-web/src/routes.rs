use crate::components::access_guard::AccessGuard;
use crate::containers::layout::Layout;
use crate::pages::{
    DashboardPage, ErrorPage, LoginPage, RegisterPage, ResourcePage,
};
use shared::api::Resource;
use strum::EnumIter;
use wasm_bindgen::prelude::*;
use yew::prelude::*;
use yew_router::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Application routes.
#[derive(Debug, Clone, PartialEq, Routable, EnumIter)]
pub enum MainRoute {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/dashboard")]
    Dashboard,
    #[at("/customers")]
    Customers,
    #[at("/packages")]
    Packages,
    #[at("/invoices")]
    Invoices,
    #[at("/payments")]
    Payments,
    #[at("/tickets")]
    Tickets,
    #[at("/installations")]
    Installations,
    #[at("/notifications")]
    Notifications,
    #[at("/audit-logs")]
    AuditLogs,
    #[at("/roles")]
    Roles,
    #[at("/users")]
    Users,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl MainRoute {
    /// Resource listed by this route, if it is a resource page.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::Customers => Some(Resource::Customers),
            Self::Packages => Some(Resource::Packages),
            Self::Invoices => Some(Resource::Invoices),
            Self::Payments => Some(Resource::Payments),
            Self::Tickets => Some(Resource::Tickets),
            Self::Installations => Some(Resource::Installations),
            Self::Notifications => Some(Resource::Notifications),
            Self::AuditLogs => Some(Resource::AuditLogs),
            Self::Roles => Some(Resource::Roles),
            Self::Users => Some(Resource::Users),
            Self::Home | Self::Login | Self::Register | Self::Dashboard | Self::NotFound => None,
        }
    }

    /// Route showing `resource`.
    pub fn for_resource(resource: Resource) -> Self {
        match resource {
            Resource::Customers => Self::Customers,
            Resource::Packages => Self::Packages,
            Resource::Invoices => Self::Invoices,
            Resource::Payments => Self::Payments,
            Resource::Tickets => Self::Tickets,
            Resource::Installations => Self::Installations,
            Resource::Notifications => Self::Notifications,
            Resource::AuditLogs => Self::AuditLogs,
            Resource::Roles => Self::Roles,
            Resource::Users => Self::Users,
        }
    }

    /// Permission the access guard checks before rendering.
    pub fn required_permission(&self) -> Option<String> {
        self.resource().map(Resource::view_permission)
    }
}

fn guarded(route: MainRoute, content: Html) -> Html {
    let permission: Option<AttrValue> = route.required_permission().map(AttrValue::from);
    html! {
        <AccessGuard {permission}>
            <Layout current_route={route}>
                {content}
            </Layout>
        </AccessGuard>
    }
}

/// Switch function for the main routes.
pub fn switch(route: MainRoute) -> Html {
    log(format!("Switching to route: {route:?}").as_str());
    match route {
        MainRoute::Home => html! { <Redirect<MainRoute> to={MainRoute::Dashboard} /> },
        MainRoute::Login => html! { <LoginPage /> },
        MainRoute::Register => html! { <RegisterPage /> },
        MainRoute::Dashboard => guarded(route, html! { <DashboardPage /> }),
        MainRoute::NotFound => guarded(route, html! { <ErrorPage /> }),
        other => match other.resource() {
            Some(resource) => guarded(other, html! { <ResourcePage {resource} /> }),
            None => html! { <Redirect<MainRoute> to={MainRoute::NotFound} /> },
        },
    }
}
