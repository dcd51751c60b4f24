use shared::session::Session;
use yewdux::{Context, Store};

use crate::api::shared_store;

/// Reactive mirror of the session store for components.
///
/// Seeded from the persisted session on first access so the first render
/// already knows who is signed in; `App` keeps it in sync afterwards.
#[derive(Default, Clone, PartialEq)]
pub struct AppState {
    pub session: Session,
}

impl Store for AppState {
    fn new(_cx: &Context) -> Self {
        Self {
            session: shared_store().snapshot(),
        }
    }

    fn should_notify(&self, old: &Self) -> bool {
        self != old
    }
}
