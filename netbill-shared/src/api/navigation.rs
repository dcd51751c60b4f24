use std::{cell::RefCell, rc::Rc};

/// A navigation requested by the client core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Full page load of `path`, discarding in-memory application state.
    Hard(String),
    /// In-app route replacement to `path`.
    Replace(String),
}

impl Navigation {
    /// Target path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Hard(path) | Self::Replace(path) => path,
        }
    }
}

/// Performs navigations on behalf of the client core.
///
/// The browser client changes `window.location`; the terminal client prints
/// a notice; tests record what was asked.
pub trait Navigator {
    /// Carry out `navigation`.
    fn navigate(&self, navigation: &Navigation);
}

/// Navigator that only records requests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    issued: Rc<RefCell<Vec<Navigation>>>,
}

impl RecordingNavigator {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every navigation issued so far, oldest first.
    #[must_use]
    pub fn issued(&self) -> Vec<Navigation> {
        self.issued.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, navigation: &Navigation) {
        self.issued.borrow_mut().push(navigation.clone());
    }
}
