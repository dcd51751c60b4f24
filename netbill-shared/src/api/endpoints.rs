//! Server routes consumed by the clients, relative to the API base path.

use std::fmt;

use strum::{EnumIter, EnumString, IntoStaticStr};

/// `POST` credentials, returns `{user, token}`.
pub const LOGIN: &str = "auth/login";
/// `POST` account details, returns `{user, token}`.
pub const REGISTER: &str = "auth/register";
/// `GET` the signed-in user.
pub const CURRENT_USER: &str = "auth/me";
/// `POST` to revoke the current token.
pub const LOGOUT: &str = "auth/logout";

/// Administrative resources exposed as REST collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Customers,
    Packages,
    Invoices,
    Payments,
    Tickets,
    Installations,
    Notifications,
    AuditLogs,
    Roles,
    Users,
}

impl Resource {
    /// Machine name, also used in permission names (`view_<name>`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Collection path relative to the API base.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::AuditLogs => "audit-logs",
            other => other.as_str(),
        }
    }

    /// Path of a single record.
    #[must_use]
    pub fn item_path(self, id: &str) -> String {
        format!("{}/{}", self.path(), id)
    }

    /// Permission required to list the collection.
    #[must_use]
    pub fn view_permission(self) -> String {
        format!("view_{}", self.as_str())
    }

    /// Permission required to create, edit or delete records.
    #[must_use]
    pub fn manage_permission(self) -> String {
        format!("manage_{}", self.as_str())
    }

    /// Heading shown in navigation and page titles.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Customers => "Customers",
            Self::Packages => "Packages",
            Self::Invoices => "Invoices",
            Self::Payments => "Payments",
            Self::Tickets => "Support Tickets",
            Self::Installations => "Installations",
            Self::Notifications => "Notifications",
            Self::AuditLogs => "Audit Logs",
            Self::Roles => "Roles & Permissions",
            Self::Users => "Users",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST` to mark a payment verified.
#[must_use]
pub fn verify_payment(payment_id: &str) -> String {
    format!("{}/verify", Resource::Payments.item_path(payment_id))
}
