use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role assigned at sign-in when the server supplies neither `role` nor `roles`.
pub const DEFAULT_ROLE: &str = "User";

const ROLE_FIELD: &str = "role";
const ROLES_FIELD: &str = "roles";
const PERMISSIONS_FIELD: &str = "permissions";

/// The signed-in user as returned by the billing server.
///
/// Only `id`, `role`, `roles` and `permissions` carry meaning for the client;
/// every other profile field is kept verbatim so it survives merges and
/// persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionUser(Map<String, Value>);

impl SessionUser {
    /// Create a user with no fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a user from a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Read a single profile field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Consume the user, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// The single `role` string, when set and non-empty.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.0
            .get(ROLE_FIELD)
            .and_then(Value::as_str)
            .filter(|role| !role.is_empty())
    }

    /// `name` of the first entry of `roles`, when present and non-empty.
    #[must_use]
    pub fn first_role_name(&self) -> Option<&str> {
        self.0
            .get(ROLES_FIELD)
            .and_then(Value::as_array)
            .and_then(|roles| roles.first())
            .and_then(|role| role.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Permission names granted to this user. Non-string entries are skipped.
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.0
            .get(PERMISSIONS_FIELD)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Whether `permission` is one of the granted permission names.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions().any(|granted| granted == permission)
    }

    /// Best human-readable label for headers and terminal output.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        ["name", "full_name", "username", "email"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str))
            .filter(|name| !name.is_empty())
    }

    /// Apply sign-in defaults: resolve `role` and ensure `permissions` exists.
    ///
    /// `role` keeps its own value when set, otherwise takes the first entry of
    /// `roles`, otherwise `default_role`.
    #[must_use]
    pub fn normalized(mut self, default_role: &str) -> Self {
        let role = self
            .role()
            .or_else(|| self.first_role_name())
            .unwrap_or(default_role)
            .to_string();
        self.0.insert(ROLE_FIELD.to_string(), Value::String(role));
        if !self.0.contains_key(PERMISSIONS_FIELD) {
            self.0
                .insert(PERMISSIONS_FIELD.to_string(), Value::Array(Vec::new()));
        }
        self
    }

    /// Shallow merge: fields in `partial` replace same-named fields, the rest stay.
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.0.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for SessionUser {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: Value) -> SessionUser {
        SessionUser::from_value(value).expect("object")
    }

    #[test]
    fn test_role_takes_precedence_over_roles() {
        let normalized = user(json!({"role": "Billing", "roles": [{"name": "Admin"}]}))
            .normalized(DEFAULT_ROLE);
        assert_eq!(normalized.role(), Some("Billing"));
    }

    #[test]
    fn test_role_falls_back_to_first_roles_entry() {
        let normalized =
            user(json!({"roles": [{"name": "Admin"}, {"name": "Support"}]})).normalized(DEFAULT_ROLE);
        assert_eq!(normalized.role(), Some("Admin"));
    }

    #[test]
    fn test_role_defaults_when_absent() {
        let normalized = SessionUser::new().normalized(DEFAULT_ROLE);
        assert_eq!(normalized.role(), Some("User"));
        assert_eq!(normalized.get("permissions"), Some(&json!([])));
    }

    #[test]
    fn test_empty_role_string_is_treated_as_absent() {
        let normalized = user(json!({"role": "", "roles": []})).normalized(DEFAULT_ROLE);
        assert_eq!(normalized.role(), Some("User"));
    }

    #[test]
    fn test_existing_permissions_are_kept() {
        let normalized = user(json!({"permissions": ["view_invoices"]})).normalized(DEFAULT_ROLE);
        assert!(normalized.has_permission("view_invoices"));
        assert!(!normalized.has_permission("manage_users"));
    }

    #[test]
    fn test_permissions_skip_non_strings() {
        let subject = user(json!({"permissions": ["view_tickets", 7, null]}));
        assert_eq!(subject.permissions().collect::<Vec<_>>(), vec!["view_tickets"]);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut subject = user(json!({"a": 1, "b": 2}));
        subject.merge(json!({"b": 3, "c": 4}).as_object().cloned().unwrap_or_default());
        assert_eq!(Value::Object(subject.into_fields()), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(SessionUser::from_value(json!(["not", "a", "user"])).is_none());
        assert!(SessionUser::from_value(Value::Null).is_none());
    }

    #[test]
    fn test_display_name_prefers_name() {
        let subject = user(json!({"email": "ops@isp.test", "name": "Ada"}));
        assert_eq!(subject.display_name(), Some("Ada"));
        let subject = user(json!({"email": "ops@isp.test"}));
        assert_eq!(subject.display_name(), Some("ops@isp.test"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let subject = user(json!({"id": 9, "name": "Grace"}));
        let encoded = serde_json::to_value(&subject).expect("serialize");
        assert_eq!(encoded, json!({"id": 9, "name": "Grace"}));
    }
}
