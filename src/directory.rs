//! User directory lookups for resolving actor display names.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub username: String,
    #[serde(default)]
    pub kansai_employee_id: Option<String>,
}

/// In-memory snapshot of `GET /api/users`, loaded once per page context.
/// When the fetch fails the directory stays empty and lookups fall back to
/// the raw id, so name resolution never blocks an action.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn find(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn display_name(&self, id: &str) -> String {
        self.find(id)
            .map(|user| user.full_name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
