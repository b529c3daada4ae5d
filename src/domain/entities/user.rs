use serde::Deserialize;
use std::fmt;

/// Represents a Discord user in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            global_name: None,
        }
    }

    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefers_global_name() {
        let user = User::new("1", "alice_01");
        assert_eq!(user.to_string(), "alice_01");
        let user = user.with_global_name("Alice");
        assert_eq!(user.to_string(), "Alice");
    }
}
