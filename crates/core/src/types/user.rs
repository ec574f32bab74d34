//! The signed-in reader

use serde::{Deserialize, Serialize};

/// User profile returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// Creates a user record
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// First name, for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let user = User::new("1", "Clarice Lispector", "clarice@example.com");
        assert_eq!(user.first_name(), "Clarice");

        let single = User::new("2", "Pagu", "pagu@example.com");
        assert_eq!(single.first_name(), "Pagu");
    }

    #[test]
    fn test_user_serialization() {
        let user = User::new("1", "Jorge Amado", "jorge@example.com");
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }
}
