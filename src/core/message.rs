use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Fixed texts shown in the transcript when the server does not supply one.
pub mod fallback {
    pub const NAME_REQUIRED: &str = "Please enter your name to start.";
    pub const WELCOME: &str =
        "Welcome! I'm your personal cooking assistant. What would you like to cook today?";
    pub const START_FAILED: &str =
        "Sorry, I couldn't start your session. Please check the connection and try again.";
    pub const NO_RESPONSE: &str = "Sorry, I didn't get a response. Please try again.";
    pub const NETWORK_ERROR: &str =
        "Sorry, I couldn't reach the kitchen. Please check your connection and try again.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_match_serialized_form() {
        for role in [Role::User, Role::Assistant] {
            let json = serde_json::to_string(&role).expect("serialize");
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).expect("serialize");
        assert_eq!(json, "\"assistant\"");
    }
}
