use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;

        if self.password.is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }
        Ok(Self {
            username,
            password: self.password,
        })
    }
}

/// The single administrator account allowed to edit content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Admin {
    pub(crate) username: String,
}

pub(crate) fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.is_empty() || username.len() > 64 {
        return Err(DomainError::validation("username", "must be 1..64 chars"));
    }
    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::{LoginRequest, normalize_username};

    #[test]
    fn login_request_trims_username() {
        let req = LoginRequest {
            username: "  admin  ".to_string(),
            password: "secret".to_string(),
        };

        let validated = req.validate().expect("must be valid");
        assert_eq!(validated.username, "admin");
        assert_eq!(validated.password, "secret");
    }

    #[test]
    fn login_request_rejects_empty_password() {
        let req = LoginRequest {
            username: "admin".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn username_length_is_checked() {
        assert!(normalize_username("   ").is_err());
        assert!(normalize_username(&"a".repeat(65)).is_err());
        assert!(normalize_username("admin").is_ok());
    }
}
