use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{info, warn};

use crate::domain::credentials::{Admin, LoginRequest, normalize_username};
use crate::domain::error::DomainError;
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) admin: Admin,
    pub(crate) access_token: String,
}

/// Credential check for the one administrator account.
///
/// Only an argon2 hash of the configured password is kept in memory.
pub(crate) struct AuthService {
    admin: Admin,
    password_hash: String,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub(crate) fn new(
        username: &str,
        password: &str,
        jwt: Arc<JwtService>,
    ) -> Result<Self, DomainError> {
        let username = normalize_username(username)?;
        let password_hash = hash_password(password)?;

        Ok(Self {
            admin: Admin { username },
            password_hash,
            jwt,
        })
    }

    pub(crate) fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        // the hash is checked even for a wrong username so both failures take the same time
        let password_result = verify_password(&req.password, &self.password_hash);
        if req.username != self.admin.username {
            warn!(username = %req.username, "login attempt for unknown user");
            return Err(DomainError::InvalidCredentials);
        }
        password_result.inspect_err(|err| {
            if matches!(err, DomainError::InvalidCredentials) {
                warn!(username = %req.username, "login attempt with wrong password");
            }
        })?;

        let access_token = self
            .jwt
            .generate_token(&self.admin.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        info!(username = %self.admin.username, "administrator logged in");
        Ok(AuthResult {
            admin: self.admin.clone(),
            access_token,
        })
    }

    /// Resolves the bearer token of a request to the administrator it was issued to.
    pub(crate) fn authenticate(&self, token: &str) -> Option<Admin> {
        let claims = self.jwt.verify_token(token).ok()?;
        (claims.sub == self.admin.username).then(|| self.admin.clone())
    }
}

fn hash_password(raw_password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2()?
        .hash_password(raw_password.as_bytes(), &salt)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    Ok(password_hash.to_string())
}

fn verify_password(raw_password: &str, password_hash: &str) -> Result<(), DomainError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|err| DomainError::Unexpected(err.to_string()))?;
    argon2()?
        .verify_password(raw_password.as_bytes(), &parsed_hash)
        .map_err(|err| match err {
            PasswordHashError::Password => DomainError::InvalidCredentials,
            _ => DomainError::Unexpected(err.to_string()),
        })
}

fn argon2() -> Result<Argon2<'static>, DomainError> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::AuthService;
    use crate::domain::credentials::LoginRequest;
    use crate::domain::error::DomainError;
    use crate::infrastructure::jwt::JwtService;

    fn test_jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 3600))
    }

    fn service() -> AuthService {
        AuthService::new("admin", "correct-password", test_jwt()).expect("service must build")
    }

    #[test]
    fn login_returns_token_for_configured_pair() {
        let service = service();

        let result = service
            .login(LoginRequest {
                username: " admin ".to_string(),
                password: "correct-password".to_string(),
            })
            .expect("login must succeed");

        assert_eq!(result.admin.username, "admin");
        assert!(!result.access_token.is_empty());

        let admin = service
            .authenticate(&result.access_token)
            .expect("token must authenticate");
        assert_eq!(admin.username, "admin");
    }

    #[test]
    fn login_rejects_wrong_password() {
        let err = service()
            .login(LoginRequest {
                username: "admin".to_string(),
                password: "wrong-password".to_string(),
            })
            .expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[test]
    fn login_rejects_unknown_user_even_with_right_password() {
        let err = service()
            .login(LoginRequest {
                username: "teacher".to_string(),
                password: "correct-password".to_string(),
            })
            .expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[test]
    fn password_with_surrounding_spaces_must_match_exactly() {
        let service =
            AuthService::new("admin", "  pass phrase  ", test_jwt()).expect("service must build");

        let login = |password: &str| {
            service.login(LoginRequest {
                username: "admin".to_string(),
                password: password.to_string(),
            })
        };
        assert!(login("  pass phrase  ").is_ok());
        assert!(matches!(
            login("pass phrase"),
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[test]
    fn password_is_not_kept_in_plain_text() {
        let service = service();
        assert!(service.password_hash.starts_with("$argon2id$"));
        assert!(!service.password_hash.contains("correct-password"));
    }

    #[test]
    fn authenticate_rejects_token_for_other_subject() {
        let jwt = test_jwt();
        let service = AuthService::new("admin", "pw", jwt.clone()).expect("service must build");
        let token = jwt.generate_token("someone-else").expect("token");

        assert!(service.authenticate(&token).is_none());
        assert!(service.authenticate("garbage").is_none());
    }
}
