use serde::Deserialize;
use serde::Serialize;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordAlgorithm;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::SaltedPassword;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Holds the process-wide signing secret (inside its [`JwtHandler`]) and the
/// configured password algorithm. Built once at startup and shared read-only.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator using the default password algorithm.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_password_algorithm(jwt_secret, PasswordAlgorithm::default())
    }

    /// Create a new authenticator with an explicit password algorithm.
    pub fn with_password_algorithm(jwt_secret: &[u8], algorithm: PasswordAlgorithm) -> Self {
        Self {
            password_hasher: PasswordHasher::with_algorithm(algorithm),
            jwt_handler: JwtHandler::new(jwt_secret),
        }
    }

    /// Hash a password for storage with a freshly generated salt.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<SaltedPassword, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `salt` - Salt stored with the credential
    /// * `stored_hash` - Stored password hash
    /// * `claims` - JWT claims to encode in token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate<T: Serialize>(
        &self,
        password: &str,
        salt: &str,
        stored_hash: &str,
        claims: &T,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, salt, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.encode(claims)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Generate JWT token without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate and decode JWT token.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::Claims;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_authenticate_success() {
        let authenticator = Authenticator::new(SECRET);

        let password = "my_password";
        let salted = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let claims = Claims::for_user("user123", 24);
        let result = authenticator
            .authenticate(password, &salted.salt, &salted.hash, &claims)
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let decoded: Claims = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.sub, Some("user123".to_string()));
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(SECRET);

        let salted = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let claims = Claims::for_user("user123", 24);

        let result =
            authenticator.authenticate("wrong_password", &salted.salt, &salted.hash, &claims);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_with_argon2id() {
        let authenticator =
            Authenticator::with_password_algorithm(SECRET, PasswordAlgorithm::Argon2id);

        let salted = authenticator.hash_password("correct horse").unwrap();
        let claims = Claims::for_user("user123", 1);

        assert!(authenticator
            .authenticate("correct horse", &salted.salt, &salted.hash, &claims)
            .is_ok());
        assert!(matches!(
            authenticator.authenticate("battery staple", &salted.salt, &salted.hash, &claims),
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_corrupt_stored_hash() {
        let authenticator = Authenticator::new(SECRET);
        let claims = Claims::for_user("user123", 1);

        let result = authenticator.authenticate("password", "salt", "zz", &claims);
        assert!(matches!(result, Err(AuthenticationError::PasswordError(_))));
    }

    #[test]
    fn test_generate_and_validate_token() {
        let authenticator = Authenticator::new(SECRET);

        let claims = Claims::new().with_subject("user123").with_issued_at(1);

        let token = authenticator
            .generate_token(&claims)
            .expect("Failed to generate token");

        let decoded: Claims = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(SECRET);

        let result = authenticator.validate_token::<Claims>("invalid.token.here");
        assert!(result.is_err());
    }
}
