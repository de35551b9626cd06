use std::fmt;
use std::str::FromStr;

use argon2::Argon2;
use hmac::Hmac;
use hmac::Mac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use super::errors::PasswordError;

type HmacSha256 = Hmac<Sha256>;

/// Number of random bytes in a freshly generated salt (hex-encoded on output).
pub const SALT_LENGTH: usize = 256;

const ARGON2_OUTPUT_LENGTH: usize = 32;

/// Keyed derivation used to turn a plaintext password into its stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordAlgorithm {
    /// `HMAC-SHA256(key = salt, message = password)`, compatible with existing credentials.
    #[default]
    HmacSha256,
    /// Raw Argon2id output over the same salt, for deployments without legacy rows.
    Argon2id,
}

impl PasswordAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordAlgorithm::HmacSha256 => "hmac-sha256",
            PasswordAlgorithm::Argon2id => "argon2id",
        }
    }
}

impl fmt::Display for PasswordAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PasswordAlgorithm {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hmac-sha256" => Ok(PasswordAlgorithm::HmacSha256),
            "argon2id" => Ok(PasswordAlgorithm::Argon2id),
            other => Err(PasswordError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Salt and hash pair as persisted alongside a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltedPassword {
    /// Hex-encoded random salt
    pub salt: String,
    /// Hex-encoded derived hash
    pub hash: String,
}

/// Password hashing implementation.
///
/// Derives a salted hash from a plaintext password and verifies a password by
/// recomputing the hash with the stored salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    algorithm: PasswordAlgorithm,
}

impl PasswordHasher {
    /// Create a new password hasher with the default algorithm.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a password hasher for a specific algorithm.
    pub fn with_algorithm(algorithm: PasswordAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash a plaintext password with a freshly generated salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Salt and hash, both hex-encoded
    ///
    /// # Errors
    /// * `HashingFailed` - Derivation failed
    pub fn hash(&self, password: &str) -> Result<SaltedPassword, PasswordError> {
        self.hash_with_salt(password, &generate_salt())
    }

    /// Hash a plaintext password with a caller-provided salt.
    ///
    /// Deterministic: the same password, salt and algorithm always give the same hash.
    pub fn hash_with_salt(
        &self,
        password: &str,
        salt: &str,
    ) -> Result<SaltedPassword, PasswordError> {
        let digest = self.derive(password, salt)?;

        Ok(SaltedPassword {
            salt: salt.to_string(),
            hash: hex::encode(digest),
        })
    }

    /// Verify a password against a stored salt and hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `salt` - Salt stored with the credential
    /// * `expected_hash` - Hex-encoded hash stored with the credential
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored hash is not valid hex or derivation failed
    pub fn verify(
        &self,
        password: &str,
        salt: &str,
        expected_hash: &str,
    ) -> Result<bool, PasswordError> {
        let expected = hex::decode(expected_hash).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        match self.algorithm {
            PasswordAlgorithm::HmacSha256 => {
                let mac = hmac_sha256(password, salt)
                    .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;
                Ok(mac.verify_slice(&expected).is_ok())
            }
            PasswordAlgorithm::Argon2id => {
                let digest = argon2id(password, salt)
                    .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;
                Ok(constant_time_eq(&digest, &expected))
            }
        }
    }

    fn derive(&self, password: &str, salt: &str) -> Result<Vec<u8>, PasswordError> {
        match self.algorithm {
            PasswordAlgorithm::HmacSha256 => {
                hmac_sha256(password, salt).map(|mac| mac.finalize().into_bytes().to_vec())
            }
            PasswordAlgorithm::Argon2id => argon2id(password, salt),
        }
    }
}

/// Generate a new random salt, hex-encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hmac_sha256(password: &str, salt: &str) -> Result<HmacSha256, PasswordError> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    mac.update(password.as_bytes());
    Ok(mac)
}

fn argon2id(password: &str, salt: &str) -> Result<Vec<u8>, PasswordError> {
    let mut output = vec![0u8; ARGON2_OUTPUT_LENGTH];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut output)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    Ok(output)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let salted = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher
            .verify(password, &salted.salt, &salted.hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &salted.salt, &salted.hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_is_never_plaintext() {
        let hasher = PasswordHasher::new();
        let salted = hasher.hash("p").expect("Failed to hash password");

        assert_ne!(salted.hash, "p");
        // 32-byte SHA-256 MAC, hex-encoded
        assert_eq!(salted.hash.len(), 64);
    }

    #[test]
    fn test_generated_salt_is_hex_of_256_bytes() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LENGTH * 2);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(salt, generate_salt());
    }

    #[test]
    fn test_hash_with_salt_is_deterministic() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash_with_salt("password", "salt").unwrap();
        let second = hasher.hash_with_salt("password", "salt").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.salt, "salt");
    }

    #[test]
    fn test_hmac_sha256_known_vector() {
        // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?"
        let hasher = PasswordHasher::with_algorithm(PasswordAlgorithm::HmacSha256);
        let salted = hasher
            .hash_with_salt("what do ya want for nothing?", "Jefe")
            .unwrap();

        assert_eq!(
            salted.hash,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_different_passwords_give_different_hashes() {
        let hasher = PasswordHasher::new();
        let salt = generate_salt();

        let a = hasher.hash_with_salt("password-a", &salt).unwrap();
        let b = hasher.hash_with_salt("password-b", &salt).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_same_password_fresh_salts_differ() {
        let hasher = PasswordHasher::new();

        let a = hasher.hash("password").unwrap();
        let b = hasher.hash("password").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_argon2id_hash_and_verify() {
        let hasher = PasswordHasher::with_algorithm(PasswordAlgorithm::Argon2id);
        let salted = hasher.hash("hunter2").expect("Failed to hash password");

        assert_eq!(salted.hash.len(), ARGON2_OUTPUT_LENGTH * 2);
        assert!(hasher.verify("hunter2", &salted.salt, &salted.hash).unwrap());
        assert!(!hasher.verify("hunter3", &salted.salt, &salted.hash).unwrap());
    }

    #[test]
    fn test_algorithms_are_not_interchangeable() {
        let hmac = PasswordHasher::with_algorithm(PasswordAlgorithm::HmacSha256);
        let argon = PasswordHasher::with_algorithm(PasswordAlgorithm::Argon2id);

        let salted = hmac.hash("password").unwrap();
        assert!(!argon.verify("password", &salted.salt, &salted.hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("password", "salt", "not-hex");
        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }

    #[test]
    fn test_verify_truncated_hash() {
        let hasher = PasswordHasher::new();
        let salted = hasher.hash_with_salt("password", "salt").unwrap();

        let truncated = &salted.hash[..32];
        assert!(!hasher.verify("password", "salt", truncated).unwrap());
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!(
            "hmac-sha256".parse::<PasswordAlgorithm>().unwrap(),
            PasswordAlgorithm::HmacSha256
        );
        assert_eq!(
            "Argon2id".parse::<PasswordAlgorithm>().unwrap(),
            PasswordAlgorithm::Argon2id
        );
        assert!("bcrypt".parse::<PasswordAlgorithm>().is_err());
        assert_eq!(PasswordAlgorithm::default().to_string(), "hmac-sha256");
    }
}
