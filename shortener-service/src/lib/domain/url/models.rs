use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::domain::url::errors::ShortCodeError;
use crate::domain::url::errors::TargetUrlError;
use crate::domain::user::models::UserId;

/// Short code to target URL mapping owned by a user.
#[derive(Debug, Clone)]
pub struct UrlRecord {
    pub id: UrlId,
    pub short_code: ShortCode,
    pub target_url: TargetUrl,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UrlId(pub Uuid);

impl UrlId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UrlId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UrlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Short code value type
///
/// 1-225 characters of alphanumerics, underscore and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    const MAX_LENGTH: usize = 225;
    pub const GENERATED_LENGTH: usize = 8;

    /// Create a new valid short code.
    ///
    /// # Errors
    /// * `Empty` - Code is empty
    /// * `TooLong` - Code longer than 225 characters
    /// * `InvalidCharacters` - Contains characters other than alphanumerics, `_` and `-`
    pub fn new(code: String) -> Result<Self, ShortCodeError> {
        if code.is_empty() {
            return Err(ShortCodeError::Empty);
        }

        let length = code.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ShortCodeError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ShortCodeError::InvalidCharacters);
        }

        Ok(Self(code))
    }

    /// Generate a random alphanumeric code.
    pub fn generate() -> Self {
        let code = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::GENERATED_LENGTH)
            .map(char::from)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Absolute http(s) URL a short code points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl(String);

impl TargetUrl {
    const MAX_LENGTH: usize = 2048;

    /// # Errors
    /// * `Empty`, `UnsupportedScheme`, `MissingHost`, `ContainsWhitespace`, `TooLong`
    pub fn new(url: String) -> Result<Self, TargetUrlError> {
        if url.is_empty() {
            return Err(TargetUrlError::Empty);
        }

        let length = url.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(TargetUrlError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        if url.chars().any(char::is_whitespace) {
            return Err(TargetUrlError::ContainsWhitespace);
        }

        let lowercase = url.to_ascii_lowercase();
        let rest = lowercase
            .strip_prefix("https://")
            .or_else(|| lowercase.strip_prefix("http://"))
            .ok_or(TargetUrlError::UnsupportedScheme)?;

        let host = rest
            .split(|c: char| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        if host.is_empty() {
            return Err(TargetUrlError::MissingHost);
        }

        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to store a new short URL for the authenticated user
#[derive(Debug)]
pub struct CreateUrlCommand {
    pub target_url: TargetUrl,
    /// Caller-chosen code; generated when absent
    pub short_code: Option<ShortCode>,
    pub user_id: UserId,
}

impl CreateUrlCommand {
    pub fn new(target_url: TargetUrl, short_code: Option<ShortCode>, user_id: UserId) -> Self {
        Self {
            target_url,
            short_code,
            user_id,
        }
    }
}
