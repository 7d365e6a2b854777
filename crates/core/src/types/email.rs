//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
    /// The input contains whitespace inside the address.
    #[error("email cannot contain whitespace")]
    ContainsWhitespace,
}

/// An email address.
///
/// Surrounding whitespace is trimmed before validation, since the value
/// usually comes straight out of a registration form.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - No interior whitespace
/// - Local part (before @) and domain (after the last @) must not be empty
///
/// ## Examples
///
/// ```
/// use bazaar_core::Email;
///
/// assert!(Email::parse("user@example.com").is_ok());
/// assert_eq!(Email::parse("  user@example.com ").unwrap().as_str(), "user@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("user@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first constraint the input
    /// violates.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let (local, domain) = s.rsplit_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Wrap an address the backend has already stored, without re-checking
    /// it against the form rules above.
    #[must_use]
    pub fn from_backend(value: String) -> Self {
        match Self::parse(&value) {
            Ok(email) => email,
            Err(_) => Self(value.trim().to_owned()),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part of the email (after the last @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
