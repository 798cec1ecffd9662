//! User domain types and validation rules.

use serde::{Deserialize, Serialize};
use usermgmt_core::{AppError, AppResult, NonEmptyString};

use crate::{RoleId, UserId, WellKnownRole};

/// Validated login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(NonEmptyString);

impl Username {
    /// Creates a username, rejecting empty and whitespace-only values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::new(value)
            .map(Self)
            .map_err(|_| AppError::InvalidInput("username must not be empty".to_owned()))
    }

    /// Returns the validated username.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0.into()
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Accepts `local@domain` where the local part is made of ASCII letters,
    /// digits and `+ _ . -`, and the domain is any non-empty single-line text.
    /// The value is stored exactly as given.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        let Some((local, domain)) = value.split_once('@') else {
            return Err(AppError::InvalidInput(format!(
                "invalid email format '{value}': missing '@'"
            )));
        };

        if local.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "invalid email format '{value}': empty local part"
            )));
        }

        if !local.chars().all(is_local_part_char) {
            return Err(AppError::InvalidInput(format!(
                "invalid email format '{value}': unsupported character in local part"
            )));
        }

        if domain.is_empty() || domain.chars().any(is_line_terminator) {
            return Err(AppError::InvalidInput(format!(
                "invalid email format '{value}': empty or multi-line domain"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

fn is_local_part_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '+' | '_' | '.' | '-')
}

fn is_line_terminator(character: char) -> bool {
    matches!(
        character,
        '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-generated identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Assigned role.
    pub role_id: RoleId,
    /// Name of the assigned role at read time.
    pub role_name: String,
}

impl User {
    /// Returns whether the user currently holds the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role_name == WellKnownRole::Admin.as_str()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn valid_email_is_accepted_verbatim() {
        let email = EmailAddress::new("Admin@Test.com").unwrap_or_else(|_| panic!("test"));
        assert_eq!(email.as_str(), "Admin@Test.com");
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(matches!(
            EmailAddress::new("noatsign"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn email_with_empty_local_part_is_rejected() {
        assert!(EmailAddress::new("@test.com").is_err());
    }

    #[test]
    fn email_with_empty_domain_is_rejected() {
        assert!(EmailAddress::new("user@").is_err());
    }

    #[test]
    fn email_with_space_in_local_part_is_rejected() {
        assert!(EmailAddress::new("first last@test.com").is_err());
    }

    #[test]
    fn email_domain_needs_no_dot() {
        assert!(EmailAddress::new("user@localhost").is_ok());
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(matches!(Username::new(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            Username::new(" \t "),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn admin_role_name_marks_admin_user() {
        let user = User {
            id: UserId::new(1),
            username: "admin".to_owned(),
            email: "admin@test.com".to_owned(),
            role_id: RoleId::new(1),
            role_name: "ADMIN".to_owned(),
        };
        assert!(user.is_admin());
    }

    proptest! {
        #[test]
        fn well_formed_emails_round_trip(
            local in "[A-Za-z0-9+_.-]{1,20}",
            domain in "[a-z0-9.-]{1,20}",
        ) {
            let raw = format!("{local}@{domain}");
            let email = EmailAddress::new(raw.clone());
            prop_assert!(email.is_ok());
            prop_assert_eq!(email.map(String::from).ok(), Some(raw));
        }

        #[test]
        fn text_without_at_is_never_an_email(value in "[^@]{0,30}") {
            prop_assert!(EmailAddress::new(value).is_err());
        }

        #[test]
        fn usernames_with_visible_characters_are_accepted(value in "[a-z]{1,10}") {
            prop_assert!(Username::new(value).is_ok());
        }
    }
}
