//! Field validation helpers.
//!
//! These implement the user-facing invariants: email shape, full-name
//! shape, and password length bounds. Messages are collected per request
//! so a form can show every violation at once.

/// Minimum plaintext password length (inclusive).
pub const PASSWORD_MIN_LEN: usize = 8;

/// Maximum plaintext password length (inclusive).
pub const PASSWORD_MAX_LEN: usize = 20;

/// Validate email address format.
///
/// This checks the basic `local@domain.tld` shape:
/// - exactly one `@`
/// - non-empty local and domain parts
/// - domain contains at least one dot
/// - total length between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use gather_server::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@nodot"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    // Domain must contain at least one dot
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Validate full-name shape.
///
/// A full name must split on spaces into at least two non-blank tokens
/// ("first name and last name").
///
/// # Examples
///
/// ```
/// use gather_server::utils::is_valid_full_name;
///
/// assert!(is_valid_full_name("Jane Doe"));
/// assert!(is_valid_full_name("Ana Maria Silva"));
/// assert!(!is_valid_full_name("Jane"));
/// assert!(!is_valid_full_name("   "));
/// ```
#[must_use]
pub fn is_valid_full_name(full_name: &str) -> bool {
    full_name.split(' ').filter(|name| !name.trim().is_empty()).count() >= 2
}

/// Collect validation messages for signup input.
///
/// Returns an empty vector when every invariant holds. Messages mirror
/// the client's expectations (one human-readable sentence per violation).
#[must_use]
pub fn validate_signup(
    full_name: &str,
    email_address: &str,
    password: &str,
    password_confirmation: &str,
) -> Vec<String> {
    let mut errors = Vec::new();

    if full_name.trim().is_empty() {
        errors.push("Full name can't be blank".to_string());
    } else if !is_valid_full_name(full_name) {
        errors.push("Full name must comprise of a first name and a last name".to_string());
    }

    if email_address.trim().is_empty() {
        errors.push("Email address can't be blank".to_string());
    } else if !is_valid_email(email_address) {
        errors.push("Email address format is invalid".to_string());
    }

    if password.is_empty() {
        errors.push("Password can't be blank".to_string());
    } else if password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(format!(
            "Password is too short (minimum is {PASSWORD_MIN_LEN} characters)"
        ));
    } else if password.chars().count() > PASSWORD_MAX_LEN {
        errors.push(format!(
            "Password is too long (maximum is {PASSWORD_MAX_LEN} characters)"
        ));
    }

    if password != password_confirmation {
        errors.push("Password confirmation doesn't match Password".to_string());
    }

    errors
}

/// Collect validation messages for event creation input.
#[must_use]
pub fn validate_event(
    event_name: &str,
    event_location: &str,
    event_description: &str,
    available_spots: i64,
    event_start: Option<chrono::DateTime<chrono::Utc>>,
    event_end: Option<chrono::DateTime<chrono::Utc>>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if event_name.trim().is_empty() {
        errors.push("Event name can't be blank".to_string());
    }
    if event_location.trim().is_empty() {
        errors.push("Event location can't be blank".to_string());
    }
    if event_description.trim().is_empty() {
        errors.push("Event description can't be blank".to_string());
    }
    if available_spots < 1 {
        errors.push("Available spots must be greater than 0".to_string());
    } else if available_spots > i64::from(i32::MAX) {
        errors.push("Available spots is out of range".to_string());
    }
    if let (Some(start), Some(end)) = (event_start, event_end) {
        if end <= start {
            errors.push("Event end must be after event start".to_string());
        }
    }

    errors
}

/// Lowercase an email address for case-insensitive storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_requires_two_tokens() {
        assert!(!is_valid_full_name("Jane"));
        assert!(!is_valid_full_name(""));
        assert!(!is_valid_full_name("Jane "));
        assert!(is_valid_full_name("Jane Doe"));
    }

    #[test]
    fn signup_validation_collects_every_violation() {
        let errors = validate_signup("Jane", "not-an-email", "short", "different");
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn password_boundaries_are_inclusive() {
        assert!(validate_signup("Jane Doe", "jane@x.com", "12345678", "12345678").is_empty());
        let twenty = "a".repeat(20);
        assert!(validate_signup("Jane Doe", "jane@x.com", &twenty, &twenty).is_empty());

        let errors = validate_signup("Jane Doe", "jane@x.com", "1234567", "1234567");
        assert_eq!(
            errors,
            vec!["Password is too short (minimum is 8 characters)".to_string()]
        );
        let twenty_one = "a".repeat(21);
        let errors = validate_signup("Jane Doe", "jane@x.com", &twenty_one, &twenty_one);
        assert_eq!(
            errors,
            vec!["Password is too long (maximum is 20 characters)".to_string()]
        );
    }

    #[test]
    fn event_validation_requires_positive_capacity() {
        let errors = validate_event("Picnic", "Park", "Bring food", 0, None, None);
        assert_eq!(
            errors,
            vec!["Available spots must be greater than 0".to_string()]
        );
        assert!(validate_event("Picnic", "Park", "Bring food", 1, None, None).is_empty());
    }

    #[test]
    fn event_end_must_follow_start() {
        let start = chrono::Utc::now();
        let end = start - chrono::Duration::hours(1);
        let errors = validate_event("Picnic", "Park", "Bring food", 5, Some(start), Some(end));
        assert_eq!(errors, vec!["Event end must be after event start".to_string()]);
    }

    #[test]
    fn emails_normalize_to_lowercase() {
        assert_eq!(normalize_email("  A@X.COM "), "a@x.com");
    }
}
