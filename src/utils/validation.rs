//! Request field helpers shared by the handlers. Format rules live on the
//! request structs as `validator` attributes.

use crate::error::{AppError, AppResult};

/// Trimmed value of an optional text field, `None` when absent or blank.
pub fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Like [`present`] but a missing value is a 400 naming the field.
pub fn required(value: &Option<String>, field: &str) -> AppResult<String> {
    present(value).ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_trims_and_drops_blank() {
        assert_eq!(present(&Some("  Jo ".into())), Some("Jo".into()));
        assert_eq!(present(&Some("   ".into())), None);
        assert_eq!(present(&None), None);
    }

    #[test]
    fn test_required_names_the_field() {
        match required(&None, "phone") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "phone is required"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Owner@Wash.IO "), "owner@wash.io");
    }
}
