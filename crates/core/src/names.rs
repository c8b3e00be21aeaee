#![forbid(unsafe_code)]

const MAX_NAME_LEN: usize = 256;

/// Checks a tag or value name before it is stored.
///
/// Names surface as directory entries in the virtual filesystem, so path
/// separators and the `.`/`..` entries are rejected alongside control characters.
pub fn validate_name(value: &str) -> Result<(), NameError> {
    if value.trim().is_empty() {
        return Err(NameError::Empty);
    }
    if value.len() > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }
    if value == "." || value == ".." {
        return Err(NameError::DotEntry);
    }
    if value.contains('/') {
        return Err(NameError::ContainsSlash);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(NameError::ContainsControl);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong,
    DotEntry,
    ContainsSlash,
    ContainsControl,
}

impl NameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "name must not be empty",
            Self::TooLong => "name is too long",
            Self::DotEntry => "name must not be '.' or '..'",
            Self::ContainsSlash => "name must not contain '/'",
            Self::ContainsControl => "name contains control characters",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert_eq!(validate_name("").unwrap_err(), NameError::Empty);
        assert_eq!(validate_name("   ").unwrap_err(), NameError::Empty);
        assert_eq!(validate_name("..").unwrap_err(), NameError::DotEntry);
        assert_eq!(validate_name("a/b").unwrap_err(), NameError::ContainsSlash);
        assert_eq!(
            validate_name("bad\u{0007}name").unwrap_err(),
            NameError::ContainsControl
        );
        assert_eq!(
            validate_name(&"x".repeat(MAX_NAME_LEN + 1)).unwrap_err(),
            NameError::TooLong
        );
        assert!(validate_name("holiday photos").is_ok());
        assert!(validate_name("rating").is_ok());
    }
}
