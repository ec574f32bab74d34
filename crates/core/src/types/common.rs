//! Traits shared across domain models

/// Trait for types that can check their own invariants
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Percent(u8);

    impl Validator for Percent {
        fn validate(&self) -> Result<(), Vec<String>> {
            if self.0 > 100 {
                Err(vec!["Percent must be at most 100".to_string()])
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_is_valid_follows_validate() {
        assert!(Percent(40).is_valid());
        assert!(!Percent(140).is_valid());
        assert_eq!(Percent(140).validate().unwrap_err().len(), 1);
    }
}
