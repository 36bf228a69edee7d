//! Time formatting and shared traits

/// Formats a millisecond position as a clock string
///
/// `HH:MM:SS` when the value reaches an hour, `MM:SS` otherwise, every field zero-padded
/// to two digits. Negative input formats as zero.
pub fn format_clock(millis: i64) -> String {
    let total_seconds = millis.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Trait for types that can validate themselves
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

    #[test]
    fn test_clock_without_hours() {
        assert_eq!(format_clock(125_000), "02:05");
    }

    #[test]
    fn test_clock_with_hours() {
        assert_eq!(format_clock(3_725_000), "01:02:05");
    }

    #[test]
    fn test_clock_zero_and_negative() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(-5_000), "00:00");
    }

    #[test]
    fn test_clock_truncates_partial_seconds() {
        assert_eq!(format_clock(59_999), "00:59");
        assert_eq!(format_clock(3_599_999), "59:59");
        assert_eq!(format_clock(3_600_000), "01:00:00");
    }

    #[test]
    fn test_clock_many_hours() {
        assert_eq!(format_clock(100 * 3_600_000), "100:00:00");
    }


    #[test]
    fn test_validator_trait() {
        struct TestType {
            value: i32,
        }

        impl Validator for TestType {
            fn validate(&self) -> Result<(), Vec<String>> {
                if self.value < 0 {
                    Err(vec!["Value must be positive".to_string()])
                } else {
                    Ok(())
                }
            }
        }

        assert!(TestType { value: 10 }.is_valid());
        assert!(!TestType { value: -5 }.is_valid());
    }
}
