//! Unit tests for SourceLocation

use core_types::SourceLocation;

#[cfg(test)]
mod source_location_tests {
    use super::*;

    #[test]
    fn test_caller_records_this_file() {
        let loc = SourceLocation::caller();
        assert!(loc.file.ends_with("test_source.rs"));
    }

    #[test]
    fn test_caller_line_advances() {
        let first = SourceLocation::caller();
        let second = SourceLocation::caller();
        assert_eq!(second.line, first.line + 1);
    }

    #[track_caller]
    fn located() -> SourceLocation {
        SourceLocation::caller()
    }

    #[test]
    fn test_track_caller_propagates() {
        let here = SourceLocation::caller();
        let through = located();
        assert_eq!(through.line, here.line + 1);
    }

    #[test]
    fn test_display() {
        let loc = SourceLocation {
            file: "producer.rs",
            line: 3,
            column: 14,
        };
        assert_eq!(format!("{}", loc), "producer.rs:3:14");
    }
}
