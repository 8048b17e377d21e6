//! Declarative macros for generating CLI parsing and output tests.
//!
//! Each command's `cli_tests.rs` and `output_tests.rs` declare their cases
//! with these macros instead of writing out the test functions.

/// Parse `command` with only its required args and check field defaults.
#[macro_export]
macro_rules! cli_defaults_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($req_arg:literal),*],
        defaults: {
            $($def_field:ident : $def_expected:expr),* $(,)?
        } $(,)?
    ) => {
        #[rstest]
        fn test_defaults() {
            let args = Args::try_parse_from(["json-codec-demo", $cmd, $($req_arg),*]).unwrap();
            match args.command {
                crate::commands::Command::$variant(cmd) => {
                    $(
                        assert_eq!(cmd.$def_field, $def_expected,
                            concat!("Default value mismatch for field: ", stringify!($def_field)));
                    )*
                }
                _ => panic!(concat!("Expected ", stringify!($variant), " command")),
            }
        }
    };
}

/// Parse one option and check the field it sets.
#[macro_export]
macro_rules! cli_option_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let args = Args::try_parse_from([
                "json-codec-demo",
                $cmd,
                $($arg),+
            ]).unwrap();
            match args.command {
                crate::commands::Command::$variant(cmd) => {
                    assert_eq!(cmd.$field, $expected,
                        concat!("Field ", stringify!($field), " mismatch"));
                }
                _ => panic!(concat!("Expected ", stringify!($variant), " command")),
            }
        }
    };
}

/// Like `cli_option_test!`, for commands with required args.
#[macro_export]
macro_rules! cli_option_test_with_required {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($req_arg:literal),+],
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let args = Args::try_parse_from([
                "json-codec-demo",
                $cmd,
                $($req_arg,)+
                $($arg),+
            ]).unwrap();
            match args.command {
                crate::commands::Command::$variant(cmd) => {
                    assert_eq!(cmd.$field, $expected,
                        concat!("Field ", stringify!($field), " mismatch"));
                }
                _ => panic!(concat!("Expected ", stringify!($variant), " command")),
            }
        }
    };
}

/// Parsing without `required_arg` fails and names it.
#[macro_export]
macro_rules! cli_required_arg_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        required_arg: $arg:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from(["json-codec-demo", $cmd]);
            assert!(result.is_err(), concat!("Command should require ", $arg));
            assert!(
                result.unwrap_err().to_string().contains($arg),
                concat!("Error should mention ", $arg)
            );
        }
    };
}

/// Parsing the given args fails.
#[macro_export]
macro_rules! cli_error_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        args: [$($arg:literal),+] $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from([
                "json-codec-demo",
                $cmd,
                $($arg),+
            ]);
            assert!(result.is_err());
        }
    };
}

/// Table output matches `expected` exactly.
#[macro_export]
macro_rules! output_table_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::Outputable;
            assert_eq!($fixture.to_table(), $expected);
        }
    };
}

/// JSON output parses and has the expected top-level fields.
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($field:literal : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Json);
            let parsed: serde_json::Value = serde_json::from_str(&output)
                .expect("Should produce valid JSON");
            $(
                assert_eq!(parsed[$field], $expected, concat!("JSON field mismatch: ", $field));
            )*
        }
    };
}

/// Toon output contains each needle.
#[macro_export]
macro_rules! output_toon_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Toon);
            $(
                assert!(output.contains($needle), concat!("Toon output should contain: ", $needle));
            )*
        }
    };
}
