//! CLI parsing tests for decode command.

#[cfg(test)]
mod tests {
    use super::super::{CodecChoice, WireChoice};
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_required_arg_test! {
        command: "decode",
        test_name: test_requires_codec,
        required_arg: "--codec",
    }

    crate::cli_defaults_test! {
        command: "decode",
        variant: Decode,
        required_args: ["--codec", "user", "{}"],
        defaults: {
            wire: WireChoice::Text,
            payload: "{}".to_string(),
        },
    }

    crate::cli_option_test_with_required! {
        command: "decode",
        variant: Decode,
        required_args: ["{}"],
        test_name: test_with_structure_codec,
        args: ["-c", "structure"],
        field: codec,
        expected: CodecChoice::Structure,
    }

    crate::cli_option_test_with_required! {
        command: "decode",
        variant: Decode,
        required_args: ["-c", "raw", "[]"],
        test_name: test_with_json_wire,
        args: ["--wire", "json"],
        field: wire,
        expected: WireChoice::Json,
    }

    crate::cli_error_test! {
        command: "decode",
        test_name: test_unknown_codec_rejected,
        args: ["--codec", "yaml", "{}"],
    }

    crate::cli_error_test! {
        command: "decode",
        test_name: test_payload_required,
        args: ["--codec", "user"],
    }
}
