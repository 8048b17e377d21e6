//! CLI parsing tests for json-row command.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_defaults_test! {
        command: "json-row",
        variant: JsonRow,
        required_args: [],
        defaults: {
            ids: vec![1, 2],
        },
    }

    crate::cli_option_test! {
        command: "json-row",
        variant: JsonRow,
        test_name: test_with_single_id,
        args: ["--ids", "2"],
        field: ids,
        expected: vec![2],
    }

    crate::cli_option_test! {
        command: "json-row",
        variant: JsonRow,
        test_name: test_with_comma_separated_ids,
        args: ["--ids", "2,1,7"],
        field: ids,
        expected: vec![2, 1, 7],
    }

    crate::cli_error_test! {
        command: "json-row",
        test_name: test_non_numeric_id_rejected,
        args: ["--ids", "alice"],
    }
}
