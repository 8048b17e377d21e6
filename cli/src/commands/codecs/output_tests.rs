//! Output formatting tests for codecs command.

#[cfg(test)]
mod tests {
    use super::super::execute::{CodecEntry, CodecsResult};
    use rstest::{fixture, rstest};

    const EMPTY_TABLE_OUTPUT: &str = "No codecs registered.";

    const FULL_TABLE_OUTPUT: &str = "\
Registered codecs (3):
  demo::User           <->  text
  demo::JsonStructure  <->  json
  demo::JsonStructure  <->  text";

    #[fixture]
    fn empty_result() -> CodecsResult {
        CodecsResult::default()
    }

    #[fixture]
    fn full_result() -> CodecsResult {
        let entry = |domain: &str, wire: &str| CodecEntry {
            domain: domain.to_string(),
            wire: wire.to_string(),
        };
        CodecsResult {
            codecs: vec![
                entry("demo::User", "text"),
                entry("demo::JsonStructure", "json"),
                entry("demo::JsonStructure", "text"),
            ],
        }
    }

    crate::output_table_test! {
        test_name: test_to_table_empty,
        fixture: empty_result,
        fixture_type: CodecsResult,
        expected: EMPTY_TABLE_OUTPUT,
    }

    crate::output_table_test! {
        test_name: test_to_table_aligns_domains,
        fixture: full_result,
        fixture_type: CodecsResult,
        expected: FULL_TABLE_OUTPUT,
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: full_result,
        fixture_type: CodecsResult,
        assertions: {
            "codecs": serde_json::json!([
                {"domain": "demo::User", "wire": "text"},
                {"domain": "demo::JsonStructure", "wire": "json"},
                {"domain": "demo::JsonStructure", "wire": "text"},
            ]),
        },
    }

    crate::output_toon_test! {
        test_name: test_format_toon,
        fixture: full_result,
        fixture_type: CodecsResult,
        contains: ["codecs", "demo::User", "text"],
    }
}
