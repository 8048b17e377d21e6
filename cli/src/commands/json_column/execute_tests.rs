//! Execute tests for json-column command.

#[cfg(test)]
mod tests {
    use super::super::JsonColumnCmd;
    use super::super::execute::{InsertMode, JsonColumnResult};
    use crate::commands::{Context, Execute};
    use crate::domain::demo_registry;
    use json_codec::backend::open_mem_session;
    use json_codec::test_utils::setup_test_session;
    use json_codec::Session;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn run(session: &dyn Session, ids: Vec<i32>) -> Result<JsonColumnResult, Box<dyn std::error::Error>> {
        let registry = demo_registry().unwrap();
        let ctx = Context::new(&registry, Some(session));
        JsonColumnCmd { ids }.execute(&ctx)
    }

    #[rstest]
    fn test_literal_and_bound_inserts_read_back() {
        let session = open_mem_session().unwrap();
        let result = run(session.as_ref(), vec![1, 2]).unwrap();

        let modes: Vec<InsertMode> = result.inserted.iter().map(|d| d.mode).collect();
        assert_eq!(modes, vec![InsertMode::Literal, InsertMode::Bound]);

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].document, json!({"name": "alice", "age": 30}));
        assert_eq!(result.rows[1].document, json!({"name": "bob", "age": 35}));
    }

    #[rstest]
    fn test_raw_text_matches_decoded_document() {
        let session = open_mem_session().unwrap();
        let result = run(session.as_ref(), vec![2]).unwrap();
        let entry = &result.rows[0];
        let reparsed: Value = serde_json::from_str(&entry.raw).unwrap();
        assert_eq!(reparsed, entry.document);
    }

    #[rstest]
    fn test_array_document_is_rejected() {
        let schema = crate::scripts::script("cozo", "json_column_schema").unwrap();
        let session = setup_test_session(schema);
        session
            .execute_unbound(r#"?[id, json] <- [[5, "[1, 2]"]] :put json_column {id => json}"#)
            .unwrap();
        let err = run(session.as_ref(), vec![5]).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, found array"));
    }

    #[rstest]
    fn test_no_matching_ids() {
        let session = open_mem_session().unwrap();
        let result = run(session.as_ref(), vec![42]).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.inserted.len(), 2);
    }
}
