//! Demo schema and statement scripts, embedded per backend.
//!
//! Scripts live under `scripts/<backend>/<name>`. Inline values are spliced
//! into `{{token}}` markers; bound parameters keep their `$name` form.

use std::error::Error;

use include_dir::{Dir, include_dir};

static SCRIPTS: Dir = include_dir!("$CARGO_MANIFEST_DIR/scripts");

/// The script `name` for `backend`, trimmed.
pub fn script(backend: &str, name: &str) -> Result<&'static str, Box<dyn Error>> {
    SCRIPTS
        .get_file(format!("{backend}/{name}"))
        .and_then(|file| file.contents_utf8())
        .map(str::trim)
        .ok_or_else(|| format!("No '{}' script for the {} backend", name, backend).into())
}

/// Replace each `{{token}}` with its value.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |text, (token, value)| {
        text.replace(&format!("{{{{{token}}}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cozo", "json_row_schema")]
    #[case("cozo", "json_row_clear")]
    #[case("cozo", "json_column_schema")]
    #[case("cozo", "json_column_insert")]
    #[case("cozo", "json_column_insert_literal")]
    #[case("cozo", "json_column_select")]
    #[case("postgres", "json_row_schema")]
    #[case("postgres", "json_row_clear")]
    #[case("postgres", "json_column_schema")]
    #[case("postgres", "json_column_insert")]
    #[case("postgres", "json_column_insert_literal")]
    #[case("postgres", "json_column_select")]
    fn test_every_backend_has_every_script(#[case] backend: &str, #[case] name: &str) {
        let text = script(backend, name).unwrap();
        assert!(!text.is_empty());
        assert!(!text.ends_with('\n'));
    }

    #[rstest]
    fn test_unknown_script() {
        let err = script("cozo", "nope").unwrap_err();
        assert!(err.to_string().contains("'nope'"));
    }

    #[rstest]
    fn test_render_replaces_tokens_only() {
        let text = render(
            "?[id, json] <- [[{{id}}, {{json}}]] :put json_column {id => json}",
            &[("id", "1"), ("json", "\"{}\"")],
        );
        assert_eq!(text, "?[id, json] <- [[1, \"{}\"]] :put json_column {id => json}");
    }
}
