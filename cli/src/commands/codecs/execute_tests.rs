//! Execute tests for codecs command.

#[cfg(test)]
mod tests {
    use super::super::CodecsCmd;
    use crate::commands::{Context, Execute};
    use crate::domain::demo_registry;
    use json_codec::test_utils::builtin_registry;
    use rstest::rstest;

    #[rstest]
    fn test_lists_builtins_and_user() {
        let registry = demo_registry().unwrap();
        let ctx = Context::new(&registry, None);
        let result = CodecsCmd {}.execute(&ctx).unwrap();

        assert_eq!(result.codecs.len(), 5);
        assert!(result
            .codecs
            .iter()
            .any(|c| c.domain.ends_with("User") && c.wire == "text"));
        assert_eq!(
            result
                .codecs
                .iter()
                .filter(|c| c.domain.ends_with("JsonStructure"))
                .count(),
            2
        );
    }

    #[rstest]
    fn test_builtins_only() {
        let registry = builtin_registry();
        let ctx = Context::new(&registry, None);
        let result = CodecsCmd {}.execute(&ctx).unwrap();
        assert_eq!(result.codecs.len(), 4);
        assert!(!result.codecs.iter().any(|c| c.domain.ends_with("User")));
    }
}
