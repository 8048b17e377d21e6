//! Shared test utilities for session and integration tests.
//!
//! Sessions come up on the in-memory Cozo backend unless a test asks for
//! on-disk storage.

#[cfg(feature = "test-utils")]
use tempfile::TempDir;

use crate::backend::{Session, open_mem_session};
use crate::registry::CodecRegistry;

/// Create an in-memory session and run `ddl` against it.
pub fn setup_test_session(ddl: &str) -> Box<dyn Session> {
    let session = open_mem_session().expect("Failed to create in-memory session");
    session
        .execute_schema(ddl)
        .expect("Schema creation should succeed");
    session
}

/// Create a SQLite-backed session in a fresh temp directory.
///
/// The directory is returned alongside the session and must outlive it.
#[cfg(feature = "test-utils")]
pub fn setup_sqlite_session(ddl: &str) -> (TempDir, Box<dyn Session>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let session = crate::backend::cozo::CozoSession::open(&dir.path().join("test.sqlite"))
        .expect("Failed to open SQLite session");
    session
        .execute_schema(ddl)
        .expect("Schema creation should succeed");
    (dir, Box::new(session))
}

/// Registry holding only the built-in codecs.
pub fn builtin_registry() -> CodecRegistry {
    CodecRegistry::builder()
        .with_builtin_codecs()
        .expect("Built-in codecs never collide")
        .build()
}
