//! Application-defined SQL functions.
//!
//! SQLite parses `x REGEXP y` but ships no implementation; the customer email
//! check constraint needs one registered on every connection.

use super::{DbError, DbResult};
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Error};
use std::sync::Arc;

const REGEXP: &str = "regexp";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registers all SQL functions required by the storefront schema.
pub fn register_functions(conn: &Connection) -> DbResult<()> {
    // Deterministic flag is mandatory: SQLite refuses non-deterministic
    // functions inside CHECK constraints.
    conn.create_scalar_function(
        REGEXP,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let pattern: Arc<Regex> = ctx.get_or_create_aux(0, |raw| -> Result<_, BoxError> {
                Ok(Regex::new(raw.as_str()?)?)
            })?;
            match ctx.get_raw(1) {
                ValueRef::Null => Ok(None),
                value => {
                    let text = value
                        .as_str()
                        .map_err(|err| Error::UserFunctionError(err.into()))?;
                    Ok(Some(pattern.is_match(text)))
                }
            }
        },
    )
    .map_err(|source| DbError::FunctionRegistration {
        name: REGEXP,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::register_functions;
    use rusqlite::Connection;

    #[test]
    fn regexp_operator_matches_and_passes_null_through() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let matched: bool = conn
            .query_row("SELECT 'abc' REGEXP '^a.c$';", [], |row| row.get(0))
            .unwrap();
        assert!(matched);

        let missed: bool = conn
            .query_row("SELECT 'abd' REGEXP '^a.c$';", [], |row| row.get(0))
            .unwrap();
        assert!(!missed);

        let null_value: Option<bool> = conn
            .query_row("SELECT NULL REGEXP '^a';", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null_value, None);
    }
}
