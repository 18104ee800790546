//! Operator account database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Operator;

/// Stored credentials for an operator.
#[derive(Debug, Clone)]
pub struct OperatorCredentials {
    pub operator: Operator,
    pub password_salt: String,
    pub password_hash: String,
    pub active: bool,
}

impl Database {
    /// Insert a new operator with pre-hashed credentials.
    pub fn insert_operator(
        &self,
        operator: &Operator,
        password_salt: &str,
        password_hash: &str,
    ) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO operators (id, username, full_name, password_salt, password_hash)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                operator.id,
                operator.username,
                operator.full_name,
                password_salt,
                password_hash,
            ],
        )?;
        Ok(())
    }

    /// Look up credentials by username.
    pub fn get_operator_credentials(
        &self,
        username: &str,
    ) -> DbResult<Option<OperatorCredentials>> {
        self.conn
            .query_row(
                r#"
                SELECT id, username, full_name, password_salt, password_hash, active
                FROM operators
                WHERE username = ?
                "#,
                [username],
                |row| {
                    Ok(OperatorCredentials {
                        operator: Operator {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            full_name: row.get(2)?,
                        },
                        password_salt: row.get(3)?,
                        password_hash: row.get(4)?,
                        active: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Enable or disable an operator account.
    pub fn set_operator_active(&self, username: &str, active: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE operators SET active = ?2 WHERE username = ?1",
            params![username, active],
        )?;
        Ok(rows_affected > 0)
    }
}
