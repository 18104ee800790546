//! Operator authentication.

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::db::{Database, DbResult};
use crate::models::Operator;

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success { operator: Operator },
    Failure { message: String },
}

/// Credential check.
pub trait Authenticator {
    fn login(&self, username: &str, password: &str) -> DbResult<LoginOutcome>;
}

/// Hex SHA-256 of `salt || password`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create an operator account with a fresh salt.
pub fn register_operator(
    db: &Database,
    username: &str,
    full_name: &str,
    password: &str,
) -> DbResult<Operator> {
    let operator = Operator {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        full_name: full_name.to_string(),
    };
    let salt = uuid::Uuid::new_v4().simple().to_string();
    db.insert_operator(&operator, &salt, &hash_password(&salt, password))?;
    info!(username, "Operator registered");
    Ok(operator)
}

impl Authenticator for Database {
    fn login(&self, username: &str, password: &str) -> DbResult<LoginOutcome> {
        let failure = || LoginOutcome::Failure {
            message: "Invalid username or password".into(),
        };

        if username.trim().is_empty() || password.is_empty() {
            return Ok(failure());
        }

        let Some(creds) = self.get_operator_credentials(username.trim())? else {
            warn!(username, "Login rejected: unknown user");
            return Ok(failure());
        };

        if hash_password(&creds.password_salt, password) != creds.password_hash {
            warn!(username, "Login rejected: bad password");
            return Ok(failure());
        }

        if !creds.active {
            warn!(username, "Login rejected: account disabled");
            return Ok(LoginOutcome::Failure {
                message: "Account disabled".into(),
            });
        }

        info!(username, "Login accepted");
        Ok(LoginOutcome::Success {
            operator: creds.operator,
        })
    }
}
