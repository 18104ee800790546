//! SQLite schema definition.

/// Bumped whenever `SCHEMA` changes shape. Stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete database schema for the label station.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Operators
-- ============================================================================

CREATE TABLE IF NOT EXISTS operators (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    password_salt TEXT NOT NULL,
    password_hash TEXT NOT NULL,                 -- hex SHA-256 of salt || password
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    patient_id TEXT NOT NULL,
    year TEXT NOT NULL,
    name TEXT NOT NULL,
    national_id TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (patient_id, year)
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Medication Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    drug_name TEXT NOT NULL UNIQUE,
    default_instruction TEXT NOT NULL DEFAULT '',
    code TEXT,                                   -- international barcode
    active INTEGER NOT NULL DEFAULT 1,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Audit Log (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS audit_records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,       -- append order
    id TEXT NOT NULL UNIQUE,                     -- {print_session_id}-{index}
    timestamp TEXT NOT NULL,
    print_session_id TEXT NOT NULL,
    patient_id TEXT NOT NULL,
    patient_year TEXT NOT NULL,
    patient_name TEXT NOT NULL,
    drug_name TEXT NOT NULL,
    instruction_text TEXT NOT NULL,
    printed_by TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    print_quantity INTEGER NOT NULL CHECK (print_quantity >= 1),
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_session ON audit_records(print_session_id);

-- Records are never edited; the log is only appended to or wiped
CREATE TRIGGER IF NOT EXISTS audit_records_immutable BEFORE UPDATE ON audit_records
BEGIN
    SELECT RAISE(ABORT, 'Audit records are immutable');
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn insert_record(conn: &Connection, id: &str) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO audit_records (
                id, timestamp, print_session_id, patient_id, patient_year, patient_name,
                drug_name, instruction_text, printed_by, expiry_date, print_quantity, status
            ) VALUES (?1, '2026-01-01T00:00:00Z', 'S', '1', '2025', 'P', 'D', 'I', 'Op', '01/26', 1, 'printed')
            "#,
            [id],
        )
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_audit_records_immutable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        insert_record(&conn, "S-0").unwrap();

        let result = conn.execute("UPDATE audit_records SET drug_name = 'Other'", []);
        assert!(result.is_err());

        // Wiping the log stays possible
        let deleted = conn.execute("DELETE FROM audit_records", []).unwrap();
        assert_eq!(deleted, 1);
    }

    #[test]
    fn test_audit_id_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        insert_record(&conn, "S-0").unwrap();
        assert!(insert_record(&conn, "S-0").is_err());
    }

    #[test]
    fn test_quantity_check() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        let result = conn.execute(
            r#"
            INSERT INTO audit_records (
                id, timestamp, print_session_id, patient_id, patient_year, patient_name,
                drug_name, instruction_text, printed_by, expiry_date, print_quantity, status
            ) VALUES ('S-0', 't', 'S', '1', '2025', 'P', 'D', 'I', 'Op', '01/26', 0, 'printed')
            "#,
            [],
        );
        assert!(result.is_err());
    }
}
