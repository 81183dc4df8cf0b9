//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption before the service accepts votes.

use std::path::Path;

use heed::types::Bytes;
use heed::Env;

use crate::environment::DATABASES;
use crate::LmdbError;

/// Summary of an integrity check run.
#[derive(Debug)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Open each expected database and count its entries.
///
/// Read failures and missing databases are recorded in the report rather
/// than returned as a hard error.
pub fn check_integrity(env: &Env) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport {
        databases_checked: 0,
        total_entries: 0,
        errors: Vec::new(),
    };

    let rtxn = env.read_txn()?;

    for &db_name in DATABASES {
        match env.open_database::<Bytes, Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{db_name}': {e}")),
                }
            }
            Ok(None) => report.errors.push(format!("database '{db_name}' is missing")),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{db_name}': {e}")),
        }
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// A missing or empty directory is a fresh start. A populated directory
/// without `data.mdb` suggests corruption or a misconfigured path.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let is_empty = std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    if is_empty {
        return Ok(());
    }
    if !path.join("data.mdb").exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
