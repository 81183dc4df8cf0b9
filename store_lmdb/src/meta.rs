//! Schema version bookkeeping in the `meta` database.

use heed::types::Bytes;
use heed::{Database, Env};

use crate::LmdbError;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Layout version of the proposal, slug and vote databases.
pub(crate) const SCHEMA_VERSION: u32 = 1;

/// Stamp a fresh environment with [`SCHEMA_VERSION`], or verify an existing one.
pub(crate) fn ensure_schema(env: &Env, meta_db: &Database<Bytes, Bytes>) -> Result<u32, LmdbError> {
    let mut wtxn = env.write_txn()?;
    let found = match meta_db.get(&wtxn, SCHEMA_VERSION_KEY)? {
        Some(bytes) => {
            let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                LmdbError::Corruption("schema_version has unexpected byte length".to_string())
            })?;
            Some(u32::from_le_bytes(arr))
        }
        None => None,
    };

    match found {
        Some(version) if version == SCHEMA_VERSION => Ok(version),
        Some(version) => Err(LmdbError::SchemaMismatch {
            found: version,
            expected: SCHEMA_VERSION,
        }),
        None => {
            meta_db.put(&mut wtxn, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_le_bytes())?;
            wtxn.commit()?;
            Ok(SCHEMA_VERSION)
        }
    }
}
