//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::{debug, info};

use crate::governance::LmdbGovernanceStore;
use crate::integrity::{self, IntegrityReport};
use crate::meta;
use crate::LmdbError;

/// Named databases opened in every environment.
pub(crate) const DATABASES: &[&str] = &["proposals", "proposal_slugs", "votes", "meta"];

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    path: PathBuf,
    proposals_db: Database<Bytes, Bytes>,
    slugs_db: Database<Bytes, Bytes>,
    votes_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        integrity::check_data_dir(path).map_err(LmdbError::Corruption)?;
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process and the data
        // directory is not shared with another process that could truncate it.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let proposals_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some("proposals"))?;
        let slugs_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some("proposal_slugs"))?;
        let votes_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("votes"))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let version = meta::ensure_schema(&env, &meta_db)?;
        info!(path = %path.display(), map_size, version, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
            proposals_db,
            slugs_db,
            votes_db,
        })
    }

    /// A store handle sharing this environment.
    pub fn governance_store(&self) -> LmdbGovernanceStore {
        LmdbGovernanceStore {
            env: Arc::clone(&self.env),
            proposals_db: self.proposals_db,
            slugs_db: self.slugs_db,
            votes_db: self.votes_db,
        }
    }

    /// Count entries in every database, recording read failures.
    pub fn check_integrity(&self) -> Result<IntegrityReport, LmdbError> {
        let report = integrity::check_integrity(&self.env)?;
        debug!(
            databases = report.databases_checked,
            entries = report.total_entries,
            errors = report.errors.len(),
            "integrity check finished"
        );
        Ok(report)
    }

    /// Flush dirty pages to disk.
    pub fn force_sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
