use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("storage error: {0}")]
    Storage(#[from] squad_store_lmdb::LmdbError),

    #[error("directory error: {0}")]
    Directory(#[from] squad_directory::DirectoryError),

    #[error("governance error: {0}")]
    Governance(#[from] squad_governance::GovernanceError),

    #[error("RPC server error: {0}")]
    Rpc(#[from] squad_rpc::RpcError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("node already started")]
    AlreadyStarted,
}
