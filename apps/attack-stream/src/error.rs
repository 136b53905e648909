use thiserror::Error;

use crate::transport::EndpointError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Endpoint(#[from] EndpointError),
    #[error("an attack type is required; pass --attack or see --list-attacks")]
    MissingAttack,
}
