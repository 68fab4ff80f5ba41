use thiserror::Error;

use crate::model::{CredentialsError, ParseIdError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
