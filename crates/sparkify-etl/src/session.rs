//! Run bootstrap: resolves the input and output locations into backends.

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::EtlResult;
use crate::storage::{open_backend, Location, ObjectBackend};

/// The storage handles one pipeline run works against.
///
/// Both locations are parsed and, for remote ones, checked for credentials
/// before anything is read, so a misconfigured run fails without touching
/// its output.
#[derive(Debug, Clone)]
pub struct Session {
    input: Arc<dyn ObjectBackend>,
    output: Arc<dyn ObjectBackend>,
}

impl Session {
    pub async fn connect(input: &str, output: &str, storage: &StorageConfig) -> EtlResult<Self> {
        let input_location = Location::parse(input)?;
        let output_location = Location::parse(output)?;

        let input = open_backend(&input_location, storage, false).await?;
        let output = open_backend(&output_location, storage, true).await?;

        log::info!(
            "Session ready: input {} -> output {}",
            input.url(),
            output.url()
        );
        Ok(Self { input, output })
    }

    /// Builds a session over already opened backends.
    pub fn from_backends(input: Arc<dyn ObjectBackend>, output: Arc<dyn ObjectBackend>) -> Self {
        Self { input, output }
    }

    pub fn input(&self) -> &dyn ObjectBackend {
        self.input.as_ref()
    }

    pub fn output(&self) -> &dyn ObjectBackend {
        self.output.as_ref()
    }
}
