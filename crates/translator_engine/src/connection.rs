use std::ops::{Deref, DerefMut};
use std::time::Duration;

use translator_logging::translator_debug;

use crate::{ConnectionError, InferenceConnection, InferenceConnector};

/// A connection that lives for one step and is disconnected when dropped,
/// whichever way the step ends.
pub struct ScopedConnection {
    inner: Box<dyn InferenceConnection>,
}

impl ScopedConnection {
    pub async fn open(
        connector: &dyn InferenceConnector,
        timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        match tokio::time::timeout(timeout, connector.connect()).await {
            Ok(Ok(inner)) => {
                translator_debug!("Connected to inference service");
                Ok(Self { inner })
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ConnectionError::Timeout(timeout)),
        }
    }
}

impl Deref for ScopedConnection {
    type Target = dyn InferenceConnection;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for ScopedConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.inner.disconnect();
        translator_debug!("Disconnected from inference service");
    }
}
