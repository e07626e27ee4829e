use translator_logging::translator_warn;

use crate::{InferenceConnector, ScopedConnection, ServiceSettings, StepError};

/// Fetches the service's client configuration, pretty-printed when it is JSON.
pub async fn ping(
    connector: &dyn InferenceConnector,
    settings: &ServiceSettings,
) -> Result<String, StepError> {
    let mut connection = ScopedConnection::open(connector, settings.connect_timeout).await?;
    let raw = connection.client_config().await?;
    Ok(match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => format!("{value:#}"),
        Err(_) => raw,
    })
}

/// Like [`ping`], but a failure is reported as an `{"error": ...}` document.
pub async fn ping_report(connector: &dyn InferenceConnector, settings: &ServiceSettings) -> String {
    match ping(connector, settings).await {
        Ok(report) => report,
        Err(err) => {
            translator_warn!("Ping failed: {}", err);
            format!("{:#}", serde_json::json!({ "error": err.to_string() }))
        }
    }
}
