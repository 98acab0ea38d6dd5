use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::Result;
use crate::http;

pub async fn run(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let pipeline = Arc::new(super::build_pipeline(&config)?);

    tracing::info!("Initializing chatbot");
    if let Err(e) = pipeline.initialize().await {
        tracing::warn!(error = %e, "Starting in degraded mode, will retry on first request");
    }

    if let Some(secs) = config.refresh.interval_secs {
        tracing::info!(interval_secs = secs, "Periodic index refresh enabled");
        pipeline.clone().spawn_refresh(Duration::from_secs(secs));
    }

    let listener = TcpListener::bind(&config.server.bind).await?;
    http::serve(listener, pipeline).await?;
    Ok(())
}
