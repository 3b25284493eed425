//! Console Demo - one pass over the platform services
//!
//! Reads `PLATFORM_*` environment variables, builds a client with logging,
//! metrics, stats and the global loading counter attached, then exercises a
//! few service calls and the state holders.
//!
//! # Running the Example
//!
//! ```bash
//! PLATFORM_API_BASE_URL=http://localhost:30099/ \
//! PLATFORM_DEFAULT_USER_ID=demo \
//! RUST_LOG=debug cargo run -p console-demo
//! ```

#![allow(missing_docs)]

use platform_client_runtime::{ClientConfig, ClientMetrics, LifecycleStats, MetricsObserver, TracingObserver};
use platform_client_services::{PlatformServices, ServiceRequestOptions};
use platform_client_state::{GlobalLoading, KnowledgeBaseState, SessionsState, error_message};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,platform_client_runtime=debug,console_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Load configuration
    let config = ClientConfig::from_env()?;
    config.validate()?;
    let user_id = config.default_user_id.clone();
    tracing::info!(?config, "Configuration loaded");

    // 3. Install the metrics recorder
    let mut metrics = ClientMetrics::new();
    metrics.install()?;

    // 4. Build the client
    let stats = Arc::new(LifecycleStats::new());
    let loading = Arc::new(GlobalLoading::new());
    let client = config
        .into_builder()
        .observer(Arc::new(TracingObserver))
        .observer(Arc::new(MetricsObserver::default()))
        .observer(stats.clone())
        .observer(loading.clone())
        .build();
    let services = PlatformServices::new(client);

    // 5. Direct service calls
    match services.console.generate_captcha(&ServiceRequestOptions::NONE).await {
        Ok(captcha) => tracing::info!(captcha_id = ?captcha.captcha_id, "Captcha generated"),
        Err(error) => tracing::warn!(message = %error_message(&error), "Captcha failed"),
    }

    match services.data_process.list_tasks(None, &ServiceRequestOptions::NONE).await {
        Ok(tasks) => tracing::info!(count = tasks.len(), total = ?tasks.total, "Tasks listed"),
        Err(error) => tracing::warn!(message = %error_message(&error), "Task listing failed"),
    }

    // 6. State holders
    let knowledge_bases = KnowledgeBaseState::new(services.doclib_manage.clone());
    knowledge_bases.load_knowledge_bases().await;
    let (options, kb_error) = knowledge_bases.state(|s| (s.options(), s.error.clone())).await;
    for option in &options {
        tracing::info!(id = %option.id, label = %option.label, "Knowledge base");
    }
    if !kb_error.is_empty() {
        tracing::warn!(message = %kb_error, "Knowledge bases unavailable");
    }

    if let Some(user_id) = user_id {
        let sessions = SessionsState::new(services.llm_apps.clone());
        sessions.load_sessions(&user_id).await;
        let (count, session_error) = sessions.state(|s| (s.sessions.len(), s.session_error.clone())).await;
        tracing::info!(%user_id, count, "Chat sessions loaded");
        if !session_error.is_empty() {
            tracing::warn!(message = %session_error, "Chat sessions unavailable");
        }
    } else {
        tracing::info!("PLATFORM_DEFAULT_USER_ID not set, skipping chat sessions");
    }

    // 7. Summary
    let snapshot = stats.snapshot();
    tracing::info!(
        started = snapshot.started,
        succeeded = snapshot.succeeded,
        failed = snapshot.failed,
        last_duration = ?loading.last_duration(),
        "Done"
    );
    if let Some(rendered) = metrics.render() {
        println!("{rendered}");
    }

    Ok(())
}
