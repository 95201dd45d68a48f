use crate::app::api::router;
use crate::app::context::AppContext;
use crate::utils::error::Result;
use std::future::Future;
use tokio::net::TcpListener;

/// 在指定位址啟動 HTTP 服務，直到 `shutdown` 完成
pub async fn serve<F>(context: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(&context.config.bind_addr).await?;
    serve_on(listener, context, shutdown).await
}

/// 使用已綁定的 listener 啟動服務
pub async fn serve_on<F>(listener: TcpListener, context: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(context))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("👋 HTTP server stopped");
    Ok(())
}

/// Ctrl-C 或 SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
