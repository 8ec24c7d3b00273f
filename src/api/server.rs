use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use super::{build_router, AppState};

/// 启动评分服务，收到 Ctrl+C / SIGTERM 后优雅退出
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let backend = state.backend.name().to_string();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("无法监听地址: {}", bind))?;

    info!("🚀 评分服务已启动: http://{} (后端: {})", bind, backend);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("评分服务异常退出")?;

    info!("评分服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("无法监听 Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C，正在关闭"),
        _ = terminate => info!("收到终止信号，正在关闭"),
    }
}
