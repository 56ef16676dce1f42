use anyhow::Context;
use shorty_api::{create_redirect_routes, AppState};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn start_web_server(
    bind_addr: String,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind redirect server on {}", bind_addr))?;

    serve_redirects(listener, state, shutdown).await
}

pub async fn serve_redirects(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let local_addr = listener.local_addr()?;
    info!(
        bind_address = %local_addr,
        url = format!("http://{}", local_addr),
        "Redirect server started"
    );

    let app = create_redirect_routes(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Redirect server failed")?;

    info!(bind_address = %local_addr, "Redirect server stopped");
    Ok(())
}
