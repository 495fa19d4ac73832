use crate::api::routes;
use crate::config::SharedConfig;
use crate::solver::{DynSolver, Shutdown};
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub solver: DynSolver,
}

/// Serve the webhook API on [`Config::api_bind_addr`][crate::config::Config::api_bind_addr]
/// until `shutdown` fires, then drain in-flight requests.
pub fn new(
    config: SharedConfig,
    solver: DynSolver,
    shutdown: Shutdown,
) -> impl Future<Output = hyper::Result<()>> {
    let bind_addr = config.api_bind_addr;
    axum::Server::bind(&bind_addr)
        .serve(routes::new(AppState { config, solver }).into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
}

async fn wait_for_shutdown(mut shutdown: Shutdown) {
    loop {
        let stopping = *shutdown.borrow_and_update();
        if stopping {
            break;
        }
        // A dropped sender means nobody can ask us to stop any more.
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
    tracing::info!("API shutting down");
}
