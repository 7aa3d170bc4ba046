// HTTP launcher shell
//
// Routes:
// - GET  /                      installed apps
// - GET  /store                 every registered app
// - POST /apps/:id/install      install, back to the store
// - POST /apps/:id/uninstall    uninstall, back home
// - POST /apps/clear            uninstall everything, back home
// - GET  /apps/:id              mount the app's fragment
// - POST /apps/:id/actions      dispatch (id, form field `action`)
// - GET  /api/installed         installed snapshot as JSON
// - GET  /health                liveness

use super::error::ShellError;
use super::state::InstalledApps;
use super::views;
use crate::api::LauncherApi;
use crate::apps::ActionInput;
use crate::error::{LauncherError, Result};
use crate::services::InstalledSnapshot;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Form field selecting the action to run
pub const ACTION_FIELD: &str = "action";

pub(crate) struct ShellState {
    pub(crate) api: Arc<LauncherApi>,
    pub(crate) installed: InstalledApps,
}

/// Build the router over a launcher and its installed-set view
pub fn router(api: Arc<LauncherApi>, installed: InstalledApps) -> Router {
    let state = Arc::new(ShellState { api, installed });

    Router::new()
        .route("/", get(my_apps))
        .route("/store", get(store))
        .route("/apps/clear", post(clear_all))
        .route("/apps/:id", get(launch))
        .route("/apps/:id/install", post(install))
        .route("/apps/:id/uninstall", post(uninstall))
        .route("/apps/:id/actions", post(invoke_action))
        .route("/api/installed", get(installed_json))
        .route("/health", get(health))
        .with_state(state)
}

/// A running shell
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    serve_task: Option<JoinHandle<()>>,
    watcher: JoinHandle<()>,
}

impl Server {
    /// Subscribe to the installed set, bind `addr` and start serving
    ///
    /// # Errors
    /// - The store refuses the subscription
    /// - The address cannot be bound
    pub async fn start(api: Arc<LauncherApi>, addr: SocketAddr) -> Result<Self> {
        let installed = InstalledApps::new(api.user_scope());
        let watcher = installed.spawn_watcher(api.subscribe_installed().await?);

        let app = router(api, installed);
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let serve_task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("Shell server stopped with error: {}", e);
            }
        });

        tracing::info!("🍵 Matcha shell listening on http://{}", addr);
        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            serve_task: Some(serve_task),
            watcher,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Ask the server to stop accepting connections
    pub fn shutdown(&mut self) -> Result<()> {
        self.watcher.abort();
        match self.shutdown.take() {
            Some(sender) => sender.send(()).map_err(|_| {
                LauncherError::EventError("Failed to send server shutdown signal".to_string())
            }),
            None => Ok(()),
        }
    }

    /// Wait for the server task to finish after `shutdown`
    pub async fn stopped(&mut self) {
        if let Some(task) = self.serve_task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Shell server task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn my_apps(State(state): State<Arc<ShellState>>) -> Html<String> {
    let snapshot = state.installed.snapshot();
    let installed = state.api.installed_apps(&snapshot);
    Html(views::page(
        "My apps",
        &state.api.notices(),
        &views::my_apps(&installed),
    ))
}

async fn store(State(state): State<Arc<ShellState>>) -> Html<String> {
    let snapshot = state.installed.snapshot();
    let listing = state.api.store_listing(&snapshot);
    Html(views::page(
        "App store",
        &state.api.notices(),
        &views::store(&listing),
    ))
}

async fn installed_json(State(state): State<Arc<ShellState>>) -> Json<InstalledSnapshot> {
    Json(state.installed.snapshot())
}

// Install/uninstall/clear failures are already posted as notices; the
// redirected page shows them.

async fn install(State(state): State<Arc<ShellState>>, Path(id): Path<String>) -> Redirect {
    tracing::debug!("POST /apps/{}/install", id);
    let _ = state.api.install(&id).await;
    Redirect::to("/store")
}

async fn uninstall(State(state): State<Arc<ShellState>>, Path(id): Path<String>) -> Redirect {
    tracing::debug!("POST /apps/{}/uninstall", id);
    let _ = state.api.uninstall(&id).await;
    Redirect::to("/")
}

async fn clear_all(State(state): State<Arc<ShellState>>) -> Redirect {
    tracing::debug!("POST /apps/clear");
    let _ = state.api.clear_all().await;
    Redirect::to("/")
}

async fn launch(
    State(state): State<Arc<ShellState>>,
    Path(id): Path<String>,
) -> std::result::Result<Html<String>, ShellError> {
    let (app, fragment) = state
        .api
        .launch(&id)
        .map_err(|e| ShellError::from(e).with_notices(state.api.notices()))?;

    Ok(Html(views::page(
        &app.name,
        &state.api.notices(),
        &views::app_frame(&app, &fragment, None),
    )))
}

async fn invoke_action(
    State(state): State<Arc<ShellState>>,
    Path(id): Path<String>,
    Form(mut fields): Form<HashMap<String, String>>,
) -> std::result::Result<Html<String>, ShellError> {
    let action = fields
        .remove(ACTION_FIELD)
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ShellError::bad_request("No action selected"))?;
    tracing::debug!("POST /apps/{}/actions ({})", id, action);

    let response = state
        .api
        .invoke_action(&id, &action, ActionInput::new(fields))
        .await
        .map_err(|e| ShellError::from(e).with_notices(state.api.notices()))?;

    let app = state.api.registry().get(&id)?;
    Ok(Html(views::page(
        &app.name,
        &state.api.notices(),
        &views::app_frame(&app, &response.fragment, response.report.open_url.as_deref()),
    )))
}
