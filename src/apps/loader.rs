// Startup app loading
//
// Sources are enumerated statically: the built-in apps plus any manifest
// paths from configuration. Every source is loaded concurrently; a source
// that fails is logged and skipped. Bootstrap completes only after every
// attempt settled, and the ready signal fires exactly once.

use super::{meal_planner, notepad, weather_portal};
use super::{AppContext, AppDescriptor, AppRegistry, ManifestSource};
use crate::events::{Event, EventBus, EventKind, BROADCAST};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Something that can produce one app descriptor
#[async_trait]
pub trait AppSource: Send + Sync {
    /// Human-readable origin used in logs and reports
    fn origin(&self) -> String;

    async fn load(&self, ctx: &AppContext) -> Result<AppDescriptor>;
}

/// An app compiled into the binary
pub struct BuiltinSource {
    origin: &'static str,
    build: fn(&AppContext) -> AppDescriptor,
}

impl BuiltinSource {
    pub const fn new(origin: &'static str, build: fn(&AppContext) -> AppDescriptor) -> Self {
        Self { origin, build }
    }
}

#[async_trait]
impl AppSource for BuiltinSource {
    fn origin(&self) -> String {
        format!("builtin:{}", self.origin)
    }

    async fn load(&self, ctx: &AppContext) -> Result<AppDescriptor> {
        Ok((self.build)(ctx))
    }
}

/// The apps shipped with the launcher, in store order
pub fn builtin_sources() -> Vec<Box<dyn AppSource>> {
    vec![
        Box::new(BuiltinSource::new(meal_planner::APP_ID, meal_planner::build)),
        Box::new(BuiltinSource::new(weather_portal::APP_ID, |_| {
            weather_portal::build()
        })),
        Box::new(BuiltinSource::new(notepad::APP_ID, notepad::build)),
    ]
}

/// Outcome of a bootstrap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Registered app ids, in source order
    pub loaded: Vec<String>,

    /// (origin, reason) for every source that was skipped
    pub failed: Vec<(String, String)>,
}

impl BootstrapReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct AppLoader {
    sources: Vec<Box<dyn AppSource>>,
    event_bus: Option<Arc<EventBus>>,
    ready_tx: Mutex<Option<oneshot::Sender<BootstrapReport>>>,
}

impl AppLoader {
    pub fn new(sources: Vec<Box<dyn AppSource>>) -> Self {
        Self {
            sources,
            event_bus: None,
            ready_tx: Mutex::new(None),
        }
    }

    /// Built-in apps followed by one source per manifest path
    pub fn standard(manifest_paths: Vec<PathBuf>) -> Self {
        let mut sources = builtin_sources();
        sources.extend(
            manifest_paths
                .into_iter()
                .map(|path| Box::new(ManifestSource::new(path)) as Box<dyn AppSource>),
        );
        Self::new(sources)
    }

    /// Also announce completion as a `RegistryReady` event
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Receiver resolved once the first bootstrap settles
    ///
    /// Calling this again replaces the previous receiver.
    pub fn ready_signal(&self) -> oneshot::Receiver<BootstrapReport> {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut slot) = self.ready_tx.lock() {
            *slot = Some(tx);
        }
        rx
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Load every source and register the ones that succeed
    ///
    /// Loads run concurrently; registration happens afterwards in source
    /// order so duplicate handling does not depend on completion order.
    pub async fn bootstrap(&self, ctx: &AppContext, registry: &mut AppRegistry) -> BootstrapReport {
        let results = join_all(self.sources.iter().map(|source| source.load(ctx))).await;

        let mut report = BootstrapReport::default();
        for (source, result) in self.sources.iter().zip(results) {
            let origin = source.origin();
            let outcome = result.map_err(|e| format!("{:#}", e)).and_then(|descriptor| {
                registry
                    .register(descriptor)
                    .map(|app| (app.id.clone(), app.name.clone()))
                    .map_err(|e| e.to_string())
            });

            match outcome {
                Ok((id, name)) => {
                    tracing::info!("✅ Loaded app '{}' ({}) from {}", name, id, origin);
                    report.loaded.push(id);
                }
                Err(reason) => {
                    tracing::error!("❌ Failed to load app from {}: {}", origin, reason);
                    report.failed.push((origin, reason));
                }
            }
        }

        tracing::info!(
            "App registry ready: {} loaded, {} failed",
            report.loaded.len(),
            report.failed.len()
        );
        self.signal_ready(&report);
        report
    }

    fn signal_ready(&self, report: &BootstrapReport) {
        let tx = self.ready_tx.lock().ok().and_then(|mut slot| slot.take());
        if let Some(tx) = tx {
            if tx.send(report.clone()).is_err() {
                tracing::debug!("Registry ready signal had no receiver");
            }
        }

        if let Some(bus) = &self.event_bus {
            bus.emit(Event::new(
                "app_loader",
                BROADCAST,
                EventKind::RegistryReady {
                    loaded: report.loaded.len(),
                    failed: report.failed.len(),
                },
            ));
        }
    }
}
