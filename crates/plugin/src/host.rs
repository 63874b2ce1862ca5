//! Plugin load and shutdown

use std::sync::Arc;

use tracing::instrument;
use tracing_subscriber::EnvFilter;

use finhook_core::{ConfigError, CoreConfig, HookRegistry, ListenerContext, SignalQueue};
use finhook_engine::EngineServices;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A loaded hook system
#[derive(Debug)]
pub struct Plugin {
    registry: Arc<HookRegistry>,
    config: CoreConfig,
}

impl Plugin {
    /// The shared hook registry
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Create a signal queue sized by the configuration
    ///
    /// Returns the queue for the script side to drain and the same queue as
    /// the listener context to register with.
    pub fn create_listener(&self) -> (Arc<SignalQueue>, Arc<dyn ListenerContext>) {
        let queue = Arc::new(SignalQueue::new(self.config.signal_queue_capacity));
        let context: Arc<dyn ListenerContext> = queue.clone();
        (queue, context)
    }

    /// Tear down the registry
    ///
    /// Interceptors that were installed stay in place and pass calls
    /// through once the registry is gone.
    #[instrument(skip_all)]
    pub fn shutdown(self) {
        tracing::info!(
            "{} shutting down ({} hooks installed)",
            crate::NAME,
            self.registry.install_count()
        );
        if Arc::strong_count(&self.registry) > 1 {
            tracing::warn!("Hook registry still shared at shutdown");
        }
    }
}

/// Install the global tracing subscriber
///
/// Returns `false` if one was already installed.
pub fn init_tracing(config: &CoreConfig) -> bool {
    let filter = EnvFilter::try_new(config.filter_directive()).unwrap_or_else(|err| {
        eprintln!("Invalid log filter '{}': {}", config.filter_directive(), err);
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(true)
        .try_init()
        .is_ok()
}

/// Load the configuration from disk and bring the hook system up
#[instrument(skip_all)]
pub fn load(services: EngineServices) -> Result<Plugin, PluginError> {
    let config = CoreConfig::load()?;
    load_with_config(services, config)
}

/// Bring the hook system up with an explicit configuration
#[instrument(skip_all)]
pub fn load_with_config(
    services: EngineServices,
    config: CoreConfig,
) -> Result<Plugin, PluginError> {
    init_tracing(&config);
    tracing::info!("{} {} loading...", crate::NAME, crate::VERSION);

    if !services.is_simulation_thread() {
        tracing::debug!("Loading off the simulation thread");
    }

    let registry = HookRegistry::new(services, &config);

    tracing::info!(
        "{} loaded, serving {} hooks",
        crate::NAME,
        registry.specs().len()
    );
    tracing::info!("Main thread ID: {:?}", std::thread::current().id());

    Ok(Plugin {
        registry: Arc::new(registry),
        config,
    })
}
