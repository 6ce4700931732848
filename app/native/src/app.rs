//! Desktop application wiring.
//!
//! [`launch`] assembles the preference store, event bus, services and the
//! coordinator actor around a platform (display source, window backend and
//! OS monitors). On macOS, [`run`] does that with the native platform and
//! then hands the main thread to `NSApplication`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::actor::{self, Bridge, NotchActor, NotchActorHandle, NotchMessage};
use crate::config::{ConfigWatcher, OvernotchConfig};
use crate::coordinator::{Collaborators, WindowCoordinator};
use crate::display::{DisplayRegistry, DisplaySource};
use crate::error::OvernotchError;
use crate::events::EventBus;
use crate::platform::spawn_named_thread;
use crate::preferences::{PreferenceStore, PreferenceWatcher, Preferences};
use crate::scheduler::TokioScheduler;
use crate::services::Services;
use crate::window::{PlaceholderContent, WindowBackend};

/// Platform pieces the coordinator runs on.
pub struct Platform {
    pub displays: Arc<dyn DisplaySource>,
    pub backend: Box<dyn WindowBackend>,
    /// OS-specific services, started before the first reconcile.
    pub services: Services,
}

/// A running overlay.
pub struct Overnotch {
    handle: NotchActorHandle,
    preferences: Arc<PreferenceStore>,
    bus: Arc<EventBus>,
    _bridge: Bridge,
}

impl Overnotch {
    /// Handle to the coordinator actor.
    #[must_use]
    pub const fn handle(&self) -> &NotchActorHandle { &self.handle }

    /// Live preferences.
    #[must_use]
    pub const fn preferences(&self) -> &Arc<PreferenceStore> { &self.preferences }

    /// Event bus shared with renderers and services.
    #[must_use]
    pub const fn bus(&self) -> &Arc<EventBus> { &self.bus }

    /// Asks the coordinator to tear down its windows and stop.
    pub fn shutdown(&self) {
        if let Err(err) = self.handle.send(NotchMessage::Shutdown) {
            tracing::debug!(error = %err, "overnotch: app: coordinator already stopped");
        }
    }
}

/// Starts the coordinator on its own thread.
///
/// `platform` receives the event bus so OS monitors can publish to it.
/// When `config_path` is given, the file is watched and changes are
/// applied live.
///
/// # Errors
///
/// Returns an error if the coordinator runtime cannot be built.
pub fn launch<F>(
    config: &OvernotchConfig,
    config_path: Option<PathBuf>,
    platform: F,
) -> Result<Overnotch, OvernotchError>
where
    F: FnOnce(&Arc<EventBus>) -> Platform,
{
    let preferences = Arc::new(PreferenceStore::new(Preferences::from(config)));
    let bus = Arc::new(EventBus::new());
    let (handle, mailbox) = actor::channel();

    PreferenceWatcher::attach(&preferences, Arc::clone(&bus), handle.clone());
    let bridge = Bridge::attach(Arc::clone(&bus), handle.clone());

    let Platform { displays, backend, mut services } = platform(&bus);
    if let Some(path) = config_path {
        services.push(Box::new(ConfigWatcher::new(path, Arc::clone(&preferences))));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .thread_name("overnotch-coordinator")
        .build()
        .map_err(|err| OvernotchError::CoordinatorError(format!("failed to build runtime: {err}")))?;

    let coordinator = WindowCoordinator::new(Collaborators {
        registry: DisplayRegistry::new(displays),
        backend,
        content: Box::new(PlaceholderContent),
        scheduler: Box::new(TokioScheduler::new(runtime.handle().clone(), handle.task_sink())),
        preferences: Arc::clone(&preferences),
        bus: Arc::clone(&bus),
        services,
    });

    spawn_named_thread("coordinator", move || {
        runtime.block_on(NotchActor::new(coordinator, mailbox).run());
        tracing::debug!("overnotch: app: coordinator thread finished");
    });

    tracing::info!("overnotch: app: coordinator launched");
    Ok(Overnotch { handle, preferences, bus, _bridge: bridge })
}

/// Runs the overlay until the application quits.
///
/// # Errors
///
/// Returns an error on platforms without a window backend, or if the
/// coordinator cannot start.
#[cfg(target_os = "macos")]
pub fn run() -> Result<(), OvernotchError> {
    use objc::runtime::Object;
    use objc::{class, msg_send, sel, sel_impl};

    use crate::display::macos::MacDisplays;
    use crate::display::monitor::DisplayMonitor;
    use crate::window::macos::MacBackend;

    /// `NSApplicationActivationPolicyAccessory`: no Dock icon, no menu bar.
    const ACTIVATION_POLICY_ACCESSORY: i64 = 1;

    let config = crate::config::init();
    let app = launch(config, crate::config::target_config_path(), |bus| Platform {
        displays: Arc::new(MacDisplays),
        backend: Box::new(MacBackend::new()),
        services: Services::new().with(DisplayMonitor::new(Arc::clone(bus))),
    })?;

    unsafe {
        let ns_app: *mut Object = msg_send![class!(NSApplication), sharedApplication];
        let _: () = msg_send![ns_app, setActivationPolicy: ACTIVATION_POLICY_ACCESSORY];
        let _: () = msg_send![ns_app, run];
    }

    app.shutdown();
    Ok(())
}

/// Runs the overlay until the application quits.
///
/// # Errors
///
/// Always fails: the overlay needs the macOS window server.
#[cfg(not(target_os = "macos"))]
pub fn run() -> Result<(), OvernotchError> {
    Err(OvernotchError::UnsupportedPlatform(
        "the notch overlay is only available on macOS".to_string(),
    ))
}
