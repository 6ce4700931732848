//! Background services with an explicit lifecycle.
//!
//! OS monitors and file watchers are constructed up front and handed to the
//! coordinator, which starts them once it is ready to receive their events
//! and stops them on shutdown.

use crate::error::OvernotchError;

/// A component that runs alongside the coordinator.
pub trait Service: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Starts the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the service could not start. Other services are
    /// still started.
    fn start(&mut self) -> Result<(), OvernotchError>;

    /// Stops the service. Must be safe to call when not started.
    fn stop(&mut self);
}

/// Ordered collection of services.
#[derive(Default)]
pub struct Services {
    services: Vec<Box<dyn Service>>,
    started: Vec<bool>,
}

impl Services {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Adds a service. Services start in insertion order.
    #[must_use]
    pub fn with(mut self, service: impl Service + 'static) -> Self {
        self.push(Box::new(service));
        self
    }

    pub fn push(&mut self, service: Box<dyn Service>) {
        self.services.push(service);
        self.started.push(false);
    }

    #[must_use]
    pub fn len(&self) -> usize { self.services.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.services.is_empty() }

    /// Starts every service that is not running. Failures are logged and
    /// returned as a count.
    pub fn start_all(&mut self) -> usize {
        let mut failures = 0;
        for (service, started) in self.services.iter_mut().zip(self.started.iter_mut()) {
            if *started {
                continue;
            }
            match service.start() {
                Ok(()) => {
                    *started = true;
                    tracing::debug!(service = service.name(), "overnotch: services: started");
                }
                Err(err) => {
                    failures += 1;
                    tracing::warn!(service = service.name(), error = %err, "overnotch: services: failed to start");
                }
            }
        }
        failures
    }

    /// Stops running services in reverse start order.
    pub fn stop_all(&mut self) {
        for (service, started) in self.services.iter_mut().zip(self.started.iter_mut()).rev() {
            if *started {
                service.stop();
                *started = false;
                tracing::debug!(service = service.name(), "overnotch: services: stopped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    struct FakeService {
        name: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Service for FakeService {
        fn name(&self) -> &'static str { self.name }

        fn start(&mut self) -> Result<(), OvernotchError> {
            if self.fail {
                return Err(OvernotchError::ServiceError("boom".to_string()));
            }
            self.log.lock().push(format!("start {}", self.name));
            Ok(())
        }

        fn stop(&mut self) { self.log.lock().push(format!("stop {}", self.name)); }
    }

    fn fake(name: &'static str, fail: bool, log: &Arc<Mutex<Vec<String>>>) -> FakeService {
        FakeService { name, fail, log: Arc::clone(log) }
    }

    #[test]
    fn test_start_in_order_stop_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut services = Services::new().with(fake("a", false, &log)).with(fake("b", false, &log));

        assert_eq!(services.start_all(), 0);
        services.stop_all();

        assert_eq!(*log.lock(), vec!["start a", "start b", "stop b", "stop a"]);
    }

    #[test]
    fn test_failed_service_does_not_block_others_and_is_not_stopped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut services = Services::new().with(fake("bad", true, &log)).with(fake("good", false, &log));

        assert_eq!(services.start_all(), 1);
        services.stop_all();

        assert_eq!(*log.lock(), vec!["start good", "stop good"]);
        assert_eq!(services.len(), 2);
    }

    #[test]
    fn test_start_all_is_idempotent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut services = Services::new().with(fake("a", false, &log));

        services.start_all();
        services.start_all();
        services.stop_all();
        services.stop_all();

        assert_eq!(*log.lock(), vec!["start a", "stop a"]);
    }
}
