//! Session - the explicit driver context passed to every screen object.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::config::ScreenConfig;
use crate::driver::{AutomationDriver, Platform};
use crate::element::ElementHandle;
use crate::error::ScreenResult;
use crate::locator::Locator;
use crate::wait::Waiter;

/// Shared handle to one automation driver plus its configuration.
///
/// Cloning is cheap; clones talk to the same driver. Not `Send`: one test
/// thread drives one device.
#[derive(Clone)]
pub struct Session {
    driver: Rc<dyn AutomationDriver>,
    config: Rc<ScreenConfig>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("driver", &self.driver)
            .field("config", &self.config)
            .finish()
    }
}

impl Session {
    /// Wrap a shared driver
    #[must_use]
    pub fn new(driver: Rc<dyn AutomationDriver>, config: ScreenConfig) -> Self {
        Self {
            driver,
            config: Rc::new(config),
        }
    }

    /// Take ownership of a driver, default configuration
    #[must_use]
    pub fn from_driver<D: AutomationDriver + 'static>(driver: D) -> Self {
        Self::new(Rc::new(driver), ScreenConfig::default())
    }

    /// Push the configured implicit wait to the driver
    pub fn apply_implicit_wait(&self) -> ScreenResult<()> {
        let wait = self.config.implicit_wait();
        tracing::debug!(?wait, "applying implicit wait");
        self.driver.set_implicit_wait(wait)?;
        Ok(())
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn AutomationDriver {
        self.driver.as_ref()
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Platform, asked of the driver on every call
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.driver.platform()
    }

    /// Shorthand for an Android check
    #[must_use]
    pub fn is_android(&self) -> bool {
        self.driver.is_android()
    }

    /// Waiter bounded by `timeout`, polling at the configured interval
    #[must_use]
    pub fn waiter(&self, timeout: Duration) -> Waiter {
        Waiter::with_options(self.config.wait_options(timeout))
    }

    /// Handle for a named element
    #[must_use]
    pub fn element(&self, name: impl Into<String>, locator: Locator) -> ElementHandle {
        ElementHandle::new(self.clone(), name, locator)
    }

    /// Run `f` with the driver's implicit wait set to `wait`, restoring the
    /// previous value afterwards even when `f` fails.
    pub fn with_implicit_wait<T>(
        &self,
        wait: Duration,
        f: impl FnOnce() -> ScreenResult<T>,
    ) -> ScreenResult<T> {
        let previous = self.driver.implicit_wait();
        self.driver.set_implicit_wait(wait)?;
        let result = f();
        if let Err(err) = self.driver.set_implicit_wait(previous) {
            tracing::debug!(%err, "failed to restore implicit wait");
        }
        result
    }
}
