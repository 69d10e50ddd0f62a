//! Environment Selection
//!
//! Shared staging/production flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Target API environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Staging,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
        }
    }
}

/// Runtime-switchable environment flag.
///
/// Clones share the same flag. Readers take a single snapshot with
/// [`EnvironmentSwitch::current`] and resolve against that value.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentSwitch {
    use_staging: Arc<AtomicBool>,
}

impl EnvironmentSwitch {
    pub fn new(environment: Environment) -> Self {
        Self {
            use_staging: Arc::new(AtomicBool::new(environment == Environment::Staging)),
        }
    }

    /// Snapshot of the selected environment.
    pub fn current(&self) -> Environment {
        if self.use_staging.load(Ordering::Acquire) {
            Environment::Staging
        } else {
            Environment::Production
        }
    }

    /// Switch environments; affects every request resolved afterwards.
    pub fn set(&self, environment: Environment) {
        self.use_staging
            .store(environment == Environment::Staging, Ordering::Release);
    }

    pub fn use_staging(&self) -> bool {
        self.current() == Environment::Staging
    }
}
