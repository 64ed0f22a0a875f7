use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::{EngineConfig, LeavePolicy};
use crate::core::time::{Clock, SystemClock};

/// Explicit dependencies handed to every lifecycle operation: the leave
/// policy and the clock used to stamp requests, comments and approvals.
#[derive(Clone)]
pub struct ServiceContext {
    pub policy: LeavePolicy,
    clock: Arc<dyn Clock>,
}

impl ServiceContext {
    pub fn new(policy: LeavePolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.policy.clone(), Arc::new(SystemClock))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for ServiceContext {
    fn default() -> Self {
        Self::new(LeavePolicy::default(), Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("policy", &self.policy)
            .field("now", &self.clock.now())
            .finish()
    }
}
