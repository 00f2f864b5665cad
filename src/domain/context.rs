use std::net::IpAddr;
use std::sync::Arc;

use crate::config::Config;

/// Request-scoped data handed explicitly to the verifier, fallbacks and profile
/// resolvers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    config: Arc<Config>,
    remote_addr: Option<IpAddr>,
}

impl AuthContext {
    #[must_use]
    pub const fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            remote_addr: None,
        }
    }

    #[must_use]
    pub fn with_remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn remote_addr(&self) -> Option<IpAddr> {
        self.remote_addr
    }
}
