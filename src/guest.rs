/*!
 * Usage limits for unauthenticated callers.
 */

use log::{info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ApiError;

/// Per-IP request counter for guests
#[derive(Clone)]
pub struct GuestUsageLimiter {
    enabled: bool,
    limit: u32,
    usage: Arc<Mutex<HashMap<String, u32>>>,
}

impl GuestUsageLimiter {
    pub fn new(enabled: bool, limit: u32) -> Self {
        Self {
            enabled,
            limit,
            usage: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one guest request, failing once the limit has been used up
    ///
    /// The check and the increment happen under the same lock, so concurrent
    /// requests from one address can never exceed the limit.
    pub fn check_and_record(&self, ip: &str) -> Result<u32, ApiError> {
        if !self.enabled {
            return Err(ApiError::Authentication(
                "Guest access is disabled, please sign in".to_string(),
            ));
        }

        let mut usage = self.usage.lock();
        let used = usage.entry(ip.to_string()).or_insert(0);
        if *used >= self.limit {
            warn!("Guest {} reached the usage limit of {}", ip, self.limit);
            return Err(ApiError::Authentication(format!(
                "Guest usage limit of {} requests reached, please sign in to continue",
                self.limit
            )));
        }
        *used += 1;
        info!("Guest {} used {}/{} requests", ip, used, self.limit);
        Ok(self.limit - *used)
    }

    /// Requests a guest has made so far
    pub fn usage(&self, ip: &str) -> u32 {
        self.usage.lock().get(ip).copied().unwrap_or(0)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
