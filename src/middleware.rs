use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, state::AppState};

/// Expired per-address entries are pruned once the map grows past this.
const PRUNE_THRESHOLD: usize = 1024;

/// Fixed-window request counter per client address.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `ip`; false once the window is exhausted.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = match self.windows.lock() {
            Ok(w) => w,
            // A poisoned counter should not take the API down
            Err(poisoned) => poisoned.into_inner(),
        };
        if windows.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, (start, _)| now.duration_since(*start) <= window);
        }
        let entry = windows.entry(ip).or_insert((now, 0));
        if now.duration_since(entry.0) > self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        entry.1 <= self.max
    }

    #[cfg(test)]
    fn tracked_addresses(&self) -> usize {
        match self.windows.lock() {
            Ok(w) => w.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Applied to `/api` routes. Requests with no connect info (in-process
/// test calls) pass through unlimited.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    if let Some(ip) = ip {
        if !state.limiter.check(ip) {
            tracing::warn!(%ip, "rate limit exceeded");
            return ApiError::TooManyRequests.into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_past_window_max() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));
    }

    #[test]
    fn counts_addresses_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        assert!(limiter.check(a));
        assert!(limiter.check(b));
        assert!(!limiter.check(a));
    }

    #[test]
    fn expired_windows_are_pruned() {
        let limiter = RateLimiter::new(1, Duration::ZERO);
        for i in 0..PRUNE_THRESHOLD {
            let ip = IpAddr::from([10, 1, (i >> 8) as u8, (i & 0xff) as u8]);
            limiter.check(ip);
        }
        assert_eq!(limiter.tracked_addresses(), PRUNE_THRESHOLD);
        std::thread::sleep(Duration::from_millis(5));
        limiter.check("192.168.0.1".parse().unwrap());
        assert_eq!(limiter.tracked_addresses(), 1);
    }

    #[test]
    fn window_resets() {
        let limiter = RateLimiter::new(1, Duration::ZERO);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(limiter.check(ip));
        std::thread::sleep(Duration::from_millis(5));
        assert!(limiter.check(ip));
    }
}
