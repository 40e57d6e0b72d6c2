use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use deadpool_redis::Pool;
use deadpool_redis::redis::Script;

use crate::domain::repository::RateLimiter;
use crate::domain::types::RateDecision;
use crate::error::AuthServiceError;

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

// ── In-process limiter ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_time_ms: u64,
}

/// Process-local sliding-window counter. Entries are created lazily and kept
/// for the process lifetime; counts are not shared across instances — use
/// [`RedisRateLimiter`] when running more than one replica.
#[derive(Clone, Default)]
pub struct MemoryRateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimiter for MemoryRateLimiter {
    async fn check(
        &self,
        key: &str,
        limit: u32,
        window_secs: u64,
    ) -> Result<RateDecision, AuthServiceError> {
        let now = now_ms();
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| anyhow::anyhow!("rate limit map poisoned"))?;

        let window = windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            reset_time_ms: now + window_secs * 1000,
        });

        if now > window.reset_time_ms {
            window.count = 1;
            window.reset_time_ms = now + window_secs * 1000;
        } else if window.count >= limit {
            // Rejected without incrementing further.
            return Ok(RateDecision {
                allowed: false,
                remaining: 0,
                reset_time_ms: window.reset_time_ms,
            });
        } else {
            window.count += 1;
        }

        Ok(RateDecision {
            allowed: true,
            remaining: limit - window.count,
            reset_time_ms: window.reset_time_ms,
        })
    }
}

// ── Redis-backed limiter ──────────────────────────────────────────────────────

/// Counter shared across instances via Redis. The check runs as a single
/// server-side script so the counter stops advancing once the limit is
/// reached — a rejected request neither consumes the window nor races a
/// concurrent allowed one. The window is fixed rather than sliding
/// per-request, which is close enough for these limits.
#[derive(Clone)]
pub struct RedisRateLimiter {
    pub pool: Pool,
}

const CHECK_SCRIPT: &str = r#"
local count = tonumber(redis.call('GET', KEYS[1]) or '0')
if count >= tonumber(ARGV[1]) then
    return {0, count, redis.call('TTL', KEYS[1])}
end
count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[2])
end
return {1, count, redis.call('TTL', KEYS[1])}
"#;

fn redis_key(key: &str) -> String {
    format!("ratelimit:{key}")
}

impl RateLimiter for RedisRateLimiter {
    async fn check(
        &self,
        key: &str,
        limit: u32,
        window_secs: u64,
    ) -> Result<RateDecision, AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;

        let (allowed, count, ttl): (i64, i64, i64) = Script::new(CHECK_SCRIPT)
            .key(redis_key(key))
            .arg(limit)
            .arg(window_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        let reset_time_ms = now_ms() + ttl.max(0) as u64 * 1000;

        Ok(RateDecision {
            allowed: allowed == 1,
            remaining: (limit as i64 - count).max(0) as u32,
            reset_time_ms,
        })
    }
}

// ── Backend selection ─────────────────────────────────────────────────────────

/// Concrete limiter held in `AppState`: Redis when `REDIS_URL` is configured,
/// process-local otherwise.
#[derive(Clone)]
pub enum AppRateLimiter {
    Memory(MemoryRateLimiter),
    Redis(RedisRateLimiter),
}

impl RateLimiter for AppRateLimiter {
    async fn check(
        &self,
        key: &str,
        limit: u32,
        window_secs: u64,
    ) -> Result<RateDecision, AuthServiceError> {
        match self {
            Self::Memory(inner) => inner.check(key, limit, window_secs).await,
            Self::Redis(inner) => inner.check(key, limit, window_secs).await,
        }
    }
}
