// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Keeps reminder batches from overlapping
//!
//! A process local mutex guards against overlapping ticks of a single instance. With redis
//! configured, a lock key with an expiry additionally guards against other instances.

use rand::{distributions::Alphanumeric, thread_rng, Rng};
use redis::aio::ConnectionManager;
use redis::{RedisError, Script, Value};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

const LOCK_KEY: &str = "rsvp-controller:reminder-batch";

const UNLOCK_SCRIPT: &str = r"
if redis.call('get',KEYS[1]) == ARGV[1] then
    return redis.call('del',KEYS[1])
else
    return 0
end";

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("a reminder batch is already running")]
    Busy,
    #[error("failed to acquire the batch lock: {0}")]
    Redis(#[from] RedisError),
}

pub struct BatchGuard {
    local: Mutex<()>,
    redis: Option<ConnectionManager>,
}

/// Proof of holding the batch lock, must be released with [`BatchPermit::release`]
pub struct BatchPermit<'a> {
    _local: MutexGuard<'a, ()>,
    remote: Option<(ConnectionManager, String)>,
}

impl BatchGuard {
    pub fn new(redis: Option<ConnectionManager>) -> Self {
        Self {
            local: Mutex::new(()),
            redis,
        }
    }

    /// Try to acquire the lock without waiting
    ///
    /// The redis lock expires after `ttl` even if the holder never releases it.
    pub async fn acquire(&self, ttl: Duration) -> Result<BatchPermit<'_>, LockError> {
        let local = self.local.try_lock().map_err(|_| LockError::Busy)?;

        let Some(redis) = &self.redis else {
            return Ok(BatchPermit {
                _local: local,
                remote: None,
            });
        };

        let mut redis = redis.clone();

        let token = thread_rng()
            .sample_iter(Alphanumeric)
            .take(20)
            .map(char::from)
            .collect::<String>();

        // SET with NX only succeeds if no other instance holds the key
        let res: Value = redis::cmd("SET")
            .arg(LOCK_KEY)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut redis)
            .await?;

        if let Value::Okay = res {
            Ok(BatchPermit {
                _local: local,
                remote: Some((redis, token)),
            })
        } else {
            Err(LockError::Busy)
        }
    }
}

impl BatchPermit<'_> {
    /// Release the lock
    ///
    /// The redis key is only deleted if it still carries this permit's token. Failures are
    /// logged, the key expires on its own.
    pub async fn release(self) {
        let Some((mut redis, token)) = self.remote else {
            return;
        };

        let result: Result<i32, RedisError> = Script::new(UNLOCK_SCRIPT)
            .key(LOCK_KEY)
            .arg(token)
            .invoke_async(&mut redis)
            .await;

        match result {
            Ok(1) => {}
            Ok(_) => log::warn!("Reminder batch lock expired before it was released"),
            Err(e) => log::warn!("Failed to release reminder batch lock, {}", e),
        }
    }
}
