use std::sync::Arc;

use async_trait::async_trait;
use redis::Script;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::config::RedisConfig;
use crate::error::Result;

/// A key-value client able to run a server-side script atomically.
#[async_trait]
pub trait ScriptClient: Send + Sync {
    /// Run `script` with `keys` as `KEYS` and `args` as `ARGV`, returning its
    /// integer reply.
    async fn invoke(&self, script: &Script, keys: &[String], args: &[String]) -> Result<i64>;
}

#[async_trait]
impl<T: ScriptClient + ?Sized> ScriptClient for Arc<T> {
    async fn invoke(&self, script: &Script, keys: &[String], args: &[String]) -> Result<i64> {
        (**self).invoke(script, keys, args).await
    }
}

/// [`ScriptClient`] over a multiplexed, auto-reconnecting Redis connection.
///
/// Scripts are sent with `EVALSHA`; the `EVAL` fallback on `NOSCRIPT` is
/// handled by [`Script`]. Cloning is cheap and shares the connection.
#[derive(Clone)]
pub struct RedisScriptClient {
    conn: ConnectionManager,
}

impl RedisScriptClient {
    /// Connect to the server at `config.url`.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        debug!("Connected to redis at {}", config.url);
        Ok(Self { conn })
    }

    /// Wrap an existing connection manager.
    pub fn from_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ScriptClient for RedisScriptClient {
    async fn invoke(&self, script: &Script, keys: &[String], args: &[String]) -> Result<i64> {
        let mut invocation = script.prepare_invoke();
        for key in keys {
            invocation.key(key);
        }
        for arg in args {
            invocation.arg(arg);
        }

        let mut conn = self.conn.clone();
        let reply: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(reply)
    }
}
