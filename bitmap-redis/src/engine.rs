use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use tracing::{trace, warn};

use crate::client::ScriptClient;
use crate::error::{RemoteError, Result};
use crate::script::{Operation, W32, W64, Width};

/// A bitmap with 32-bit members stored in Redis.
pub type Bitmap32<C> = DistributedBitmap<W32, C>;

/// A bitmap with 64-bit members stored in Redis.
pub type Bitmap64<C> = DistributedBitmap<W64, C>;

/// A named bitmap whose state lives entirely in Redis.
///
/// Every method is exactly one script call against the key `{name}`. The
/// braces form a cluster hash tag, so all calls for one name route to the
/// same slot. Two instances created with the same name are the same bitmap.
///
/// Nothing is cached or retried locally. Dropping an in-flight call's future
/// cancels the wait, not the script: the remote state is whatever the script
/// did or did not complete.
pub struct DistributedBitmap<W: Width, C> {
    name: String,
    key: String,
    client: C,
    timeout: Option<Duration>,
    _width: PhantomData<W>,
}

impl<W: Width, C> fmt::Debug for DistributedBitmap<W, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedBitmap")
            .field("key", &self.key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The Redis key holding the bitmap named `name`.
pub fn key_for(name: &str) -> String {
    format!("{{{}}}", name)
}

impl<W: Width, C: ScriptClient> DistributedBitmap<W, C> {
    pub fn new(name: impl Into<String>, client: C) -> Self {
        let name = name.into();
        let key = key_for(&name);
        Self {
            name,
            key,
            client,
            timeout: None,
            _width: PhantomData,
        }
    }

    /// Bound every call by `timeout`; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Insert `x`.
    pub async fn add(&self, x: W::Member) -> Result<()> {
        self.call(Operation::Add, Some(x)).await.map(drop)
    }

    /// Remove `x`. Removing an absent member is not an error.
    pub async fn remove(&self, x: W::Member) -> Result<()> {
        self.call(Operation::Remove, Some(x)).await.map(drop)
    }

    /// Test whether `x` is a member.
    pub async fn contains(&self, x: W::Member) -> Result<bool> {
        let reply = self.call(Operation::Contains, Some(x)).await?;
        flag(Operation::Contains, reply)
    }

    /// Returns `true` if the bitmap has no members (or does not exist).
    pub async fn is_empty(&self) -> Result<bool> {
        let reply = self.call(Operation::IsEmpty, None).await?;
        flag(Operation::IsEmpty, reply)
    }

    /// Number of members.
    pub async fn len(&self) -> Result<u64> {
        let reply = self.call(Operation::Len, None).await?;
        u64::try_from(reply).map_err(|_| RemoteError::UnexpectedReply {
            op: Operation::Len,
            reply,
        })
    }

    /// Delete the bitmap.
    pub async fn clear(&self) -> Result<()> {
        self.call(Operation::Clear, None).await.map(drop)
    }

    async fn call(&self, op: Operation, member: Option<W::Member>) -> Result<i64> {
        let keys = [self.key.clone()];
        let mut args = Vec::with_capacity(2);
        args.push(op.as_str().to_string());
        if let Some(x) = member {
            args.push(x.to_string());
        }
        trace!("{} {} {:?}", op, self.key, member);

        let invocation = self.client.invoke(W::script(), &keys, &args);
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, invocation)
                .await
                .unwrap_or(Err(RemoteError::Timeout(timeout))),
            None => invocation.await,
        };

        if let Err(err) = &result {
            warn!("{} on {} failed: {}", op, self.key, err);
        }
        result
    }
}

fn flag(op: Operation, reply: i64) -> Result<bool> {
    match reply {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(RemoteError::UnexpectedReply { op, reply }),
    }
}
