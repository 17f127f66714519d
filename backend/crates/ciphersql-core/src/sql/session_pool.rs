//! Bounded pool of DataFusion sessions.
//!
//! A semaphore caps the number of sessions checked out at once. Idle
//! sessions are kept and reused. A [`PooledSession`] is an RAII guard: on
//! drop its `sandbox` catalog is replaced with an empty one and the session
//! goes back to the idle list, whether the query finished, failed or was
//! aborted.

use crate::catalog::{PUBLIC_SCHEMA, SANDBOX_CATALOG, WORKSPACE_SCHEMA};
use crate::error::{CatalogError, PoolError};
use crate::sql::DataFusionSessionFactory;
use datafusion::catalog::{CatalogProvider, MemoryCatalogProvider, SchemaProvider};
use datafusion::execution::context::SessionContext;
use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

struct PoolInner {
    factory: DataFusionSessionFactory,
    idle: Mutex<Vec<SessionContext>>,
    permits: Arc<Semaphore>,
    max_sessions: usize,
    acquire_timeout: Duration,
}

#[derive(Clone)]
pub struct SessionPool {
    inner: Arc<PoolInner>,
}

impl std::fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPool")
            .field("max_sessions", &self.inner.max_sessions)
            .field("available", &self.available())
            .field("idle", &self.idle_count())
            .finish()
    }
}

impl SessionPool {
    pub fn new(
        factory: DataFusionSessionFactory,
        max_sessions: usize,
        acquire_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                factory,
                idle: Mutex::new(Vec::with_capacity(max_sessions)),
                permits: Arc::new(Semaphore::new(max_sessions)),
                max_sessions,
                acquire_timeout,
            }),
        }
    }

    /// Check out a session, waiting up to the acquire timeout.
    pub async fn acquire(&self) -> Result<PooledSession, PoolError> {
        let permit = match tokio::time::timeout(
            self.inner.acquire_timeout,
            self.inner.permits.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(PoolError::Closed),
            Err(_) => {
                log::warn!(
                    "⏳ Session pool exhausted ({} sessions busy for {:?})",
                    self.inner.max_sessions,
                    self.inner.acquire_timeout
                );
                return Err(PoolError::Exhausted(self.inner.acquire_timeout));
            },
        };

        let reused = self.inner.idle.lock().pop();
        let ctx = match reused {
            Some(ctx) => ctx,
            None => {
                log::debug!("🆕 Creating sandbox session");
                self.inner.factory.create_session()
            },
        };

        Ok(PooledSession {
            ctx,
            pool: self.inner.clone(),
            _permit: permit,
        })
    }

    pub fn max_sessions(&self) -> usize {
        self.inner.max_sessions
    }

    /// Sessions that can be checked out right now.
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Stop handing out sessions. Pending and later acquires fail.
    pub fn close(&self) {
        self.inner.permits.close();
        self.inner.idle.lock().clear();
    }
}

/// A checked-out session. Derefs to `SessionContext`.
pub struct PooledSession {
    ctx: SessionContext,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl PooledSession {
    /// Scope the session to one workspace plus the shared `public` schema.
    pub fn bind(
        &self,
        workspace: Arc<dyn SchemaProvider>,
        public: Arc<dyn SchemaProvider>,
    ) -> Result<(), CatalogError> {
        let catalog = MemoryCatalogProvider::new();
        catalog
            .register_schema(WORKSPACE_SCHEMA, workspace)
            .map_err(|e| CatalogError::Engine(e.to_string()))?;
        catalog
            .register_schema(PUBLIC_SCHEMA, public)
            .map_err(|e| CatalogError::Engine(e.to_string()))?;
        self.register_catalog(SANDBOX_CATALOG, Arc::new(catalog));
        Ok(())
    }
}

impl Deref for PooledSession {
    type Target = SessionContext;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        // SessionContext clones share state, so the idle copy is this session
        self.ctx
            .register_catalog(SANDBOX_CATALOG, Arc::new(MemoryCatalogProvider::new()));
        if !self.pool.permits.is_closed() {
            self.pool.idle.lock().push(self.ctx.clone());
        }
    }
}
