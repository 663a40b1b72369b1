//! Pooled store client.
//!
//! Owns the r2d2 connection pool and a bounded set of blocking workers. All
//! statements run inside `tokio::task::spawn_blocking`, so async callers never
//! block on database I/O.

use crate::{DatabaseResult, StoreConfig};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::QueryResult;
use rankwarden_error::{DatabaseError, DatabaseErrorKind};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, instrument, warn};

/// PostgreSQL connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Fixed timeout for [`StoreClient::health_check`].
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Asynchronous facade over a pooled PostgreSQL connection.
///
/// Cloning is cheap and every clone shares the same pool. After
/// [`disconnect`](Self::disconnect) every call fails fast with
/// [`DatabaseErrorKind::Closed`].
///
/// Retry policy belongs to callers; the client never retries a statement.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    pool: RwLock<Option<PgPool>>,
    workers: Arc<Semaphore>,
    worker_threads: usize,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("worker_threads", &self.inner.worker_threads)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl StoreClient {
    /// Build a client from configuration.
    ///
    /// The pool is created lazily: no connection is required to succeed here.
    /// Call [`health_check`](Self::health_check) before sending traffic.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the pool or worker sizes are zero.
    #[instrument(skip(config), fields(url = %config.redacted_url()))]
    pub fn connect(config: &StoreConfig) -> DatabaseResult<Self> {
        if *config.max_pool_size() == 0 {
            return Err(DatabaseError::new(DatabaseErrorKind::Connection(
                "max_pool_size must be at least 1".to_string(),
            )));
        }

        let manager = ConnectionManager::<PgConnection>::new(config.database_url());
        let pool = Pool::builder()
            .max_size(*config.max_pool_size())
            .connection_timeout(Duration::from_millis(*config.connection_timeout_millis()))
            .build_unchecked(manager);

        info!(
            max_pool_size = config.max_pool_size(),
            worker_threads = config.worker_threads(),
            "Created database connection pool"
        );

        Self::from_pool(pool, *config.worker_threads())
    }

    /// Wrap an existing pool.
    ///
    /// # Errors
    ///
    /// Returns a connection error if `worker_threads` is zero.
    pub fn from_pool(pool: PgPool, worker_threads: usize) -> DatabaseResult<Self> {
        if worker_threads == 0 {
            return Err(DatabaseError::new(DatabaseErrorKind::Connection(
                "worker_threads must be at least 1".to_string(),
            )));
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                pool: RwLock::new(Some(pool)),
                workers: Arc::new(Semaphore::new(worker_threads)),
                worker_threads,
            }),
        })
    }

    /// Run a read statement on a pooled connection.
    ///
    /// `statement` binds its parameters and maps the returned rows. The
    /// connection is returned to the pool on every path, including failure.
    ///
    /// # Errors
    ///
    /// - `Closed` if the client was disconnected
    /// - `Connection` if no connection could be acquired within the pool timeout
    /// - `Query` if the statement failed
    /// - `Worker` if the blocking worker panicked
    #[instrument(skip(self, statement))]
    pub async fn query<T, F>(&self, operation: &'static str, statement: F) -> DatabaseResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    {
        let permit = self.acquire_worker().await?;
        let pool = self.pool()?;

        debug!("Dispatching statement to blocking worker");

        tokio::task::spawn_blocking(move || -> DatabaseResult<T> {
            let _permit: OwnedSemaphorePermit = permit;
            let mut conn = pool.get()?;
            statement(&mut *conn).map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Worker(e.to_string())))?
    }

    /// Run a write statement and return the number of affected rows.
    ///
    /// # Errors
    ///
    /// Same conditions as [`query`](Self::query).
    #[instrument(skip(self, statement))]
    pub async fn update<F>(&self, operation: &'static str, statement: F) -> DatabaseResult<usize>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<usize> + Send + 'static,
    {
        let rows_affected = self.query(operation, statement).await?;
        debug!(rows_affected, "Statement applied");
        Ok(rows_affected)
    }

    /// Validate that a pooled connection is usable.
    ///
    /// Checks out a connection and runs `SELECT 1`, giving up after
    /// [`HEALTH_CHECK_TIMEOUT`]. Does not consume a worker permit, so it can run
    /// before any other traffic.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> bool {
        let Ok(pool) = self.pool() else {
            warn!("Health check on closed client");
            return false;
        };

        let check = tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool.get_timeout(HEALTH_CHECK_TIMEOUT)?;
            conn.batch_execute("SELECT 1")?;
            Ok(())
        });

        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, check).await {
            Ok(Ok(Ok(()))) => {
                debug!("Database health check returned successfully");
                true
            }
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Database health check failed");
                false
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Database health check worker failed");
                false
            }
            Err(_) => {
                warn!(timeout = ?HEALTH_CHECK_TIMEOUT, "Database health check timed out");
                false
            }
        }
    }

    /// Close the pool and reject further work.
    ///
    /// Idle connections are dropped immediately; connections held by in-flight
    /// statements close when those statements finish. Calling this twice is a
    /// no-op.
    #[instrument(skip(self))]
    pub fn disconnect(&self) {
        self.inner.workers.close();

        let pool = match self.inner.pool.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(pool) = pool {
            let state = pool.state();
            drop(pool);
            info!(
                connections = state.connections,
                idle = state.idle_connections,
                "Closed database connection pool"
            );
        }
    }

    /// Whether [`disconnect`](Self::disconnect) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.workers.is_closed()
    }

    /// Maximum statements that run concurrently.
    pub fn worker_threads(&self) -> usize {
        self.inner.worker_threads
    }

    async fn acquire_worker(&self) -> DatabaseResult<OwnedSemaphorePermit> {
        self.inner
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DatabaseError::new(DatabaseErrorKind::Closed))
    }

    fn pool(&self) -> DatabaseResult<PgPool> {
        let guard = match self.inner.pool.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .clone()
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::Closed))
    }
}
