//! Transaction runner: retry-wrapped units of work against Postgres.
//!
//! Every mutation the planning store performs goes through
//! [`TransactionRunner::run`]: begin, run the closure, commit on normal
//! return, roll back on any error (transactions roll back on drop).
//! Transient conflicts (deadlock, serialization failure, lock not
//! available, or a connection/timeout condition) retry the whole
//! transaction from the start with linear backoff. Anything else, or an
//! exhausted retry budget, surfaces as a single transaction-failed
//! error wrapping the last cause; callers must not assume partial
//! effects.

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::ports::StoreError;

/// Retry policy for transient transaction failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first.
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `retry_delay * n` (linear backoff).
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// The backoff delay after a failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.retry_delay * attempt
    }
}

/// Runs an operation under a retry policy.
///
/// The operation receives the 1-based attempt number. A retryable error
/// with attempts remaining waits the scheduled delay and reruns the
/// operation from scratch; the final error is returned unchanged.
pub async fn run_with_retries<T, E, Op, Fut>(
    policy: &RetryPolicy,
    is_retryable: impl Fn(&E) -> bool,
    mut op: Op,
) -> Result<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) && attempt < policy.max_retries => {
                debug!(attempt, "retrying transient failure");
                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Error raised inside a transactional operation.
#[derive(Debug)]
pub enum TxOpError {
    /// The data store failed.
    Db(sqlx::Error),
    /// A row the operation required does not exist. Surfaces as
    /// not-found, never retried.
    NotFound(&'static str),
}

impl From<sqlx::Error> for TxOpError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err)
    }
}

impl TxOpError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Db(err) => is_retryable_db_error(err),
            Self::NotFound(_) => false,
        }
    }
}

/// Postgres error codes that signal a transient conflict.
const RETRYABLE_SQLSTATE: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
];

/// Classifies a sqlx error as retryable.
pub fn is_retryable_db_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| is_retryable_sqlstate(&code))
            .unwrap_or(false),
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        other => is_retryable_message(&other.to_string()),
    }
}

/// Classifies a SQLSTATE code as retryable.
pub fn is_retryable_sqlstate(code: &str) -> bool {
    RETRYABLE_SQLSTATE.contains(&code)
}

/// Classifies an error message as a connection/timeout condition.
pub fn is_retryable_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("connection") || lower.contains("timeout") || lower.contains("timed out")
}

/// A closure running one unit of work inside a transaction.
///
/// Boxed so adapters can build operations with captured state; the
/// runner may invoke the closure several times (one per retry).
pub type TxOp<T> = Box<
    dyn for<'t> Fn(&'t mut Transaction<'static, Postgres>) -> BoxFuture<'t, Result<T, TxOpError>>
        + Send
        + Sync,
>;

/// A cascade operation: runs after the primary operation in the same
/// transaction and receives the primary's result.
pub type CascadeOp<T, U> = Box<
    dyn for<'t> Fn(
            &'t mut Transaction<'static, Postgres>,
            &'t T,
        ) -> BoxFuture<'t, Result<U, TxOpError>>
        + Send
        + Sync,
>;

/// Retry-wrapped transaction execution against a pool.
#[derive(Clone)]
pub struct TransactionRunner {
    pool: PgPool,
    policy: RetryPolicy,
}

impl TransactionRunner {
    /// Creates a runner with the default policy.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            policy: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs one unit of work in a transaction, retrying the whole
    /// transaction on transient conflicts.
    pub async fn run<T>(&self, op: TxOp<T>) -> Result<T, StoreError> {
        let pool = &self.pool;
        let op = &op;
        let result = run_with_retries(&self.policy, TxOpError::is_retryable, move |_attempt| {
            async move {
                let mut tx = pool.begin().await.map_err(TxOpError::Db)?;
                let value = op(&mut tx).await?;
                tx.commit().await.map_err(TxOpError::Db)?;
                Ok::<_, TxOpError>(value)
            }
        })
        .await;

        result.map_err(|err| match err {
            TxOpError::NotFound(kind) => StoreError::not_found(kind),
            TxOpError::Db(db) => StoreError::transaction(db.to_string()),
        })
    }

    /// Runs a primary operation and its dependent cascade operations in
    /// one retry-wrapped transaction. Each cascade receives the
    /// primary's result; a cascade failure rolls back everything.
    pub async fn run_with_cascade<T, U>(
        &self,
        main: TxOp<T>,
        cascades: Vec<CascadeOp<T, U>>,
    ) -> Result<CascadeOutcome<T, U>, StoreError>
    where
        T: Send + Sync,
        U: Send,
    {
        let pool = &self.pool;
        let main = &main;
        let cascades = &cascades;
        let result = run_with_retries(&self.policy, TxOpError::is_retryable, move |_attempt| {
            async move {
                let mut tx = pool.begin().await.map_err(TxOpError::Db)?;
                let primary = main(&mut tx).await?;
                let mut cascade = Vec::with_capacity(cascades.len());
                for op in cascades.iter() {
                    cascade.push(op(&mut tx, &primary).await?);
                }
                tx.commit().await.map_err(TxOpError::Db)?;
                Ok::<_, TxOpError>(CascadeOutcome {
                    main: primary,
                    cascade,
                })
            }
        })
        .await;

        result.map_err(|err| match err {
            TxOpError::NotFound(kind) => StoreError::not_found(kind),
            TxOpError::Db(db) => StoreError::transaction(db.to_string()),
        })
    }
}

/// Result of a cascade transaction: the primary result plus one result
/// per cascade operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome<T, U> {
    /// The primary operation's result.
    pub main: T,
    /// The cascade operations' results, in order.
    pub cascade: Vec<U>,
}
