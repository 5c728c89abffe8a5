//! A bounded pool of reusable connections.
//!
//! The pool holds idle connections in LIFO order (most recently used
//! first, to prefer warm sockets), lends them out one borrower at a
//! time, and grows lazily up to its upper bound. Saturated acquires park
//! on a wait list and are woken one at a time as connections come back.
//!
//! State lives under a `std::sync::Mutex` that is never held across a
//! suspension point: the factory call and the wait-list park both happen
//! with the lock released, so pool mutation stays atomic while I/O and
//! waiting proceed concurrently.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

use crate::client::config::PoolSize;
use crate::client::error::{AcquireError, ConnectError};

pub(crate) struct Pool<T> {
    size: PoolSize,
    state: Mutex<PoolState<T>>,
    wait_list: Notify,
}

struct PoolState<T> {
    /// Idle connections; the last element is the most recently returned.
    available: Vec<T>,
    /// Connections currently lent out (including growth slots reserved
    /// while a factory call is in flight).
    borrowed: usize,
    /// Callers currently parked in `acquire`.
    waiting: usize,
}

enum Action<T> {
    Ready(T),
    Grow,
    Wait,
}

impl<T> Pool<T> {
    pub(crate) fn new(size: PoolSize) -> Self {
        Self {
            size,
            state: Mutex::new(PoolState { available: Vec::with_capacity(size.max()), borrowed: 0, waiting: 0 }),
            wait_list: Notify::new(),
        }
    }

    /// Eagerly constructs the configured minimum of connections.
    ///
    /// The first factory failure aborts initialization and surfaces the
    /// error; connections constructed so far are dropped with the pool.
    pub(crate) async fn init<F, Fut>(&self, factory: F) -> Result<(), ConnectError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ConnectError>>,
    {
        for _ in 0..self.size.min() {
            let conn = factory().await?;
            self.state().available.push(conn);
        }
        debug!(eager = self.size.min(), "connection pool initialized");
        Ok(())
    }

    /// Acquires one connection, blocking until one is available, the
    /// pool can grow, or `deadline` passes.
    ///
    /// A new connection is only constructed while
    /// `borrowed + available < max`; the slot is reserved before the
    /// factory call and rolled back if it fails, keeping the bound intact
    /// across concurrent growth. Wakeups race with fresh callers by
    /// design, so availability is re-checked on every loop iteration.
    pub(crate) async fn acquire<F, Fut>(&self, factory: F, deadline: Instant) -> Result<T, AcquireError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ConnectError>>,
    {
        loop {
            let action = {
                let mut state = self.state();
                if let Some(conn) = state.available.pop() {
                    state.borrowed += 1;
                    Action::Ready(conn)
                } else if state.borrowed + state.available.len() < self.size.max() {
                    state.borrowed += 1;
                    Action::Grow
                } else {
                    state.waiting += 1;
                    Action::Wait
                }
            };

            match action {
                Action::Ready(conn) => {
                    trace!("reusing pooled connection");
                    return Ok(conn);
                }
                Action::Grow => {
                    debug!("pool below bound, constructing a new connection");
                    match factory().await {
                        Ok(conn) => return Ok(conn),
                        Err(e) => {
                            self.state().borrowed -= 1;
                            return Err(e.into());
                        }
                    }
                }
                Action::Wait => {
                    // unwinds `waiting` on every exit path, including
                    // cancellation of the acquire future itself
                    let _waiting = WaitingGuard(self);
                    trace!("pool saturated, parking until a connection is returned");
                    if timeout_at(deadline, self.wait_list.notified()).await.is_err() {
                        return Err(AcquireError::Timeout);
                    }
                }
            }
        }
    }

    /// Returns a connection for reuse; the next `acquire` pops it first.
    pub(crate) fn release(&self, conn: T) {
        let mut state = self.state();
        state.available.push(conn);
        state.borrowed -= 1;
        if state.waiting > 0 {
            // a permit is stored if the waiter has not parked yet, so the
            // signal cannot be lost to the park/notify race
            self.wait_list.notify_one();
        }
    }

    /// Destroys a connection, freeing its slot without waking anyone:
    /// the disposing caller re-enters `acquire` itself and grows into
    /// the freed slot on its next check.
    pub(crate) fn close(&self, conn: T) {
        self.state().borrowed -= 1;
        drop(conn);
    }

    pub(crate) fn idle_count(&self) -> usize {
        self.state().available.len()
    }

    pub(crate) fn borrowed_count(&self) -> usize {
        self.state().borrowed
    }

    pub(crate) fn waiting_count(&self) -> usize {
        self.state().waiting
    }

    fn state(&self) -> MutexGuard<'_, PoolState<T>> {
        self.state.lock().expect("pool state lock poisoned")
    }
}

struct WaitingGuard<'a, T>(&'a Pool<T>);

impl<T> Drop for WaitingGuard<'_, T> {
    fn drop(&mut self) {
        self.0.state().waiting -= 1;
    }
}
