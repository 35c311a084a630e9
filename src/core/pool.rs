//! Execution pool handle and awaitable dispatch results.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bevy::tasks::{block_on, AsyncComputeTaskPool, Task, TaskPool, TaskPoolBuilder};

use super::{CommandError, DispatchStatus};

/// Outcome of a pooled dispatch.
pub type DispatchResult = Result<DispatchStatus, CommandError>;

#[derive(Clone)]
enum PoolRef {
    Owned(Arc<TaskPool>),
    Global(&'static TaskPool),
}

/// A host-supplied pool that admission and execution are submitted to.
///
/// # Examples
///
/// ```
/// use bevy_commander::ExecutionPool;
///
/// let dedicated = ExecutionPool::with_threads(2);
/// let shared = ExecutionPool::async_compute();
/// assert!(dedicated.thread_num() >= 1);
/// assert!(shared.thread_num() >= 1);
/// ```
#[derive(Clone)]
pub struct ExecutionPool {
    pool: PoolRef,
}

impl ExecutionPool {
    /// Wrap an existing task pool.
    pub fn new(pool: TaskPool) -> Self {
        Self {
            pool: PoolRef::Owned(Arc::new(pool)),
        }
    }

    /// A dedicated pool with `threads` worker threads.
    pub fn with_threads(threads: usize) -> Self {
        Self::new(
            TaskPoolBuilder::new()
                .num_threads(threads.max(1))
                .thread_name("Commander Pool".to_string())
                .build(),
        )
    }

    /// Bevy's global async compute pool, initialized on first use.
    pub fn async_compute() -> Self {
        let pool: &'static TaskPool = AsyncComputeTaskPool::get_or_init(TaskPool::default);
        Self {
            pool: PoolRef::Global(pool),
        }
    }

    fn task_pool(&self) -> &TaskPool {
        match &self.pool {
            PoolRef::Owned(pool) => pool.as_ref(),
            PoolRef::Global(pool) => *pool,
        }
    }

    pub fn thread_num(&self) -> usize {
        self.task_pool().thread_num()
    }

    pub(crate) fn spawn<T>(&self, future: impl Future<Output = T> + Send + 'static) -> Task<T>
    where
        T: Send + 'static,
    {
        self.task_pool().spawn(future)
    }
}

impl From<TaskPool> for ExecutionPool {
    fn from(pool: TaskPool) -> Self {
        Self::new(pool)
    }
}

impl fmt::Debug for ExecutionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.pool {
            PoolRef::Owned(_) => "owned",
            PoolRef::Global(_) => "async_compute",
        };
        f.debug_struct("ExecutionPool")
            .field("kind", &kind)
            .field("threads", &self.thread_num())
            .finish()
    }
}

enum HandleState {
    Ready(DispatchResult),
    Pending(Task<DispatchResult>),
    Done,
}

/// Resolves once admission and execution (or rejection) have completed.
///
/// The result is yielded once; polling again after that stays pending.
/// Dropping the handle cancels the underlying task if it has not started.
#[must_use = "dropping a DispatchHandle cancels the dispatch"]
pub struct DispatchHandle {
    state: HandleState,
}

impl DispatchHandle {
    pub(crate) fn ready(result: DispatchResult) -> Self {
        Self {
            state: HandleState::Ready(result),
        }
    }

    pub(crate) fn pending(task: Task<DispatchResult>) -> Self {
        Self {
            state: HandleState::Pending(task),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Ready(_) | HandleState::Done => true,
            HandleState::Pending(task) => task.is_finished(),
        }
    }

    /// Block the current thread until the dispatch settles.
    pub fn wait(self) -> DispatchResult {
        block_on(self)
    }

    /// Cancel the dispatch.
    ///
    /// Returns the result if it had already completed. The handler may have
    /// started even when this returns `None`.
    pub async fn cancel(self) -> Option<DispatchResult> {
        match self.state {
            HandleState::Ready(result) => Some(result),
            HandleState::Pending(task) => task.cancel().await,
            HandleState::Done => None,
        }
    }
}

impl Future for DispatchHandle {
    type Output = DispatchResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match std::mem::replace(&mut this.state, HandleState::Done) {
            HandleState::Ready(result) => Poll::Ready(result),
            HandleState::Pending(mut task) => match Pin::new(&mut task).poll(cx) {
                Poll::Ready(result) => Poll::Ready(result),
                Poll::Pending => {
                    this.state = HandleState::Pending(task);
                    Poll::Pending
                }
            },
            HandleState::Done => Poll::Pending,
        }
    }
}

impl fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}
