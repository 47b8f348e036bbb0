//! Lifecycle hooks
//!
//! The orchestrator knows nothing about UI toolkits. A host that wants to show a
//! progress indicator implements [`ProgressHook`]; a host that wants callbacks on a
//! particular thread implements [`CallerContext`] (or drains a [`ContextQueue`]).

use std::fmt::Debug;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Continuation handed to a [`CallerContext`]
pub type Resume = Box<dyn FnOnce() + Send + 'static>;

/// Progress indicator owned by the host
pub trait ProgressHook: Send + Sync + Debug {
    /// Request started, `message` is the configured wait message
    fn on_start(&self, message: &str);

    /// Request finished, on every path
    fn on_end(&self);
}

/// Progress hook plus the message to show
#[derive(Debug, Clone)]
pub struct Progress {
    hook: Arc<dyn ProgressHook>,
    message: String,
}

impl Progress {
    /// Create a new progress configuration
    pub fn new(hook: Arc<dyn ProgressHook>, message: impl Into<String>) -> Self {
        Self {
            hook,
            message: message.into(),
        }
    }

    /// Wait message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Calls `on_start` when created and `on_end` when dropped
#[derive(Debug)]
pub(crate) struct ProgressGuard {
    hook: Option<Arc<dyn ProgressHook>>,
}

impl ProgressGuard {
    pub(crate) fn start(progress: Option<&Progress>) -> Self {
        let hook = progress.map(|progress| {
            progress.hook.on_start(&progress.message);
            Arc::clone(&progress.hook)
        });

        Self { hook }
    }
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if let Some(hook) = self.hook.take() {
            hook.on_end();
        }
    }
}

/// Execution context an asynchronous continuation is resumed on
pub trait CallerContext: Send + Sync + Debug {
    /// Run `task` on this context. Dropping it without running is allowed.
    fn resume(&self, task: Resume);
}

/// [`CallerContext`] feeding a [`ContextQueue`]
#[derive(Debug, Clone)]
pub struct QueueContext {
    sender: Sender<Resume>,
}

/// Receiving end of a [`QueueContext`], drained by the host thread
#[derive(Debug)]
pub struct ContextQueue {
    receiver: Receiver<Resume>,
}

/// Create a connected [`QueueContext`] and [`ContextQueue`]
pub fn queue_context() -> (QueueContext, ContextQueue) {
    let (sender, receiver) = mpsc::channel();
    (QueueContext { sender }, ContextQueue { receiver })
}

impl CallerContext for QueueContext {
    fn resume(&self, task: Resume) {
        if self.sender.send(task).is_err() {
            tracing::warn!("Caller context is gone, dropping continuation");
        }
    }
}

impl ContextQueue {
    /// Run every continuation already queued, returns how many ran
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one continuation and run it
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        started: Mutex<Vec<String>>,
        ended: AtomicUsize,
    }

    impl ProgressHook for Counter {
        fn on_start(&self, message: &str) {
            self.started.lock().expect("lock").push(message.to_string());
        }

        fn on_end(&self) {
            self.ended.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_guard_runs_hooks_once() {
        let counter = Arc::new(Counter::default());
        let progress = Progress::new(counter.clone(), "Loading...");

        {
            let _guard = ProgressGuard::start(Some(&progress));
            assert_eq!(counter.ended.load(Ordering::SeqCst), 0);
        }

        assert_eq!(
            *counter.started.lock().expect("lock"),
            vec!["Loading...".to_string()]
        );
        assert_eq!(counter.ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_without_progress() {
        let _guard = ProgressGuard::start(None);
    }

    #[test]
    fn test_queue_context_runs_on_drain() {
        let (context, queue) = queue_context();
        let ran = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let ran = Arc::clone(&ran);
            context.resume(Box::new(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(queue.run_pending(), 2);
        assert_eq!(ran.load(Ordering::SeqCst), 2);
        assert!(!queue.run_next(Duration::from_millis(10)));
    }

    #[test]
    fn test_dropped_queue_drops_continuation() {
        let (context, queue) = queue_context();
        drop(queue);

        let counter = Arc::new(Counter::default());
        let guard = ProgressGuard::start(Some(&Progress::new(counter.clone(), "")));
        context.resume(Box::new(move || drop(guard)));

        assert_eq!(counter.ended.load(Ordering::SeqCst), 1);
    }
}
