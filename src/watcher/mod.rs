// src/watcher/mod.rs
mod change;
mod elb;
mod policy;

pub use change::has_changed;
pub use elb::ElbWatcher;
pub use policy::{apply_policy, ApplyDecision};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Exiting,
}

/// Cooperative exit flag, checked by a watcher once per cycle.
#[derive(Debug, Clone)]
pub struct ExitSignal {
    rx: watch::Receiver<bool>,
}

impl ExitSignal {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    pub fn should_exit(&self) -> bool {
        *self.rx.borrow()
    }
}

pub fn exit_channel() -> (watch::Sender<bool>, ExitSignal) {
    let (tx, rx) = watch::channel(false);
    (tx, ExitSignal::new(rx))
}

/// A background discovery worker.
#[async_trait]
pub trait Watcher: Send + 'static {
    fn name(&self) -> &str;

    /// Runs until `exit` is raised. Never returns early on errors.
    async fn run(&mut self, exit: ExitSignal);
}

/// Handle to a spawned watcher; the watcher is handed back on join.
pub struct WatcherHandle<W> {
    name: String,
    exit: watch::Sender<bool>,
    task: JoinHandle<W>,
}

impl<W> WatcherHandle<W> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the watcher to exit after its current cycle.
    pub fn stop(&self) {
        info!(watcher = %self.name, "Stopping watcher");
        let _ = self.exit.send(true);
    }

    pub async fn join(self) -> Result<W, JoinError> {
        self.task.await
    }
}

pub fn spawn<W: Watcher>(mut watcher: W) -> WatcherHandle<W> {
    let (exit, signal) = exit_channel();
    let name = watcher.name().to_string();

    let task = tokio::spawn(async move {
        watcher.run(signal).await;
        watcher
    });

    WatcherHandle { name, exit, task }
}
