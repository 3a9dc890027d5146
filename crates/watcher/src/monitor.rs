//! The long-lived watch loop
//!
//! `notify` delivers events on its own thread; the callback forwards them into
//! an unbounded channel so the backend never blocks on us. One tokio task
//! drains that channel and dispatches events strictly in receive order.

use ff_core::{HistorySink, MonitorError, Result, WatchTarget};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::MonitorContext;
use crate::dispatch::Dispatcher;
use crate::translate::translate;

type NotifyResult = std::result::Result<notify::Event, notify::Error>;

/// Entry point for watching a hot directory
pub struct Monitor;

impl Monitor {
    /// Subscribe to `target`'s hot directory and start dispatching events
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(target: &WatchTarget, history: Arc<dyn HistorySink>) -> Result<MonitorHandle> {
        let shutdown = CancellationToken::new();
        let context = Arc::new(MonitorContext::new(target, history, shutdown.clone())?);

        let (tx, rx) = mpsc::unbounded_channel::<NotifyResult>();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                // Receiver gone means the monitor is stopping
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .map_err(|e| MonitorError::Watch(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(target.hot_dir(), RecursiveMode::NonRecursive)
            .map_err(|e| {
                MonitorError::Watch(format!("failed to watch {}: {e}", target.hot_dir().display()))
            })?;

        let dispatcher = Dispatcher::new(context.clone());
        let task = tokio::spawn(run(rx, dispatcher, shutdown.clone()));

        info!("Monitoring files in: {}", target.hot_dir().display());
        info!("Saving backup to: {}", target.backup_dir().display());

        Ok(MonitorHandle {
            watcher: Some(watcher),
            shutdown,
            task,
            context,
        })
    }
}

/// A running monitor; call [`MonitorHandle::stop`] to shut it down
pub struct MonitorHandle {
    watcher: Option<RecommendedWatcher>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
    context: Arc<MonitorContext>,
}

impl MonitorHandle {
    /// Context shared with the dispatch loop
    pub fn context(&self) -> &MonitorContext {
        &self.context
    }

    /// Close the subscription, cancel pending deletions and wait for the loop
    pub async fn stop(mut self) {
        drop(self.watcher.take());
        self.context.scheduler.shutdown();
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            warn!("Watch loop ended abnormally: {}", e);
        }
        info!("Monitoring stopped");
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<NotifyResult>,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(Ok(event)) => {
                    for file_event in translate(event) {
                        let outcome = dispatcher.handle(&file_event);
                        debug!("{:?} {} -> {:?}", file_event.kind, file_event.path.display(), outcome);
                    }
                }
                Some(Err(e)) => warn!("Watcher error: {}", e),
                None => break,
            },
        }
    }
    debug!("Watch loop exited");
}
