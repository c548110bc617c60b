//! Quiet-period debounce driven by a single owner task.

use std::{future::Future, time::Duration};

use tokio::{
    sync::mpsc::{self, UnboundedSender},
    time::timeout,
};
use tracing::debug;

/// Fires `on_quiet` once `delay` has elapsed since the most recent
/// [`Debouncer::touch`]. Each touch restarts the timer. The task exits when
/// the debouncer is dropped.
#[derive(Debug)]
pub struct Debouncer {
    tx: UnboundedSender<()>,
}

impl Debouncer {
    pub fn spawn<F, Fut>(delay: Duration, mut on_quiet: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                loop {
                    match timeout(delay, rx.recv()).await {
                        Ok(Some(())) => continue,
                        Ok(None) => {
                            debug!("debouncer dropped with a pending tick");
                            return;
                        }
                        Err(_) => break,
                    }
                }
                on_quiet().await;
            }
        });
        Self { tx }
    }

    /// Record activity and restart the quiet period
    pub fn touch(&self) {
        // The task only goes away with the runtime.
        let _ = self.tx.send(());
    }
}
