//! Memory Pressure Task
//!
//! Background task that clears the memory tier whenever the host reports
//! memory pressure.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::ContentCache;

/// A low-memory notification from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPressure;

/// Spawns a task that calls `handle_memory_warning` for every signal.
///
/// The task ends when every sender has been dropped. Disk entries are left
/// alone, so reads after a signal fall through to disk and re-promote.
///
/// # Example
/// ```ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(4);
/// let handle = spawn_memory_pressure_task(cache.clone(), rx);
/// tx.send(MemoryPressure).await?;
/// ```
pub fn spawn_memory_pressure_task(
    cache: Arc<ContentCache>,
    mut signals: mpsc::Receiver<MemoryPressure>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Memory pressure listener started");

        while signals.recv().await.is_some() {
            let dropped = cache.handle_memory_warning().await;
            info!(dropped, "Handled memory pressure signal");
        }

        info!("Memory pressure listener stopped");
    })
}
