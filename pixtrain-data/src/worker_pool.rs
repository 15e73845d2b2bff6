//! Worker threads for parallel batch loading.
//!
//! Each worker owns a bounded task channel and the main thread routes batches
//! to workers round-robin. All workers share one bounded output channel that
//! carries `(batch_index, result)` pairs; the `DataLoader` iterator restores
//! sampler order on its side.
//!
//! Channel sizing keeps the pool deadlock-free: a worker queue holds at most
//! `buffer_size` tasks and the output channel holds
//! `buffer_size * num_workers` results, which is the most the iterator ever
//! keeps in flight.
//!
//! A panic while loading a batch is caught in the worker and reported as that
//! batch's `WorkerError`; the worker then moves on to its next task.

use crate::dataloader::{fetch_batch, CollateFn};
use crate::datasets::Dataset;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use pixtrain_core::PixTrainError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Indices of one batch, tagged with its position in the epoch.
#[derive(Debug)]
pub(crate) struct BatchTask {
    pub(crate) batch_index: usize,
    pub(crate) indices: Vec<usize>,
}

pub(crate) type BatchOutput<B> = (usize, Result<B, PixTrainError>);

pub(crate) struct WorkerPool<B> {
    workers: Vec<thread::JoinHandle<()>>,
    task_txs: Vec<Sender<BatchTask>>,
    output_rx: Receiver<BatchOutput<B>>,
    shutdown: Arc<AtomicBool>,
}

impl<B: Send + 'static> WorkerPool<B> {
    /// Spawns `num_workers` threads that fetch and collate batches of `dataset`.
    pub(crate) fn spawn<D>(
        num_workers: usize,
        buffer_size: usize,
        dataset: Arc<D>,
        collate_fn: CollateFn<D, B>,
    ) -> Result<Self, PixTrainError>
    where
        D: Dataset + Send + Sync + 'static,
    {
        if num_workers == 0 {
            return Err(PixTrainError::WorkerError(
                "cannot create a worker pool with 0 workers".to_string(),
            ));
        }
        if buffer_size == 0 {
            return Err(PixTrainError::WorkerError(
                "worker buffer size must be > 0".to_string(),
            ));
        }

        let (output_tx, output_rx) = bounded(buffer_size * num_workers);
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(num_workers);
        let mut task_txs = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            let (task_tx, task_rx) = bounded::<BatchTask>(buffer_size);
            let output_tx: Sender<BatchOutput<B>> = output_tx.clone();
            let shutdown = shutdown.clone();
            let dataset = dataset.clone();
            let collate_fn = collate_fn.clone();

            let handle = thread::Builder::new()
                .name(format!("pixtrain-loader-{}", worker_id))
                .spawn(move || {
                    for task in task_rx.iter() {
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = panic::catch_unwind(AssertUnwindSafe(|| {
                            fetch_batch(dataset.as_ref(), &task.indices, collate_fn.as_ref())
                        }))
                        .unwrap_or_else(|payload| {
                            let message = panic_message(payload.as_ref());
                            log::warn!(
                                "Loader worker {} panicked on batch {}: {}",
                                worker_id,
                                task.batch_index,
                                message
                            );
                            Err(PixTrainError::WorkerError(format!(
                                "worker {} panicked while loading batch {}: {}",
                                worker_id, task.batch_index, message
                            )))
                        });
                        if output_tx.send((task.batch_index, result)).is_err() {
                            break;
                        }
                    }
                    log::debug!("Loader worker {} exiting", worker_id);
                })
                .map_err(|e| {
                    PixTrainError::WorkerError(format!(
                        "failed to spawn worker thread {}: {}",
                        worker_id, e
                    ))
                })?;

            workers.push(handle);
            task_txs.push(task_tx);
        }

        log::debug!("Spawned {} loader workers (buffer size {})", num_workers, buffer_size);
        Ok(Self {
            workers,
            task_txs,
            output_rx,
            shutdown,
        })
    }

    pub(crate) fn num_workers(&self) -> usize {
        self.task_txs.len()
    }

    /// Routes a task to the given worker, blocking while its queue is full.
    pub(crate) fn send(&self, worker_id: usize, task: BatchTask) -> Result<(), PixTrainError> {
        self.task_txs[worker_id]
            .send(task)
            .map_err(|_| PixTrainError::WorkerError(format!("worker {} has disconnected", worker_id)))
    }

    /// Blocks until some worker finishes a batch, or until `timeout` elapses
    /// when one is given.
    pub(crate) fn recv(&self, timeout: Option<Duration>) -> Result<BatchOutput<B>, PixTrainError> {
        let timeout = match timeout {
            Some(timeout) => timeout,
            None => {
                return self.output_rx.recv().map_err(|_| {
                    PixTrainError::WorkerError(
                        "worker channel disconnected; workers may have crashed".to_string(),
                    )
                })
            }
        };
        self.output_rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => PixTrainError::WorkerError(format!(
                "no batch received after {:?}; a worker may be stuck",
                timeout
            )),
            RecvTimeoutError::Disconnected => PixTrainError::WorkerError(
                "worker channel disconnected; workers may have crashed".to_string(),
            ),
        })
    }
}

impl<B> Drop for WorkerPool<B> {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Closing the task channels ends each worker's receive loop
        self.task_txs.clear();
        for (worker_id, worker) in self.workers.drain(..).enumerate() {
            if let Err(payload) = worker.join() {
                log::warn!(
                    "Loader worker {} terminated by a panic: {}",
                    worker_id,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

/// Extracts the message of a panic payload, if it is a string.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "worker_pool_test.rs"]
mod tests;
