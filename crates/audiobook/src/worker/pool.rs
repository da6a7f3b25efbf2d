use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};

use crate::broadcast::JobStore;
use crate::error::WorkerError;
use crate::pipeline::{Pipeline, PipelineContext, StoreProgress};
use crate::worker::job::Job;

const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Fixed set of OS threads running conversions off a shared queue.
///
/// The queue is unbounded so [`WorkerPool::submit`] never blocks the caller;
/// the number of threads bounds how many conversions run at once.
pub struct WorkerPool {
    job_sender: Sender<Job>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(
        pipeline: Arc<Pipeline>,
        store: Arc<JobStore>,
        worker_count: usize,
    ) -> Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::SpawnFailed(
                "worker_count must be > 0".to_string(),
            ));
        }

        let (job_sender, job_receiver) = unbounded::<Job>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_pipeline = Arc::clone(&pipeline);
            let worker_store = Arc::clone(&store);

            let spawned = thread::Builder::new()
                .name(format!("audiobook-worker-{}", worker_id))
                .spawn(move || {
                    run_worker(
                        worker_id,
                        job_rx,
                        shutdown_flag,
                        worker_pipeline,
                        worker_store,
                    );
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Stop whatever already started before bailing out
                    shutdown.store(true, Ordering::Relaxed);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(WorkerError::SpawnFailed(e.to_string()));
                }
            }
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            job_sender,
            workers: Mutex::new(workers),
            shutdown,
        })
    }

    pub fn submit(&self, job: Job) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        self.job_sender
            .send(job)
            .map_err(|_| WorkerError::ChannelClosed)
    }

    /// Jobs waiting for a free worker.
    pub fn queued(&self) -> usize {
        self.job_sender.len()
    }

    /// Stops accepting jobs. Workers finish their current job and exit;
    /// jobs still queued are not started.
    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Waits for every worker thread to exit. Call after [`WorkerPool::shutdown`].
    pub fn join(&self) {
        let workers = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        for (i, worker) in workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    shutdown: Arc<AtomicBool>,
    pipeline: Arc<Pipeline>,
    store: Arc<JobStore>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(RECV_TIMEOUT) {
            Ok(job) => {
                debug!("Worker {} processing job {}", worker_id, job.id);

                let progress = StoreProgress::new(Arc::clone(&store), &job.id);
                let ctx = PipelineContext::new(job);
                let (result, _ctx) = pipeline.run(ctx, &progress);

                if result.success {
                    debug!("Worker {} completed job {}", worker_id, result.job_id);
                } else {
                    debug!(
                        "Worker {} failed job {}: {}",
                        worker_id,
                        result.job_id,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
