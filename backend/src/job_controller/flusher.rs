//! Background flushing of the submission queue.
//!
//! A single worker task wakes up every `interval` (30 s by default), or
//! sooner when the upload handler asks for an immediate flush because the
//! queue grew past `immediate_threshold`. If records are still waiting after
//! a flush, the next wake-up uses the shorter `fast_interval` until the queue
//! is empty again.
//!
//! `flush_batch` is guarded by an async mutex. The timer path, the immediate
//! path and the shutdown drain therefore never read or rewrite the document
//! at the same time, and never hand the same records to two writers.

use super::queue::SubmissionQueue;
use crate::error::AppError;
use crate::services::registrations::repository::CsvRepository;
use crate::services::settings::store::ConfigStore;
use common::jobs::FlushStatus;
use common::model::registration::RegistrationRecord;
use log::{debug, error, info, warn};
use rand::Rng;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as AsyncMutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use uuid::Uuid;

/// Backoff applied to retryable write failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of write attempts per batch, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    const MAX_JITTER_MS: u64 = 100;

    /// `base_delay * 2^retry` plus up to 100 ms of random jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.min(16);
        let jitter = if self.base_delay.is_zero() {
            0
        } else {
            rand::thread_rng().gen_range(0..=Self::MAX_JITTER_MS)
        };
        self.base_delay.saturating_mul(factor) + Duration::from_millis(jitter)
    }
}

#[derive(Debug, Clone)]
pub struct FlushConfig {
    pub interval: Duration,
    pub fast_interval: Duration,
    pub max_batch_size: usize,
    pub immediate_threshold: usize,
    pub retry: RetryPolicy,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            fast_interval: Duration::from_secs(5),
            max_batch_size: 50,
            immediate_threshold: 10,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(200),
            },
        }
    }
}

#[derive(Debug)]
enum FlushSignal {
    Now,
    Stop,
}

pub struct Flusher {
    queue: Arc<SubmissionQueue>,
    repository: Arc<CsvRepository>,
    store: Arc<ConfigStore>,
    config: FlushConfig,
    in_flight: AsyncMutex<()>,
    last_status: RwLock<FlushStatus>,
    tx: mpsc::Sender<FlushSignal>,
    rx: Mutex<Option<mpsc::Receiver<FlushSignal>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Flusher {
    pub fn new(
        queue: Arc<SubmissionQueue>,
        repository: Arc<CsvRepository>,
        store: Arc<ConfigStore>,
        config: FlushConfig,
    ) -> Arc<Self> {
        // capacity 1: a pending "flush now" already covers later requests
        let (tx, rx) = mpsc::channel(1);
        Arc::new(Self {
            queue,
            repository,
            store,
            config,
            in_flight: AsyncMutex::new(()),
            last_status: RwLock::new(FlushStatus::Idle),
            tx,
            rx: Mutex::new(Some(rx)),
            worker: Mutex::new(None),
        })
    }

    pub fn queue(&self) -> &SubmissionQueue {
        &self.queue
    }

    pub async fn last_status(&self) -> FlushStatus {
        self.last_status.read().await.clone()
    }

    /// Spawns the background worker. Calling it a second time does nothing.
    pub fn start(self: &Arc<Self>) {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner).take();
        match rx {
            Some(rx) => {
                info!(
                    "Starting batch processing every {:?} (fast {:?})",
                    self.config.interval, self.config.fast_interval
                );
                let handle = tokio::spawn(run_worker(self.clone(), rx));
                *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
            }
            None => warn!("Batch processing already started"),
        }
    }

    /// Queues a record and asks for an immediate flush once the queue is
    /// longer than the configured threshold. Returns the queue length.
    pub fn submit(&self, record: RegistrationRecord) -> usize {
        let length = self.queue.enqueue(record);
        debug!("Record added to queue ({} pending)", length);
        if length > self.config.immediate_threshold {
            self.trigger();
        }
        length
    }

    /// Holds off flushes while the caller rewrites the document for another
    /// reason, such as a schema migration or a clear.
    pub async fn document_guard(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.in_flight.lock().await
    }

    /// Wakes the worker without waiting for the timer.
    pub fn trigger(&self) {
        if self.tx.try_send(FlushSignal::Now).is_ok() {
            debug!("Immediate flush requested");
        }
    }

    /// Writes up to `max_batch_size` records from the head of the queue.
    ///
    /// The document is downloaded, rebuilt with the batch appended, and
    /// uploaded in full. Retryable upload failures are retried with
    /// exponential backoff. The batch leaves the queue only after a
    /// successful upload. On any failure it stays at the head and the remote
    /// document is untouched by this call.
    pub async fn flush_batch(&self) -> Result<FlushStatus, AppError> {
        let _guard = self.in_flight.lock().await;

        let batch = self.queue.peek_batch(self.config.max_batch_size);
        if batch.is_empty() {
            debug!("No submissions to process");
            *self.last_status.write().await = FlushStatus::Idle;
            return Ok(FlushStatus::Idle);
        }

        let batch_id = Uuid::new_v4();
        info!(
            "Processing batch {} of {} submissions ({} total in queue)",
            batch_id,
            batch.len(),
            self.queue.len()
        );

        let status = match self.write_batch(batch_id, &batch).await {
            Ok(()) => {
                self.queue.remove_batch(batch.len());
                info!(
                    "Successfully processed batch {} of {} submissions",
                    batch_id,
                    batch.len()
                );
                Ok(FlushStatus::Flushed(batch.len() as u32))
            }
            Err(e) => {
                error!(
                    "Batch {} failed, {} submissions kept at the head of the queue: {}",
                    batch_id,
                    batch.len(),
                    e
                );
                *self.last_status.write().await = FlushStatus::Requeued {
                    count: batch.len() as u32,
                    reason: e.to_string(),
                };
                Err(e)
            }
        }?;

        *self.last_status.write().await = status.clone();
        Ok(status)
    }

    async fn write_batch(
        &self,
        batch_id: Uuid,
        batch: &[RegistrationRecord],
    ) -> Result<(), AppError> {
        let fields = self.store.form_fields().await;
        let file_id = self.repository.resolve_document().await?;
        let existing = self.repository.read_rows(&file_id).await?;

        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = self
                .repository
                .rewrite_with(&file_id, &existing, batch, &fields)
                .await;
            match result {
                Ok(()) => return Ok(()),
                Err(AppError::Remote(e)) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.retry.delay_for(attempt);
                    warn!(
                        "Retry attempt {} of batch {} after {:?} due to error: {}",
                        attempt, batch_id, delay, e
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if matches!(&e, AppError::Remote(remote) if remote.is_retryable()) {
                        warn!("Failed to write batch {} after {} attempts", batch_id, attempt);
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Stops the worker, then flushes until the queue is empty or a flush
    /// fails. Whatever is left afterwards is lost with the process.
    pub async fn shutdown(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            let _ = self.tx.send(FlushSignal::Stop).await;
            if let Err(e) = worker.await {
                error!("Flush worker ended abnormally: {}", e);
            }
        }

        info!(
            "Server shutting down, processing {} remaining submissions...",
            self.queue.len()
        );
        while !self.queue.is_empty() {
            match self.flush_batch().await {
                Ok(FlushStatus::Flushed(_)) => continue,
                Ok(_) => break,
                Err(e) => {
                    error!("Error during shutdown processing: {}", e);
                    break;
                }
            }
        }

        let left = self.queue.len();
        if left > 0 {
            warn!("{} submissions were not persisted before exit", left);
        }
        info!("Graceful shutdown complete");
    }
}

async fn run_worker(flusher: Arc<Flusher>, mut rx: mpsc::Receiver<FlushSignal>) {
    let mut period = flusher.config.interval;
    loop {
        tokio::select! {
            _ = sleep(period) => {}
            signal = rx.recv() => match signal {
                Some(FlushSignal::Now) => {}
                Some(FlushSignal::Stop) | None => break,
            },
        }

        if flusher.queue.is_empty() {
            period = flusher.config.interval;
            continue;
        }

        if let Err(e) = flusher.flush_batch().await {
            warn!("Flush cycle failed, will retry later: {}", e);
        }

        period = if flusher.queue.is_empty() {
            flusher.config.interval
        } else {
            flusher.config.fast_interval
        };
    }
    debug!("Flush worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::drive::DriveError;
    use crate::services::registrations::repository::DOCUMENT_NAME;
    use crate::test_support::{record, TestEnv, FOLDER};

    fn server_error() -> DriveError {
        DriveError::Status {
            status: 503,
            message: "backend error".into(),
        }
    }

    #[test]
    fn backoff_doubles_per_retry() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        };
        let first = policy.delay_for(1);
        let second = policy.delay_for(2);
        assert!(first >= Duration::from_millis(400) && first <= Duration::from_millis(500));
        assert!(second >= Duration::from_millis(800) && second <= Duration::from_millis(900));
    }

    #[actix_web::test]
    async fn successful_flush_appends_batch_in_order_after_existing_rows() {
        let env = TestEnv::new().await;
        env.flusher.submit(record("Old", 0));
        env.flusher.flush_batch().await.unwrap();

        for n in 1..=3 {
            env.flusher.submit(record(&format!("New{n}"), n));
        }
        let status = env.flusher.flush_batch().await.unwrap();

        assert_eq!(status, FlushStatus::Flushed(3));
        assert!(env.flusher.queue().is_empty());
        let rows = env.repository.read_all().await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r["Name"].as_str()).collect();
        assert_eq!(names, vec!["Old", "New1", "New2", "New3"]);
        assert_eq!(env.flusher.last_status().await, FlushStatus::Flushed(3));
    }

    #[actix_web::test]
    async fn flush_takes_at_most_one_batch() {
        let env = TestEnv::new().await;
        for n in 0..51 {
            env.flusher.submit(record(&format!("A{n}"), n));
        }

        assert_eq!(env.flusher.flush_batch().await.unwrap(), FlushStatus::Flushed(50));
        assert_eq!(env.flusher.queue().len(), 1);
        assert_eq!(env.flusher.queue().peek_batch(1)[0], record("A50", 50));
        assert_eq!(env.repository.read_all().await.unwrap().len(), 50);
    }

    #[actix_web::test]
    async fn non_retryable_failure_keeps_queue_and_document() {
        let env = TestEnv::new().await;
        env.repository.resolve_document().await.unwrap();
        let before = env.drive.content_of(DOCUMENT_NAME, FOLDER).await.unwrap();
        for n in 0..4 {
            env.flusher.submit(record("Ada", n));
        }
        env.drive
            .fail_next_updates([DriveError::Status {
                status: 403,
                message: "forbidden".into(),
            }])
            .await;

        assert!(env.flusher.flush_batch().await.is_err());
        assert_eq!(env.flusher.queue().len(), 4);
        assert_eq!(env.drive.updates(), 1);
        assert_eq!(
            env.drive.content_of(DOCUMENT_NAME, FOLDER).await.unwrap(),
            before
        );
        assert!(matches!(
            env.flusher.last_status().await,
            FlushStatus::Requeued { count: 4, .. }
        ));
    }

    #[actix_web::test]
    async fn retryable_failures_are_retried_until_success() {
        let env = TestEnv::new().await;
        env.flusher.submit(record("Ada", 0));
        env.drive
            .fail_next_updates([server_error(), server_error()])
            .await;

        assert_eq!(env.flusher.flush_batch().await.unwrap(), FlushStatus::Flushed(1));
        assert_eq!(env.drive.updates(), 3);
        assert!(env.flusher.queue().is_empty());
    }

    #[actix_web::test]
    async fn exhausted_retries_keep_the_batch_at_the_head() {
        let env = TestEnv::new().await;
        env.flusher.submit(record("First", 0));
        env.flusher.submit(record("Second", 1));
        env.drive
            .fail_next_updates([server_error(), server_error(), server_error()])
            .await;

        assert!(env.flusher.flush_batch().await.is_err());
        assert_eq!(env.drive.updates(), 3);
        env.flusher.submit(record("Third", 2));
        assert_eq!(
            env.flusher.queue().peek_batch(3),
            vec![record("First", 0), record("Second", 1), record("Third", 2)]
        );
    }

    #[actix_web::test]
    async fn download_failure_aborts_without_writing() {
        let env = TestEnv::new().await;
        env.repository.resolve_document().await.unwrap();
        env.flusher.submit(record("Ada", 0));
        env.drive.fail_next_download(server_error()).await;

        assert!(env.flusher.flush_batch().await.is_err());
        assert_eq!(env.drive.updates(), 0);
        assert_eq!(env.flusher.queue().len(), 1);
    }

    #[actix_web::test]
    async fn empty_queue_flush_is_idle() {
        let env = TestEnv::new().await;
        assert_eq!(env.flusher.flush_batch().await.unwrap(), FlushStatus::Idle);
        assert_eq!(env.drive.file_count().await, 0);
    }

    #[actix_web::test]
    async fn shutdown_drains_every_batch() {
        let env = TestEnv::new().await;
        env.flusher.start();
        for n in 0..120 {
            env.flusher.queue().enqueue(record("Ada", n));
        }

        env.flusher.shutdown().await;

        assert!(env.flusher.queue().is_empty());
        assert_eq!(env.repository.read_all().await.unwrap().len(), 120);
    }

    #[actix_web::test]
    async fn shutdown_stops_draining_after_a_failure() {
        let env = TestEnv::new().await;
        env.store.set_folder_id("").await.unwrap();
        env.flusher.submit(record("Ada", 0));

        env.flusher.shutdown().await;

        assert_eq!(env.flusher.queue().len(), 1);
    }

    #[actix_web::test]
    async fn worker_flushes_when_threshold_is_exceeded() {
        let env = TestEnv::with_flush_config(FlushConfig {
            interval: Duration::from_secs(3600),
            fast_interval: Duration::from_secs(3600),
            ..TestEnv::flush_config()
        })
        .await;
        env.flusher.start();

        for n in 0..11 {
            env.flusher.submit(record("Ada", n));
        }

        for _ in 0..100 {
            if env.flusher.queue().is_empty() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert!(env.flusher.queue().is_empty());
        assert_eq!(env.repository.read_all().await.unwrap().len(), 11);
        env.flusher.shutdown().await;
    }

    #[actix_web::test]
    async fn worker_flushes_on_the_timer() {
        let env = TestEnv::new().await;
        env.flusher.start();
        env.flusher.submit(record("Ada", 0));

        for _ in 0..100 {
            if env.flusher.queue().is_empty() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert!(env.flusher.queue().is_empty());
        env.flusher.shutdown().await;
    }

    #[actix_web::test]
    async fn worker_switches_to_the_fast_interval_until_drained() {
        let env = TestEnv::with_flush_config(FlushConfig {
            interval: Duration::from_secs(3600),
            fast_interval: Duration::from_millis(10),
            immediate_threshold: 1000,
            ..TestEnv::flush_config()
        })
        .await;
        env.flusher.start();
        for n in 0..60 {
            env.flusher.queue().enqueue(record("Ada", n));
        }

        env.flusher.trigger();
        for _ in 0..200 {
            if env.flusher.queue().is_empty() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        assert!(env.flusher.queue().is_empty());
        assert_eq!(env.repository.read_all().await.unwrap().len(), 60);
        env.flusher.shutdown().await;
    }

    #[actix_web::test]
    async fn concurrent_flushes_never_write_a_record_twice() {
        let env = TestEnv::new().await;
        for n in 0..60 {
            env.flusher.submit(record(&format!("A{n}"), n));
        }

        let (first, second) = tokio::join!(env.flusher.flush_batch(), env.flusher.flush_batch());
        assert_eq!(first.unwrap(), FlushStatus::Flushed(50));
        assert_eq!(second.unwrap(), FlushStatus::Flushed(10));

        assert!(env.flusher.queue().is_empty());
        let rows = env.repository.read_all().await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r["Name"].as_str()).collect();
        let expected: Vec<String> = (0..60).map(|n| format!("A{n}")).collect();
        assert_eq!(names, expected);
    }

    #[actix_web::test]
    async fn document_guard_holds_off_flushes() {
        let env = TestEnv::new().await;
        env.flusher.submit(record("Ada", 0));

        let guard = env.flusher.document_guard().await;
        let pending = Duration::from_millis(50);
        let blocked = tokio::time::timeout(pending, env.flusher.flush_batch()).await;
        assert!(blocked.is_err());
        assert_eq!(env.flusher.queue().len(), 1);
        assert_eq!(env.drive.updates(), 0);

        drop(guard);
        assert_eq!(env.flusher.flush_batch().await.unwrap(), FlushStatus::Flushed(1));
    }
}
