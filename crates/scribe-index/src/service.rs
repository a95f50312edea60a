//! Background index construction.
//!
//! A single worker thread builds snapshots off the caller's thread. Readers take an
//! `Arc` to the current snapshot and keep using it for as long as they like; a
//! finished build replaces the shared reference, never the snapshot itself.
//!
//! Requests made while a build is running are coalesced into one pending request:
//! a full request replaces whatever is pending, an incremental batch is folded into
//! it by session key. Every caller's [`BuildHandle`] resolves with the outcome of the
//! build that absorbed its request.

use std::{
    collections::BTreeMap,
    io, mem,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant, SystemTime},
};

use parking_lot::{Condvar, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::{
    BuildFailure, BuildReport, IndexSnapshot, IndexStore, InvertedIndex, PersistenceError,
    SessionKey, SessionTranscript, Tokenizer,
};

/// Result delivered when a build finishes.
pub type BuildOutcome = Result<BuildSummary, BuildFailure>;

/// Callback fired once when the next build completes.
type Observer = Box<dyn FnOnce(&BuildOutcome) + Send>;

/// Details of a successful build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Whether the build replaced the index or merged into it.
    pub kind: BuildKind,
    /// Indexed and skipped entries.
    pub report: BuildReport,
    /// Sessions in the new snapshot.
    pub session_count: usize,
    /// Completion time recorded in the snapshot.
    pub built_at: SystemTime,
    /// Wall time spent building and saving.
    pub elapsed: Duration,
}

/// How a build treated the previous index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// Rebuilt from scratch.
    Full,
    /// Merged changed sessions into the previous snapshot.
    Incremental,
}

/// Lifecycle state of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// No snapshot and nothing running.
    Empty,
    /// A build is running or queued. A previous snapshot may still be served.
    Building,
    /// A snapshot is available and nothing is running.
    Ready,
}

/// Receives the outcome of one requested build.
#[derive(Debug)]
pub struct BuildHandle {
    /// One-shot receiver.
    rx: Receiver<BuildOutcome>,
}

impl BuildHandle {
    /// Blocks until the build that absorbed this request finishes.
    pub fn wait(self) -> BuildOutcome {
        self.rx.recv().unwrap_or(Err(BuildFailure::Cancelled))
    }

    /// Waits at most `timeout`. Returns `None` if the build is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<BuildOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(BuildFailure::Cancelled)),
        }
    }
}

/// Work waiting for the worker.
enum BuildRequest {
    /// Replace the index with exactly these transcripts.
    Full(Vec<SessionTranscript>),
    /// Re-index these sessions on top of the current snapshot.
    Incremental(BTreeMap<SessionKey, SessionTranscript>),
}

impl BuildRequest {
    /// Folds a changed batch into this request by session key.
    fn upsert(&mut self, changed: Vec<SessionTranscript>) {
        match self {
            Self::Full(transcripts) => {
                for transcript in changed {
                    let key = transcript.key();
                    match transcripts.iter_mut().rev().find(|t| t.key() == key) {
                        Some(existing) => *existing = transcript,
                        None => transcripts.push(transcript),
                    }
                }
            }
            Self::Incremental(batch) => {
                batch.extend(changed.into_iter().map(|t| (t.key(), t)));
            }
        }
    }

    /// Number of transcripts carried.
    fn len(&self) -> usize {
        match self {
            Self::Full(transcripts) => transcripts.len(),
            Self::Incremental(batch) => batch.len(),
        }
    }
}

/// A request plus everyone waiting on it.
struct Pending {
    /// The coalesced request.
    request: BuildRequest,
    /// Handles to resolve when it completes.
    waiters: Vec<Sender<BuildOutcome>>,
}

/// State guarded by the queue lock.
#[derive(Default)]
struct Queue {
    /// Next build to run.
    pending: Option<Pending>,
    /// True while the worker is building or delivering results.
    busy: bool,
    /// Callbacks for the next completed build.
    observers: Vec<Observer>,
    /// Set once by shutdown; the worker exits when the queue is drained.
    shutdown: bool,
}

/// Shared between the service handle and its worker.
struct Inner {
    /// Durable storage.
    store: IndexStore,
    /// Tokenizer for new indexes.
    tokenizer: Tokenizer,
    /// The snapshot readers see.
    current: RwLock<Option<Arc<IndexSnapshot>>>,
    /// Set after a failed attempt to load from disk, so the check stays cheap.
    load_attempted: AtomicBool,
    /// Work queue.
    queue: Mutex<Queue>,
    /// Signalled when work is queued or shutdown begins.
    work_ready: Condvar,
    /// Signalled when the worker becomes idle with nothing queued.
    idle: Condvar,
}

/// Builds and serves index snapshots in the background.
///
/// Dropping the service finishes any queued work and joins the worker.
pub struct BackgroundIndexingService {
    /// Shared state.
    inner: Arc<Inner>,
    /// Worker thread, taken on shutdown.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundIndexingService {
    /// Starts a service persisting to `store` and tokenizing with `tokenizer`.
    ///
    /// Nothing is loaded from disk until [`has_index`](Self::has_index) or
    /// [`snapshot`](Self::snapshot) is called.
    pub fn new(store: IndexStore, tokenizer: Tokenizer) -> io::Result<Self> {
        let inner = Arc::new(Inner {
            store,
            tokenizer,
            current: RwLock::new(None),
            load_attempted: AtomicBool::new(false),
            queue: Mutex::new(Queue::default()),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = thread::Builder::new()
            .name("scribe-indexer".into())
            .spawn(move || worker_loop(&worker_inner))?;

        Ok(Self {
            inner,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// The backing store.
    pub fn store(&self) -> &IndexStore {
        &self.inner.store
    }

    /// Returns true if a snapshot is in memory or a valid one can be loaded from disk.
    ///
    /// Only the first call may touch disk: it reads and fully decodes the persisted
    /// snapshot on the caller's thread, which costs time proportional to the snapshot
    /// size. A loaded snapshot is installed as current and a failed load is
    /// remembered, so every later call is a lock read.
    pub fn has_index(&self) -> bool {
        self.snapshot().is_some()
    }

    /// The current snapshot, loading the persisted one on first use.
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.inner.current.read().as_ref() {
            return Some(Arc::clone(snapshot));
        }
        self.inner.load_persisted()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        let queue = self.inner.queue.lock();
        if queue.busy || queue.pending.is_some() {
            ServiceState::Building
        } else if self.inner.current.read().is_some() {
            ServiceState::Ready
        } else {
            ServiceState::Empty
        }
    }

    /// Schedules a full rebuild from `sessions` and returns immediately.
    ///
    /// If a build is already running, this request replaces any queued one and runs
    /// after the current build finishes.
    pub fn run(&self, sessions: Vec<SessionTranscript>) -> BuildHandle {
        self.enqueue(
            sessions,
            |pending, sessions| pending.request = BuildRequest::Full(sessions),
            BuildRequest::Full,
        )
    }

    /// Schedules re-indexing of `changed` sessions on top of the current snapshot.
    ///
    /// Folded by session key into any queued request.
    pub fn update(&self, changed: Vec<SessionTranscript>) -> BuildHandle {
        self.enqueue(
            changed,
            |pending, changed| pending.request.upsert(changed),
            |changed| {
                BuildRequest::Incremental(changed.into_iter().map(|t| (t.key(), t)).collect())
            },
        )
    }

    /// Queues work, coalescing with a pending request if there is one.
    fn enqueue(
        &self,
        sessions: Vec<SessionTranscript>,
        coalesce: impl FnOnce(&mut Pending, Vec<SessionTranscript>),
        fresh: impl FnOnce(Vec<SessionTranscript>) -> BuildRequest,
    ) -> BuildHandle {
        let (tx, rx) = mpsc::channel();
        let mut queue = self.inner.queue.lock();
        if queue.shutdown {
            warn!("indexing service is shut down; request dropped");
            return BuildHandle { rx };
        }

        match queue.pending.as_mut() {
            Some(pending) => {
                coalesce(pending, sessions);
                pending.waiters.push(tx);
                debug!(
                    transcripts = pending.request.len(),
                    waiters = pending.waiters.len(),
                    "coalesced index request"
                );
            }
            None => {
                queue.pending = Some(Pending {
                    request: fresh(sessions),
                    waiters: vec![tx],
                });
            }
        }
        self.inner.work_ready.notify_one();
        BuildHandle { rx }
    }

    /// Registers `callback` to fire once with the outcome of the next completed build.
    pub fn on_next_completion(&self, callback: impl FnOnce(&BuildOutcome) + Send + 'static) {
        self.inner.queue.lock().observers.push(Box::new(callback));
    }

    /// Blocks until no build is running or queued.
    pub fn wait_idle(&self) {
        let mut queue = self.inner.queue.lock();
        while queue.busy || queue.pending.is_some() {
            self.inner.idle.wait(&mut queue);
        }
    }

    /// Finishes queued work and stops the worker. Later requests resolve as cancelled.
    pub fn shutdown(&self) {
        {
            let mut queue = self.inner.queue.lock();
            queue.shutdown = true;
            self.inner.work_ready.notify_all();
        }
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        // A completion observer may hold the last reference to the service
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            error!("index worker thread panicked");
        }
    }
}

impl Drop for BackgroundIndexingService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    /// Tries the persisted snapshot once, installing it if nothing newer exists.
    fn load_persisted(&self) -> Option<Arc<IndexSnapshot>> {
        if self.load_attempted.load(Ordering::Acquire) {
            return self.current.read().clone();
        }
        match self.store.load() {
            Ok(snapshot) => {
                let mut current = self.current.write();
                Some(Arc::clone(
                    current.get_or_insert_with(|| Arc::new(snapshot)),
                ))
            }
            Err(err) => {
                match &err {
                    PersistenceError::Missing { .. } => debug!("no persisted index"),
                    _ => warn!(error = %err, "ignoring unusable persisted index"),
                }
                self.load_attempted.store(true, Ordering::Release);
                self.current.read().clone()
            }
        }
    }

    /// The index an incremental build merges into.
    ///
    /// Only a missing snapshot starts from empty; an unreadable or stale one fails
    /// the build so it is never overwritten by the changed batch alone.
    fn incremental_base(&self) -> Result<InvertedIndex, BuildFailure> {
        let current = self.current.read().clone();
        if let Some(snapshot) = current {
            return Ok(snapshot.index().clone());
        }
        match self.store.load() {
            Ok(snapshot) => Ok(snapshot.into_index()),
            Err(PersistenceError::Missing { .. }) => Ok(InvertedIndex::new(self.tokenizer)),
            Err(err) => {
                error!(error = %err, "cannot update persisted index; run a full build");
                Err(err.into())
            }
        }
    }

    /// Runs one build and swaps in the result.
    fn execute(&self, request: BuildRequest) -> BuildOutcome {
        let started = Instant::now();
        let (kind, index, report) = match request {
            BuildRequest::Full(transcripts) => {
                let mut index = InvertedIndex::new(self.tokenizer);
                let report = index.build(&transcripts);
                (BuildKind::Full, index, report)
            }
            BuildRequest::Incremental(batch) => {
                let mut index = self.incremental_base()?;
                let changed: Vec<_> = batch.into_values().collect();
                let report = index.merge(&changed);
                (BuildKind::Incremental, index, report)
            }
        };

        for skipped in &report.skipped {
            warn!(%skipped, "transcript skipped");
        }

        let snapshot = IndexSnapshot::new(index, self.store.config_hash());
        if let Err(err) = self.store.save(&snapshot) {
            error!(error = %err, "failed to persist index; keeping previous snapshot");
            return Err(err.into());
        }

        let summary = BuildSummary {
            kind,
            session_count: snapshot.session_count(),
            built_at: snapshot.built_at(),
            report,
            elapsed: started.elapsed(),
        };
        *self.current.write() = Some(Arc::new(snapshot));
        self.load_attempted.store(true, Ordering::Release);

        info!(
            kind = ?summary.kind,
            sessions = summary.session_count,
            indexed = summary.report.indexed,
            skipped = summary.report.skipped.len(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "index build complete"
        );
        Ok(summary)
    }
}

/// Worker: take the pending request, build, publish, repeat.
fn worker_loop(inner: &Inner) {
    loop {
        let pending = {
            let mut queue = inner.queue.lock();
            loop {
                if let Some(pending) = queue.pending.take() {
                    queue.busy = true;
                    break pending;
                }
                if queue.shutdown {
                    return;
                }
                inner.work_ready.wait(&mut queue);
            }
        };

        debug!(transcripts = pending.request.len(), "index build started");
        let request = pending.request;
        let outcome = catch_unwind(AssertUnwindSafe(|| inner.execute(request))).unwrap_or_else(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "(non-string panic)".to_string());
                error!(panic = %message, "index build panicked");
                Err(BuildFailure::Panicked(message))
            },
        );

        // Observers are taken after the build so late registrations still fire
        let observers = mem::take(&mut inner.queue.lock().observers);
        for waiter in pending.waiters {
            // A dropped handle just means nobody is listening
            waiter.send(outcome.clone()).ok();
        }
        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer(&outcome))).is_err() {
                error!("completion observer panicked");
            }
        }

        let mut queue = inner.queue.lock();
        queue.busy = false;
        if queue.pending.is_none() {
            inner.idle.notify_all();
        }
    }
}
