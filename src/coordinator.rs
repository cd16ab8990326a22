//! Timer coordinator: owns the single engine and translates its events

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, error, info, warn};

use crate::{
    error::TimerError,
    state::{
        BadgeStatus, ControlMessage, EngineCommand, EngineEvent, NotificationSink, TimerConfig,
        TimerSnapshot, UiNotification,
    },
    tasks::TimerEngine,
};

/// How long a status query waits for the engine before giving up
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(2);

/// Routing handle for the live engine
#[derive(Debug)]
struct EngineHandle {
    generation: u64,
    commands: mpsc::UnboundedSender<EngineCommand>,
    abort: AbortHandle,
}

struct Inner {
    sink: Arc<dyn NotificationSink>,
    engine: Mutex<Option<EngineHandle>>,
    pending: Mutex<HashMap<u64, oneshot::Sender<TimerSnapshot>>>,
    next_generation: AtomicU64,
    next_request_id: AtomicU64,
    status_timeout: Duration,
}

/// Bridges UI commands to the engine and engine events to the UI.
///
/// Cloning yields another handle to the same coordinator.
#[derive(Clone)]
pub struct TimerCoordinator {
    inner: Arc<Inner>,
}

impl TimerCoordinator {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_status_timeout(sink, DEFAULT_STATUS_TIMEOUT)
    }

    pub fn with_status_timeout(sink: Arc<dyn NotificationSink>, status_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                engine: Mutex::new(None),
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                next_request_id: AtomicU64::new(1),
                status_timeout,
            }),
        }
    }

    /// Whether an engine currently exists
    pub fn is_active(&self) -> bool {
        self.inner
            .engine
            .lock()
            .map(|engine| engine.is_some())
            .unwrap_or(false)
    }

    /// Spawn the engine if none exists.
    ///
    /// Returns `Ok(false)` when an engine was already running.
    pub fn create_engine(&self, config: TimerConfig) -> Result<bool, TimerError> {
        config.validate()?;
        self.spawn_engine(config, move |commands, events| {
            TimerEngine::new(config).run(commands, events)
        })
    }

    /// Install a freshly spawned engine task along with its event pump and
    /// supervisor
    fn spawn_engine<F, Fut>(&self, config: TimerConfig, engine: F) -> Result<bool, TimerError>
    where
        F: FnOnce(mpsc::UnboundedReceiver<EngineCommand>, mpsc::UnboundedSender<EngineEvent>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {

        let mut slot = self
            .inner
            .engine
            .lock()
            .map_err(|_| TimerError::LockPoisoned("engine handle"))?;
        if slot.is_some() {
            debug!("Timer engine already exists, ignoring create");
            return Ok(false);
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(engine(command_rx, event_tx));
        *slot = Some(EngineHandle {
            generation,
            commands: command_tx,
            abort: task.abort_handle(),
        });
        drop(slot);

        tokio::spawn(Self::pump_events(Arc::clone(&self.inner), event_rx));
        tokio::spawn(Self::supervise(Arc::clone(&self.inner), generation, task));

        info!(
            "Timer engine {} created (focus={}s, break={}s)",
            generation, config.focus_duration_seconds, config.break_duration_seconds
        );
        Ok(true)
    }

    /// Forward a UI control message to the engine.
    ///
    /// Unknown commands are ignored; a missing engine makes this a no-op.
    pub fn dispatch(&self, message: &ControlMessage) -> Result<(), TimerError> {
        info!("timer-control {:?}", message);
        match message.parse()? {
            Some(command) => {
                self.send(command);
                Ok(())
            }
            None => {
                debug!("Ignoring unrecognized timer command: {:?}", message.command);
                Ok(())
            }
        }
    }

    /// Ask the engine for a snapshot.
    ///
    /// `None` means there is no active timer.
    pub async fn query_status(&self) -> Option<TimerSnapshot> {
        let snapshot = self.request_snapshot().await;
        self.inner.sink.push(UiNotification::TimerStatus(snapshot));
        snapshot
    }

    async fn request_snapshot(&self) -> Option<TimerSnapshot> {
        if !self.is_active() {
            return None;
        }

        let request_id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        match self.inner.pending.lock() {
            Ok(mut pending) => {
                pending.insert(request_id, reply_tx);
            }
            Err(e) => {
                error!("Failed to lock pending status requests: {}", e);
                return None;
            }
        }

        if !self.send(EngineCommand::GetStatus { request_id: Some(request_id) }) {
            self.forget_request(request_id);
            return None;
        }

        match tokio::time::timeout(self.inner.status_timeout, reply_rx).await {
            Ok(Ok(snapshot)) => Some(snapshot),
            Ok(Err(_)) => {
                debug!("Engine went away before answering status request {}", request_id);
                None
            }
            Err(_) => {
                warn!("Status request {} timed out", request_id);
                self.forget_request(request_id);
                None
            }
        }
    }

    /// Destroy the engine and report a stopped timer
    pub fn terminate(&self) {
        if self.teardown() {
            info!("Timer engine terminated");
        }
        self.inner.sink.push(UiNotification::UpdateBadge {
            status: BadgeStatus::Stopped,
            is_focus_period: true,
            remaining_seconds: None,
        });
    }

    /// The owning window closed; tear down without notifying it
    pub fn close_window(&self) {
        if self.teardown() {
            info!("Window closed, timer engine torn down");
        }
    }

    fn teardown(&self) -> bool {
        let handle = match self.inner.engine.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                error!("Failed to lock engine handle: {}", e);
                None
            }
        };
        match handle {
            Some(handle) => {
                handle.abort.abort();
                Self::fail_pending(&self.inner);
                true
            }
            None => false,
        }
    }

    /// Drop every outstanding status request so its caller sees `None`
    fn fail_pending(inner: &Inner) {
        if let Ok(mut pending) = inner.pending.lock() {
            pending.clear();
        }
    }

    /// Send a command to the live engine, if any
    fn send(&self, command: EngineCommand) -> bool {
        let slot = match self.inner.engine.lock() {
            Ok(slot) => slot,
            Err(e) => {
                error!("Failed to lock engine handle: {}", e);
                return false;
            }
        };
        match slot.as_ref() {
            Some(handle) => {
                if handle.commands.send(command).is_err() {
                    warn!("Timer engine {} is no longer receiving commands", handle.generation);
                    return false;
                }
                true
            }
            None => {
                debug!("No timer engine, dropping {:?}", command);
                false
            }
        }
    }

    fn forget_request(&self, request_id: u64) {
        if let Ok(mut pending) = self.inner.pending.lock() {
            pending.remove(&request_id);
        }
    }

    /// Translate engine events into UI notifications until the engine exits
    async fn pump_events(inner: Arc<Inner>, mut events: mpsc::UnboundedReceiver<EngineEvent>) {
        while let Some(event) = events.recv().await {
            Self::translate(&inner, event);
        }
        debug!("Engine event stream closed");
    }

    fn translate(inner: &Inner, event: EngineEvent) {
        match event {
            EngineEvent::Tick { remaining_seconds, is_focus_period } => {
                inner.sink.push(UiNotification::TimerUpdate {
                    remaining_seconds,
                    is_focus_period,
                    is_running: None,
                });
                inner.sink.push(UiNotification::UpdateBadge {
                    status: BadgeStatus::Running,
                    is_focus_period,
                    remaining_seconds: Some(remaining_seconds),
                });
            }
            EngineEvent::PeriodToggled { is_focus_period, remaining_seconds } => {
                inner.sink.push(UiNotification::period_toast(is_focus_period));
                inner.sink.push(UiNotification::TimerUpdate {
                    remaining_seconds,
                    is_focus_period,
                    is_running: None,
                });
            }
            EngineEvent::StatusChanged { is_running, is_focus_period, remaining_seconds } => {
                inner.sink.push(UiNotification::UpdateBadge {
                    status: if is_running { BadgeStatus::Running } else { BadgeStatus::Paused },
                    is_focus_period,
                    remaining_seconds: Some(remaining_seconds),
                });
            }
            EngineEvent::Status { request_id: Some(id), snapshot } => {
                let waiter = inner.pending.lock().ok().and_then(|mut pending| pending.remove(&id));
                match waiter {
                    Some(reply) => {
                        // The caller may have timed out already
                        let _ = reply.send(snapshot);
                    }
                    None => debug!("No pending status request {}, reply dropped", id),
                }
            }
            EngineEvent::Status { request_id: None, snapshot } => {
                inner.sink.push(UiNotification::TimerUpdate {
                    remaining_seconds: snapshot.remaining_seconds,
                    is_focus_period: snapshot.is_focus_period,
                    is_running: Some(snapshot.is_running),
                });
            }
        }
    }

    /// Wait for the engine task to end and release its handle
    async fn supervise(inner: Arc<Inner>, generation: u64, task: JoinHandle<()>) {
        match task.await {
            Ok(()) => debug!("Timer engine {} exited", generation),
            Err(e) if e.is_cancelled() => debug!("Timer engine {} cancelled", generation),
            Err(e) => error!("Timer engine {} crashed: {}", generation, e),
        }

        match inner.engine.lock() {
            Ok(mut slot) => {
                if slot.as_ref().is_some_and(|handle| handle.generation == generation) {
                    *slot = None;
                    Self::fail_pending(&inner);
                    info!("Cleared handle for exited timer engine {}", generation);
                }
            }
            Err(e) => error!("Failed to lock engine handle: {}", e),
        }
    }

    #[cfg(test)]
    fn kill_engine_task(&self) {
        if let Ok(slot) = self.inner.engine.lock() {
            if let Some(handle) = slot.as_ref() {
                handle.abort.abort();
            }
        }
    }
}
