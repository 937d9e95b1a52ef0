use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use super::callbacks::{Callbacks, Notification};
use super::config::SessionConfig;
use super::queue::OutboundQueue;
use super::state::{ConnectionState, RecordingState, SessionState};
use super::stats::{Counters, SessionStats, TranscriptEntry};
use crate::audio::pcm::{encode_base64, encode_pcm16};
use crate::protocol::{ClientMessage, InboundEvent, StatusUpdate};
use crate::transport::{Connection, EventSink, Transport, TransportEvent};
use crate::vad::{VadEvent, VoiceActivityDetector};

/// Local status reported once the session is streaming
pub const STATUS_LISTENING: &str = "listening";

/// Local status reported on pause, and on an unexpected disconnect
pub const STATUS_PAUSED: &str = "paused";

/// Error text reported for any transport-level failure
pub const CONNECTION_ERROR: &str = "Connection error";

thread_local! {
    /// Sessions whose transport callbacks are running on this thread
    static DISPATCHING: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// One interpreted conversation over a single transport connection
///
/// All operations return immediately; outcomes arrive through the
/// registered `Callbacks`. The handle is cheap to clone and every clone
/// drives the same session.
#[derive(Clone)]
pub struct TurnSession {
    shared: Arc<Shared>,
}

struct Shared {
    transport: Arc<dyn Transport>,
    inner: Mutex<Inner>,
    callbacks: Mutex<Callbacks>,
    /// Read-held while a transport event is handled and its callbacks run;
    /// write-held by `stop` so it returns only after those callbacks finish
    dispatch: RwLock<()>,
}

/// Marks a session as dispatching on the current thread until dropped
struct DispatchMark(usize);

impl DispatchMark {
    fn enter(id: usize) -> Self {
        DISPATCHING.with(|d| d.borrow_mut().push(id));
        Self(id)
    }
}

impl Drop for DispatchMark {
    fn drop(&mut self) {
        DISPATCHING.with(|d| {
            let mut d = d.borrow_mut();
            if let Some(pos) = d.iter().rposition(|id| *id == self.0) {
                d.remove(pos);
            }
        });
    }
}

struct Inner {
    config: SessionConfig,
    vad: VoiceActivityDetector,
    queue: OutboundQueue,
    connection: Option<Box<dyn Connection>>,
    /// Bumped on every start/stop; events tagged with an older value are stale
    generation: u64,
    connection_state: ConnectionState,
    recording_state: RecordingState,
    session_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    counters: Counters,
    transcript: Vec<TranscriptEntry>,
}

impl TurnSession {
    pub fn new(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        let vad = VoiceActivityDetector::new(config.vad.clone(), config.sample_rate);

        Self {
            shared: Arc::new(Shared {
                transport,
                inner: Mutex::new(Inner {
                    config,
                    vad,
                    queue: OutboundQueue::new(),
                    connection: None,
                    generation: 0,
                    connection_state: ConnectionState::Disconnected,
                    recording_state: RecordingState::Idle,
                    session_id: None,
                    started_at: None,
                    ended_at: None,
                    counters: Counters::default(),
                    transcript: Vec::new(),
                }),
                callbacks: Mutex::new(Callbacks::default()),
                dispatch: RwLock::new(()),
            }),
        }
    }

    /// Replace all registered listeners
    pub fn set_callbacks(&self, callbacks: Callbacks) {
        *self
            .shared
            .callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = callbacks;
    }

    /// Open the transport and begin a new session
    ///
    /// No-op while a session is already connecting, recording or paused.
    pub fn start(&self) {
        let mut inner = self.shared.lock_inner();

        if inner.connection.is_some() || inner.recording_state != RecordingState::Idle {
            debug!("Session already active ({:?}), ignoring start", inner.state());
            return;
        }

        inner.generation += 1;
        let generation = inner.generation;
        let session_id = format!("session-{}", uuid::Uuid::new_v4());

        info!(
            "Starting interpreter session: {} ({} -> {}, {:?}, via {})",
            session_id,
            inner.config.from_language,
            inner.config.to_language,
            inner.config.mode,
            self.shared.transport.name()
        );

        inner.session_id = Some(session_id);
        inner.started_at = Some(Utc::now());
        inner.ended_at = None;
        inner.connection_state = ConnectionState::Connecting;
        inner.recording_state = RecordingState::Recording;
        inner.counters = Counters::default();
        inner.transcript.clear();
        inner.vad.reset();

        let weak = Arc::downgrade(&self.shared);
        let events = EventSink::new(move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_transport_event(generation, event);
            }
        });

        let connection = self.shared.transport.open(&inner.config.endpoint, events);
        inner.connection = Some(connection);
    }

    /// Send `stop`, close the transport and return to idle
    ///
    /// Callbacks already running on other threads finish before `stop`
    /// returns; inbound events handled after that are discarded. Called from
    /// inside a callback, `stop` does not wait for other threads.
    pub fn stop(&self) {
        let dispatch = self.shared.lock_dispatch();
        let notifications = {
            let mut inner = self.shared.lock_inner();

            if inner.connection.is_none() && inner.recording_state == RecordingState::Idle {
                debug!("Session not active, ignoring stop");
                return;
            }

            info!(
                "Stopping interpreter session: {}",
                inner.session_id.as_deref().unwrap_or("-")
            );

            if inner.connection_state == ConnectionState::Connected {
                inner.send(&ClientMessage::Stop);
                inner.connection_state = ConnectionState::Closing;
            }

            let had_connection = match inner.connection.take() {
                Some(connection) => {
                    connection.close();
                    true
                }
                None => false,
            };

            if !inner.queue.is_empty() {
                debug!("Discarding {} unsent messages", inner.queue.len());
                inner.queue.clear();
            }

            inner.generation += 1;
            inner.connection_state = ConnectionState::Disconnected;
            inner.recording_state = RecordingState::Idle;
            inner.ended_at = Some(Utc::now());
            inner.vad.reset();

            if had_connection {
                vec![Notification::Closed]
            } else {
                Vec::new()
            }
        };
        drop(dispatch);

        self.shared.notify(notifications);
    }

    /// Stop forwarding frames and ask the backend to suspend
    pub fn pause(&self) {
        let notifications = {
            let mut inner = self.shared.lock_inner();
            if inner.recording_state != RecordingState::Recording || inner.connection.is_none() {
                debug!("Session not recording, ignoring pause");
                return;
            }

            inner.recording_state = RecordingState::Paused;
            inner.send(&ClientMessage::Pause);
            vec![Notification::Status(StatusUpdate::new(STATUS_PAUSED))]
        };

        self.shared.notify(notifications);
    }

    /// Resume forwarding frames after `pause`
    pub fn resume(&self) {
        let notifications = {
            let mut inner = self.shared.lock_inner();
            if inner.recording_state != RecordingState::Paused || inner.connection.is_none() {
                debug!("Session not paused, ignoring resume");
                return;
            }

            inner.recording_state = RecordingState::Recording;
            inner.send(&ClientMessage::Resume);
            vec![Notification::Status(StatusUpdate::new(STATUS_LISTENING))]
        };

        self.shared.notify(notifications);
    }

    /// Feed one frame of normalized mono samples
    ///
    /// Ignored unless the session is recording. While the transport is still
    /// connecting, the resulting messages are queued.
    pub fn push_pcm(&self, samples: &[f32]) {
        let mut inner = self.shared.lock_inner();

        if inner.recording_state != RecordingState::Recording || inner.connection.is_none() {
            return;
        }

        if inner.config.client_vad {
            if let Some(event) = inner.vad.process(samples) {
                match event {
                    VadEvent::Begin => inner.counters.utterances_started += 1,
                    VadEvent::End => inner.counters.utterances_ended += 1,
                }
                inner.send(&ClientMessage::Vad { event });
            }
        }

        let pcm = encode_pcm16(samples);
        inner.counters.audio_frames_sent += 1;
        inner.counters.samples_sent += samples.len();
        inner.counters.pcm_bytes_sent += pcm.len();

        inner.send(&ClientMessage::Audio {
            pcm16: encode_base64(&pcm),
            samples: samples.len(),
        });
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock_inner().state()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.shared.lock_inner().connection_state
    }

    pub fn recording_state(&self) -> RecordingState {
        self.shared.lock_inner().recording_state
    }

    /// True once the transport is open and frames are being forwarded
    pub fn is_recording(&self) -> bool {
        self.state() == SessionState::Recording
    }

    pub fn session_id(&self) -> Option<String> {
        self.shared.lock_inner().session_id.clone()
    }

    pub fn config(&self) -> SessionConfig {
        self.shared.lock_inner().config.clone()
    }

    /// Get current session statistics
    ///
    /// The duration stops growing once the session has ended.
    pub fn stats(&self) -> SessionStats {
        let inner = self.shared.lock_inner();
        let end = inner.ended_at.unwrap_or_else(Utc::now);
        let duration_secs = inner
            .started_at
            .map(|t| end.signed_duration_since(t).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);
        let c = inner.counters;

        SessionStats {
            state: inner.state(),
            session_id: inner.session_id.clone(),
            started_at: inner.started_at,
            ended_at: inner.ended_at,
            duration_secs,
            audio_frames_sent: c.audio_frames_sent,
            samples_sent: c.samples_sent,
            pcm_bytes_sent: c.pcm_bytes_sent,
            queued_messages: inner.queue.len(),
            utterances_started: c.utterances_started,
            utterances_ended: c.utterances_ended,
            partials_received: c.partials_received,
            finals_received: c.finals_received,
            errors_received: c.errors_received,
        }
    }

    /// Final transcripts received since the last `start`
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.shared.lock_inner().transcript.clone()
    }
}

impl Shared {
    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn id(&self) -> usize {
        self as *const Self as usize
    }

    /// Exclusive dispatch lock, unless this thread is already inside one of
    /// this session's callbacks
    fn lock_dispatch(&self) -> Option<RwLockWriteGuard<'_, ()>> {
        let id = self.id();
        if DISPATCHING.with(|d| d.borrow().contains(&id)) {
            return None;
        }
        Some(self.dispatch.write().unwrap_or_else(|e| e.into_inner()))
    }

    fn handle_transport_event(&self, generation: u64, event: TransportEvent) {
        let _dispatch = self.dispatch.read().unwrap_or_else(|e| e.into_inner());
        let _mark = DispatchMark::enter(self.id());

        let notifications = {
            let mut inner = self.lock_inner();
            if inner.generation != generation {
                debug!("Ignoring {:?} from a previous connection", event);
                return;
            }
            inner.on_transport_event(event)
        };

        self.notify(notifications);
    }

    fn notify(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }

        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for notification in &notifications {
            notification.deliver(&callbacks);
        }
    }
}

impl Inner {
    fn state(&self) -> SessionState {
        SessionState::from_parts(self.connection_state, self.recording_state)
    }

    fn on_transport_event(&mut self, event: TransportEvent) -> Vec<Notification> {
        match event {
            TransportEvent::Open => self.on_open(),
            TransportEvent::Message(text) => self.on_message(&text),
            TransportEvent::Error(detail) => {
                warn!("Transport error: {}", detail);
                self.counters.errors_received += 1;
                vec![Notification::Error(CONNECTION_ERROR.to_string())]
            }
            TransportEvent::Closed => self.on_closed(),
        }
    }

    fn on_open(&mut self) -> Vec<Notification> {
        if self.connection_state != ConnectionState::Connecting {
            debug!("Unexpected open in state {:?}", self.connection_state);
            return Vec::new();
        }

        self.connection_state = ConnectionState::Connected;
        let session_id = self.session_id.clone().unwrap_or_default();
        info!("Interpreter connection open for session {}", session_id);

        // The backend must see `start` before anything queued while connecting.
        let start = ClientMessage::Start {
            session_id,
            from: self.config.from_language.clone(),
            to: self.config.to_language.clone(),
            mode: self.config.mode,
            sample_rate: self.config.sample_rate,
            client_vad: self.config.client_vad,
        };
        self.send(&start);

        let pending = self.queue.drain();
        if !pending.is_empty() {
            debug!("Flushing {} queued messages", pending.len());
        }
        for text in pending {
            self.deliver(text);
        }

        let status = match self.recording_state {
            RecordingState::Paused => STATUS_PAUSED,
            _ => STATUS_LISTENING,
        };
        vec![Notification::Status(StatusUpdate::new(status))]
    }

    fn on_message(&mut self, text: &str) -> Vec<Notification> {
        let Some(event) = InboundEvent::parse(text) else {
            return Vec::new();
        };

        match event {
            InboundEvent::Status(update) => vec![Notification::Status(update)],
            InboundEvent::Partial { text } => {
                self.counters.partials_received += 1;
                vec![Notification::Partial(text)]
            }
            InboundEvent::Final(result) => {
                self.counters.finals_received += 1;
                self.transcript.push(TranscriptEntry {
                    asr: result.asr.clone(),
                    translated_text: result.translated_text.clone(),
                    language_id: result.language_id.clone(),
                    received_at: Utc::now(),
                });
                vec![Notification::Final(result)]
            }
            InboundEvent::Error { message } => {
                warn!("Interpreter reported error: {}", message);
                self.counters.errors_received += 1;
                vec![Notification::Error(message)]
            }
        }
    }

    fn on_closed(&mut self) -> Vec<Notification> {
        if self.connection.take().is_none() {
            return Vec::new();
        }

        let was_active = self.recording_state != RecordingState::Idle;
        info!(
            "Interpreter connection closed for session {}",
            self.session_id.as_deref().unwrap_or("-")
        );

        self.connection_state = ConnectionState::Disconnected;
        self.recording_state = RecordingState::Idle;
        self.ended_at = Some(Utc::now());
        self.vad.reset();

        let mut notifications = Vec::new();
        if was_active {
            notifications.push(Notification::Status(StatusUpdate::new(STATUS_PAUSED)));
        }
        notifications.push(Notification::Closed);
        notifications
    }

    /// Serialize and send, or queue until the transport is open
    fn send(&mut self, message: &ClientMessage) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to serialize {} message: {}", message.kind(), e);
                return;
            }
        };

        if self.connection_state == ConnectionState::Connected && self.connection.is_some() {
            self.deliver(text);
        } else {
            debug!("Transport not ready, queueing {} message", message.kind());
            self.queue.push(text);
        }
    }

    fn deliver(&self, text: String) {
        if let Some(connection) = &self.connection {
            if let Err(e) = connection.send(text) {
                warn!("Failed to send message: {}", e);
            }
        }
    }
}
