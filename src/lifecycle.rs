//! Client lifecycle controller
//!
//! Owns the single live client handle: creates it at startup, swaps it on
//! disconnect, and tears it down on `/reset-session`. At most one handle is
//! alive at a time; replacing it destroys the previous one first, and every
//! failure on a cleanup path is logged rather than propagated.
//!
//! Reconnects are unbounded but paced: each disconnect waits out a capped
//! exponential backoff before the destroy-and-recreate cycle, and the
//! counter resets once the session reports ready. A stale session that can
//! never reconnect therefore retries forever at the capped interval instead
//! of spinning.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::client::{ClientEvent, ClientFactory, Messenger};
use crate::qr;

/// Backoff base between a disconnect and the reconnect attempt.
pub const RECONNECT_BASE: Duration = Duration::from_millis(500);

/// Doublings allowed before the backoff plateaus (500ms → 32s).
const RECONNECT_MAX_EXP: u32 = 6;

const EVENT_CHANNEL_CAPACITY: usize = 16;

pub struct Lifecycle {
    factory: Arc<dyn ClientFactory>,
    slot: Mutex<Option<Arc<dyn Messenger>>>,
    events_tx: mpsc::Sender<ClientEvent>,
    session_dir: PathBuf,
    reconnect_base: Duration,
    reconnect_attempts: AtomicU32,
}

impl Lifecycle {
    /// Create the controller and the event channel its clients feed.
    ///
    /// The returned receiver must be handed to [`Lifecycle::spawn_event_loop`]
    /// before the first client is created, or lifecycle events pile up.
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        session_dir: PathBuf,
        reconnect_base: Duration,
    ) -> (Arc<Self>, mpsc::Receiver<ClientEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let controller = Arc::new(Self {
            factory,
            slot: Mutex::new(None),
            events_tx,
            session_dir,
            reconnect_base,
            reconnect_attempts: AtomicU32::new(0),
        });
        (controller, events_rx)
    }

    /// Sender side of the lifecycle event channel.
    pub fn events(&self) -> mpsc::Sender<ClientEvent> {
        self.events_tx.clone()
    }

    /// Clone of the current handle, if one is installed.
    pub async fn current(&self) -> Option<Arc<dyn Messenger>> {
        self.slot.lock().await.clone()
    }

    /// Install a fresh client, optionally destroying the previous one first.
    ///
    /// Destroy failures are logged, never fatal. Factory failures leave the
    /// slot empty; requests then see 503 until the next cycle succeeds.
    pub async fn init_client(&self, recreate: bool) {
        if recreate {
            self.destroy_current().await;
        }

        match self.factory.create(self.events_tx.clone()).await {
            Ok(client) => {
                *self.slot.lock().await = Some(client);
                info!("messaging client created, connecting in the background");
            }
            Err(e) => error!("failed to create messaging client: {e:#}"),
        }
    }

    /// Best-effort destroy and clear of the current handle.
    async fn destroy_current(&self) {
        let old = self.slot.lock().await.take();
        if let Some(old) = old {
            if let Err(e) = old.destroy().await {
                warn!("error destroying existing client: {e:#}");
            }
        }
    }

    /// Tear down the session entirely and start a fresh pairing.
    ///
    /// Destroys the handle, deletes the on-disk session store, and creates a
    /// new client that will issue a QR challenge. Every step is best-effort;
    /// callers always get a success response.
    pub async fn reset(&self) {
        self.destroy_current().await;

        if self.session_dir.exists() {
            match std::fs::remove_dir_all(&self.session_dir) {
                Ok(()) => info!(
                    "cleared session store at {} to force a new QR pairing",
                    self.session_dir.display()
                ),
                Err(e) => warn!(
                    "error clearing session directory {}: {e}",
                    self.session_dir.display()
                ),
            }
        }

        self.init_client(true).await;
    }

    /// Consume lifecycle events until every sender is gone.
    pub fn spawn_event_loop(self: &Arc<Self>, mut events_rx: mpsc::Receiver<ClientEvent>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                controller.handle_event(event).await;
            }
        })
    }

    async fn handle_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::Qr(code) => {
                info!("scan this QR code to link the WhatsApp account:");
                match qr::render_terminal(&code) {
                    Ok(block) => println!("{block}"),
                    Err(e) => warn!("could not render pairing QR code: {e:#}"),
                }
            }
            ClientEvent::Ready => {
                self.reconnect_attempts.store(0, Ordering::Relaxed);
                info!("WhatsApp client is ready (logged in)");
            }
            ClientEvent::AuthFailure(reason) => {
                error!("WhatsApp auth failure: {reason}");
            }
            ClientEvent::Disconnected(reason) => {
                warn!("WhatsApp client disconnected: {reason}");
                let delay = self.next_reconnect_delay();
                if !delay.is_zero() {
                    info!("reconnecting in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                self.init_client(true).await;
            }
        }
    }

    fn next_reconnect_delay(&self) -> Duration {
        let attempt = self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
        self.reconnect_base * 2u32.pow(attempt.min(RECONNECT_MAX_EXP))
    }
}
