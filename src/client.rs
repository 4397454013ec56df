//! Automation client seam
//!
//! The shell never talks to the WhatsApp protocol directly; it goes through
//! these traits so the live transport can be swapped for a test double. The
//! production implementation lives in the `wa` module behind the `whatsapp`
//! feature.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::normalize::Recipient;

/// Lifecycle notifications emitted by a client after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A pairing QR payload to render for the operator.
    Qr(String),
    /// The session is connected and logged in.
    Ready,
    /// Authentication was rejected or the session was invalidated by the
    /// phone. Informational only; no automatic retry.
    AuthFailure(String),
    /// The transport dropped. Triggers a destroy-and-recreate cycle.
    Disconnected(String),
}

/// A document attachment ready for delivery.
///
/// `data` carries the base64-encoded file contents; the transport decodes it
/// before upload.
#[derive(Debug, Clone)]
pub struct OutboundMedia {
    pub mime: String,
    pub filename: String,
    pub data: String,
}

/// One live connection to the messaging network.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, to: &Recipient, body: &str) -> anyhow::Result<()>;

    /// Deliver a single document-flagged attachment.
    async fn send_document(&self, to: &Recipient, media: &OutboundMedia) -> anyhow::Result<()>;

    /// Tear the connection down. Best-effort; callers log and move on.
    async fn destroy(&self) -> anyhow::Result<()>;
}

/// Builds clients for the lifecycle controller.
///
/// `create` wires the client's lifecycle events into the supplied channel
/// and starts connecting in the background; readiness is observed via
/// [`ClientEvent::Ready`], never awaited here.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn create(
        &self,
        events: mpsc::Sender<ClientEvent>,
    ) -> anyhow::Result<Arc<dyn Messenger>>;
}
