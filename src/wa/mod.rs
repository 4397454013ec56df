//! Live WhatsApp transport
//!
//! Production [`ClientFactory`]/[`Messenger`] over the `whatsapp-rust`
//! stack. The bot persists its session in a SQLite store under the service's
//! session directory; deleting that directory (see `/reset-session`) forces
//! a fresh QR pairing on the next client.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tokio::sync::mpsc;
use tracing::{error, info};
use wacore::types::events::Event;
use wacore_binary::jid::Jid;
use whatsapp_rust::bot::Bot;
use whatsapp_rust::client::Client;
use whatsapp_rust::download::MediaType;
use whatsapp_rust::store::SqliteStore;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

use crate::client::{ClientEvent, ClientFactory, Messenger, OutboundMedia};
use crate::normalize::Recipient;

const SESSION_DB: &str = "whatsapp.db";

pub struct WaClientFactory {
    session_dir: PathBuf,
}

impl WaClientFactory {
    pub fn new(session_dir: PathBuf) -> Self {
        Self { session_dir }
    }
}

#[async_trait]
impl ClientFactory for WaClientFactory {
    async fn create(&self, events: mpsc::Sender<ClientEvent>) -> Result<Arc<dyn Messenger>> {
        std::fs::create_dir_all(&self.session_dir).with_context(|| {
            format!(
                "failed to create session directory {}",
                self.session_dir.display()
            )
        })?;
        let db_path = self.session_dir.join(SESSION_DB);

        let backend = Arc::new(
            SqliteStore::new(db_path.to_string_lossy().as_ref())
                .await
                .context("failed to open WhatsApp session store")?,
        );

        let mut bot = Bot::builder()
            .with_backend(backend)
            .with_transport_factory(TokioWebSocketTransportFactory::new())
            .with_http_client(UreqHttpClient::new())
            .on_event(move |event, _client| {
                let events = events.clone();
                async move {
                    match event {
                        Event::PairingQrCode { code, .. } => {
                            let _ = events.send(ClientEvent::Qr(code)).await;
                        }
                        Event::PairSuccess(_) => {
                            info!("WhatsApp pairing successful");
                        }
                        Event::Connected(_) => {
                            let _ = events.send(ClientEvent::Ready).await;
                        }
                        Event::LoggedOut(_) => {
                            let _ = events
                                .send(ClientEvent::AuthFailure(
                                    "logged out by the phone, session invalidated".into(),
                                ))
                                .await;
                        }
                        Event::Disconnected(_) => {
                            let _ = events
                                .send(ClientEvent::Disconnected("transport closed".into()))
                                .await;
                        }
                        _ => {}
                    }
                }
            })
            .build()
            .await
            .map_err(|e| anyhow::anyhow!("failed to build WhatsApp bot: {e}"))?;

        let client = bot.client();

        let handle = bot
            .run()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start WhatsApp bot: {e}"))?;
        let driver = handle.abort_handle();
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("WhatsApp driver task failed: {e:?}");
                }
            }
        });

        Ok(Arc::new(WaMessenger { client, driver }))
    }
}

struct WaMessenger {
    client: Arc<Client>,
    driver: tokio::task::AbortHandle,
}

impl WaMessenger {
    fn jid(to: &Recipient) -> Result<Jid> {
        to.as_str()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid JID {:?}: {e}", to.as_str()))
    }
}

#[async_trait]
impl Messenger for WaMessenger {
    async fn send_text(&self, to: &Recipient, body: &str) -> Result<()> {
        let jid = Self::jid(to)?;
        let message = waproto::whatsapp::Message {
            conversation: Some(body.to_string()),
            ..Default::default()
        };
        self.client
            .send_message(jid, message)
            .await
            .map_err(|e| anyhow::anyhow!("WhatsApp send failed: {e}"))?;
        Ok(())
    }

    async fn send_document(&self, to: &Recipient, media: &OutboundMedia) -> Result<()> {
        let jid = Self::jid(to)?;
        let bytes = BASE64
            .decode(&media.data)
            .context("failed to decode media payload")?;

        let upload = self
            .client
            .upload(bytes, MediaType::Document)
            .await
            .map_err(|e| anyhow::anyhow!("WhatsApp media upload failed: {e}"))?;

        let message = waproto::whatsapp::Message {
            document_message: Some(Box::new(waproto::whatsapp::message::DocumentMessage {
                mimetype: Some(media.mime.clone()),
                title: Some(media.filename.clone()),
                file_name: Some(media.filename.clone()),
                url: Some(upload.url),
                direct_path: Some(upload.direct_path),
                media_key: Some(upload.media_key),
                file_enc_sha256: Some(upload.file_enc_sha256),
                file_sha256: Some(upload.file_sha256),
                file_length: Some(upload.file_length),
                ..Default::default()
            })),
            ..Default::default()
        };
        self.client
            .send_message(jid, message)
            .await
            .map_err(|e| anyhow::anyhow!("WhatsApp send failed: {e}"))?;
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.driver.abort();
        Ok(())
    }
}
