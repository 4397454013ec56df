//! wa-relay
//!
//! HTTP façade over a single paired WhatsApp account. Internal services POST
//! JSON to send text and document attachments, and can reset the session to
//! force a fresh QR pairing when it breaks. Protocol work lives in the
//! `whatsapp-rust` stack behind the `whatsapp` feature; everything here is
//! the orchestration shell around it.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod normalize;
pub mod qr;

#[cfg(feature = "whatsapp")]
pub mod wa;
