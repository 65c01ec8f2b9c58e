//! Admin mode authority and the credential/contact flow.
//!
//! Admin mode is a session-local, client-declared privilege flag: the store
//! holds credential digests and this client compares against them. That is a
//! convenience gate, NOT a security boundary - the store must enforce its own
//! write rules.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::watch;

use crate::store::client::StoreClient;
use crate::store::error::StoreError;
use crate::store::types::MessageDraft;

/// Contact message text that routes into credential verification instead of
/// being sent.
pub const ADMIN_UNLOCK_PHRASE: &str = "enable_admin";

/// Session-local admin flag with change notification.
///
/// Sections subscribe and re-run their fetch when the flag flips, so
/// admin-only affordances render without a restart. The authority only ever
/// flips the flag; it owns no pipeline state.
#[derive(Debug, Clone)]
pub struct AdminAuthority {
  tx: Arc<watch::Sender<bool>>,
}

impl Default for AdminAuthority {
  fn default() -> Self {
    Self::new()
  }
}

impl AdminAuthority {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(false);
    Self { tx: Arc::new(tx) }
  }

  pub fn is_admin(&self) -> bool {
    *self.tx.borrow()
  }

  /// Subscribe to admin mode changes.
  pub fn subscribe(&self) -> watch::Receiver<bool> {
    self.tx.subscribe()
  }

  pub fn set_admin(&self, admin: bool) {
    // send_replace notifies even when there are no subscribers yet.
    self.tx.send_replace(admin);
  }
}

/// Hex SHA-256 digest of an admin secret, as stored in the admin collection.
pub fn secret_digest(secret: &str) -> String {
  hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Check the supplied credentials against the admin collection and enable
/// admin mode on a match. Returns whether the credentials were accepted.
pub async fn verify_credentials(
  store: &StoreClient,
  authority: &AdminAuthority,
  name: &str,
  email: &str,
  secret: &str,
) -> Result<bool, StoreError> {
  let matched = store
    .find_admin(name.trim(), email.trim(), &secret_digest(secret))
    .await?;

  if matched {
    authority.set_admin(true);
  }
  Ok(matched)
}

/// Stamp and store a visitor message in the messages collection.
pub async fn submit_message(
  store: &StoreClient,
  name: &str,
  email: &str,
  company: &str,
  subject: &str,
  message: &str,
) -> Result<(), StoreError> {
  let draft = MessageDraft {
    name: name.trim().to_string(),
    email: email.trim().to_string(),
    company: company.trim().to_string(),
    subject: subject.trim().to_string(),
    message: message.trim().to_string(),
    timestamp: Utc::now().to_rfc3339(),
  };

  store.send_message(&draft).await
}
