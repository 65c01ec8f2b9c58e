use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;
use url::Url;

use crate::config::Config;
use crate::store::api_types::{ApiCreateResponse, ApiListResponse, ApiQueryRequest};
use crate::store::error::StoreError;
use crate::store::types::{EntityKind, Item, ItemDraft, MessageDraft};

/// One page of an ordered collection listing. The cursor is the id of the
/// last document in the page; an empty page carries no cursor and means the
/// collection is exhausted past the requested position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
  pub items: Vec<Item>,
  pub cursor: Option<String>,
}

/// Document store API client.
#[derive(Clone)]
pub struct StoreClient {
  http: reqwest::Client,
  base: Url,
  token: String,
}

impl StoreClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;

    let mut base = Url::parse(&config.store.url)
      .map_err(|e| eyre!("Invalid store url {}: {}", config.store.url, e))?;
    // Paths are joined relative to the base, which requires a trailing slash.
    if !base.path().ends_with('/') {
      base.set_path(&format!("{}/", base.path()));
    }

    Ok(Self {
      http: reqwest::Client::new(),
      base,
      token,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
    self
      .base
      .join(path)
      .map_err(|e| StoreError::Unavailable(format!("bad endpoint {}: {}", path, e)))
  }

  /// Fetch one ordered page of a collection, optionally resuming after a
  /// previously seen document. No page size is imposed; the store returns
  /// everything past the cursor.
  pub async fn list_page(
    &self,
    kind: EntityKind,
    after: Option<&str>,
  ) -> Result<Page, StoreError> {
    let mut url = self.endpoint(&format!("collections/{}", kind.collection()))?;
    url
      .query_pairs_mut()
      .append_pair("order_by", kind.order_key())
      .append_pair("dir", "desc");
    if let Some(cursor) = after {
      url.query_pairs_mut().append_pair("after", cursor);
    }

    let response = self
      .http
      .get(url)
      .bearer_auth(&self.token)
      .send()
      .await?;
    let status = response.status();
    if !status.is_success() {
      return Err(StoreError::Unavailable(format!(
        "list {} returned {}",
        kind.collection(),
        status
      )));
    }

    let body: ApiListResponse = response
      .json()
      .await
      .map_err(|e| StoreError::Malformed {
        collection: kind.collection().to_string(),
        reason: e.to_string(),
      })?;

    // A single undecodable document is dropped, not fatal; the rest of the
    // page still renders.
    let mut items = Vec::with_capacity(body.documents.len());
    let mut cursor = None;
    for doc in body.documents {
      let id = doc.id.clone();
      match doc.into_item(kind.collection()) {
        Ok(item) => {
          cursor = Some(id);
          items.push(item);
        }
        Err(e) => warn!("skipping document {}: {}", id, e),
      }
    }

    Ok(Page { items, cursor })
  }

  /// Create a document; returns the store-assigned id.
  pub async fn create(&self, kind: EntityKind, draft: &ItemDraft) -> Result<String, StoreError> {
    let url = self.endpoint(&format!("collections/{}", kind.collection()))?;

    let response = self
      .http
      .post(url)
      .bearer_auth(&self.token)
      .json(draft)
      .send()
      .await?;
    let status = response.status();
    if !status.is_success() {
      return Err(write_rejected(kind, "create", status));
    }

    let body: ApiCreateResponse = response
      .json()
      .await
      .map_err(|e| StoreError::Malformed {
        collection: kind.collection().to_string(),
        reason: e.to_string(),
      })?;

    Ok(body.id)
  }

  /// Merge the supplied fields into an existing document.
  pub async fn update(
    &self,
    kind: EntityKind,
    id: &str,
    patch: &ItemDraft,
  ) -> Result<(), StoreError> {
    let url = self.endpoint(&format!("collections/{}/{}", kind.collection(), id))?;

    let status = self
      .http
      .patch(url)
      .bearer_auth(&self.token)
      .json(patch)
      .send()
      .await?
      .status();
    if !status.is_success() {
      return Err(write_rejected(kind, "update", status));
    }
    Ok(())
  }

  pub async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), StoreError> {
    let url = self.endpoint(&format!("collections/{}/{}", kind.collection(), id))?;

    let status = self
      .http
      .delete(url)
      .bearer_auth(&self.token)
      .send()
      .await?
      .status();
    if !status.is_success() {
      return Err(write_rejected(kind, "delete", status));
    }
    Ok(())
  }

  /// Check the admin collection for a document matching the given identity
  /// and secret digest.
  pub async fn find_admin(
    &self,
    name: &str,
    email: &str,
    secret_digest: &str,
  ) -> Result<bool, StoreError> {
    let url = self.endpoint("collections/admin/query")?;

    let mut filters = BTreeMap::new();
    filters.insert("name".to_string(), Value::String(name.to_string()));
    filters.insert("email".to_string(), Value::String(email.to_string()));
    filters.insert(
      "secret_sha256".to_string(),
      Value::String(secret_digest.to_string()),
    );

    let response = self
      .http
      .post(url)
      .bearer_auth(&self.token)
      .json(&ApiQueryRequest { filters })
      .send()
      .await?;
    let status = response.status();
    if !status.is_success() {
      return Err(StoreError::Unavailable(format!(
        "admin query returned {}",
        status
      )));
    }

    let body: ApiListResponse = response
      .json()
      .await
      .map_err(|e| StoreError::Malformed {
        collection: "admin".to_string(),
        reason: e.to_string(),
      })?;

    Ok(!body.documents.is_empty())
  }

  /// Write a visitor message to the messages collection.
  pub async fn send_message(&self, message: &MessageDraft) -> Result<(), StoreError> {
    let url = self.endpoint("collections/messages")?;

    let status = self
      .http
      .post(url)
      .bearer_auth(&self.token)
      .json(message)
      .send()
      .await?
      .status();
    if !status.is_success() {
      return Err(StoreError::WriteRejected(format!(
        "send message returned {}",
        status
      )));
    }
    Ok(())
  }
}

fn write_rejected(kind: EntityKind, op: &str, status: StatusCode) -> StoreError {
  StoreError::WriteRejected(format!("{} {} returned {}", op, kind.singular(), status))
}
