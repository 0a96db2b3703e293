//! Remote document store access.
//!
//! The workflow engine only ever reads documents and replaces approval
//! records; both go through the [`DocumentStore`] trait so the dispatcher
//! can be exercised without a live network. [`HttpDocumentStore`] is the
//! real thing, [`MemoryStore`] the test substrate.
use crate::approval::{Approval, Document};
use crate::directory::User;
use crate::error::{GENERIC_FAILURE, StoreError};
use crate::stage::DocumentKind;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Response envelope the document store wraps every payload in. All fields
/// are optional on the wire; missing ones decode to `None`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, kind: DocumentKind, id: &str) -> Result<Document, StoreError>;

    /// Replace the document's approval record wholesale. The caller is
    /// responsible for having copied every prior field forward.
    async fn save_approval(
        &self,
        kind: DocumentKind,
        id: &str,
        approval: &Approval,
    ) -> Result<(), StoreError>;

    async fn fetch_users(&self) -> Result<Vec<User>, StoreError>;
}

/// Externally managed session supplying the acting user and bearer token.
pub trait AuthContext: Send + Sync {
    fn current_user(&self) -> &User;
    fn access_token(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

impl AuthContext for Session {
    fn current_user(&self) -> &User {
        &self.user
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }
}

pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            access_token: access_token.into(),
        }
    }

    pub fn for_session(base_url: impl Into<String>, auth: &impl AuthContext) -> Self {
        Self::new(base_url, auth.access_token())
    }

    fn document_url(&self, kind: DocumentKind, id: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, kind.api_segment(), id)
    }

    fn approval_url(&self, kind: DocumentKind, id: &str) -> String {
        format!(
            "{}/api/{}/approvals/{}",
            self.base_url,
            kind.api_segment(),
            id
        )
    }

    fn users_url(&self) -> String {
        format!("{}/api/users", self.base_url)
    }

    /// Pull the server's message out of a non-2xx body, falling back to the
    /// generic string when the envelope is unparseable.
    fn failure_message(body: &str) -> String {
        serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: Self::failure_message(&body),
            });
        }
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        envelope.data.ok_or_else(|| StoreError::Api {
            status: status.as_u16(),
            message: envelope.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        })
    }

    async fn check(response: reqwest::Response) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(StoreError::Api {
            status: status.as_u16(),
            message: Self::failure_message(&body),
        })
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch(&self, kind: DocumentKind, id: &str) -> Result<Document, StoreError> {
        let url = self.document_url(kind, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(%url, "document fetch failed: {err}");
                err
            })?;
        Self::decode(response).await
    }

    async fn save_approval(
        &self,
        kind: DocumentKind,
        id: &str,
        approval: &Approval,
    ) -> Result<(), StoreError> {
        let url = self.approval_url(kind, id);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(approval)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(%url, "approval update failed: {err}");
                err
            })?;
        Self::check(response).await
    }

    async fn fetch_users(&self) -> Result<Vec<User>, StoreError> {
        let url = self.users_url();
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::decode(response).await
    }
}

/// In-memory store for tests and local development. Counts approval saves so
/// "no network call" preconditions can be asserted, and can be told to fail
/// saves with a given server message.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<(DocumentKind, String), Document>>,
    users: Mutex<Vec<User>>,
    saves: AtomicUsize,
    save_failure: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, kind: DocumentKind, document: Document) {
        self.documents
            .lock()
            .expect("memory store lock poisoned")
            .insert((kind, document.id.clone()), document);
    }

    pub fn put_users(&self, users: Vec<User>) {
        *self.users.lock().expect("memory store lock poisoned") = users;
    }

    pub fn document(&self, kind: DocumentKind, id: &str) -> Option<Document> {
        self.documents
            .lock()
            .expect("memory store lock poisoned")
            .get(&(kind, id.to_string()))
            .cloned()
    }

    /// Number of approval updates this store has been asked to persist.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every subsequent save fail with `message`, as if the server had
    /// refused the update.
    pub fn fail_saves_with(&self, message: &str) {
        *self.save_failure.lock().expect("memory store lock poisoned") =
            Some(message.to_string());
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, kind: DocumentKind, id: &str) -> Result<Document, StoreError> {
        self.document(kind, id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn save_approval(
        &self,
        kind: DocumentKind,
        id: &str,
        approval: &Approval,
    ) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self
            .save_failure
            .lock()
            .expect("memory store lock poisoned")
            .clone()
        {
            return Err(StoreError::Api {
                status: 500,
                message,
            });
        }
        let mut documents = self.documents.lock().expect("memory store lock poisoned");
        let document = documents
            .get_mut(&(kind, id.to_string()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        document.approval = approval.clone();
        Ok(())
    }

    async fn fetch_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().expect("memory store lock poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_store_layout() {
        let store = HttpDocumentStore::new("https://erp.example.com/", "token");
        assert_eq!(
            store.document_url(DocumentKind::CashAdvance, "ca-77"),
            "https://erp.example.com/api/cash-advances/ca-77"
        );
        assert_eq!(
            store.approval_url(DocumentKind::OutgoingPayment, "op-3"),
            "https://erp.example.com/api/outgoing-payments/approvals/op-3"
        );
        assert_eq!(store.users_url(), "https://erp.example.com/api/users");
    }

    #[test]
    fn failure_message_prefers_the_server_text() {
        let body = r#"{"status": 422, "message": "Document is locked"}"#;
        assert_eq!(HttpDocumentStore::failure_message(body), "Document is locked");
    }

    #[test]
    fn failure_message_falls_back_when_unparseable() {
        assert_eq!(
            HttpDocumentStore::failure_message("<html>Bad Gateway</html>"),
            GENERIC_FAILURE
        );
    }

    #[test]
    fn session_supplies_the_bearer_token() {
        let session = Session {
            user: User {
                id: "u1".into(),
                full_name: "Ada Prepare".into(),
                username: "ada.prepare".into(),
                kansai_employee_id: None,
            },
            access_token: "token-abc".into(),
        };
        assert_eq!(session.current_user().id, "u1");
        let store = HttpDocumentStore::for_session("https://erp.example.com", &session);
        assert_eq!(store.access_token, "token-abc");
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let envelope: ApiEnvelope<Vec<User>> = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(envelope.message.is_none());
        assert_eq!(envelope.data.unwrap().len(), 0);
    }

    #[test]
    fn envelope_decodes_payloads_without_a_default_impl() {
        // User has no Default; the envelope must not demand one
        let body = r#"{"status": 200, "data": {"id": "u1", "fullName": "Ada Prepare", "username": "ada.prepare"}}"#;
        let envelope: ApiEnvelope<User> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.unwrap().id, "u1");

        let empty: ApiEnvelope<User> = serde_json::from_str("{}").unwrap();
        assert!(empty.status.is_none());
        assert!(empty.data.is_none());
    }
}
