//! services/api/src/adapters/firestore.rs
//!
//! This module contains the document store adapter, the concrete implementation
//! of the `AccountStore` port backed by the Cloud Firestore REST API. Account
//! records live in one collection, one document per `uid`.

use std::collections::HashMap;

use account_core::domain::Account;
use account_core::ports::{AccountStore, PortError, PortResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::google::{read_error, transport_error};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `AccountStore` port on top of Firestore.
#[derive(Clone)]
pub struct FirestoreAdapter {
    client: Client,
    base_url: String,
    project_id: String,
    access_token: String,
    collection: String,
}

impl FirestoreAdapter {
    /// Creates a new `FirestoreAdapter` for the given collection.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        access_token: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project_id: project_id.into(),
            access_token: access_token.into(),
            collection: collection.into(),
        }
    }

    /// The REST URL of the document holding the account for `uid`.
    fn document_url(&self, uid: &str) -> PortResult<Url> {
        // An empty id would address the collection itself.
        if uid.is_empty() {
            return Err(PortError::Unexpected("account uid must not be empty".to_string()));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PortError::Unexpected(format!("invalid Firestore URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected("Firestore URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                self.collection.as_str(),
                uid,
            ]);
        Ok(url)
    }
}

//=========================================================================================
// "Impure" Document Record Structs
//=========================================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountDocument {
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
}

impl AccountDocument {
    fn from_domain(account: &Account) -> Self {
        let string = |value: &str| FieldValue {
            string_value: Some(value.to_string()),
        };
        let fields = HashMap::from([
            ("name".to_string(), string(&account.name)),
            ("email".to_string(), string(&account.email)),
        ]);
        Self { fields }
    }

    fn to_domain(mut self, uid: &str) -> Account {
        let mut take = |key: &str| {
            self.fields
                .remove(key)
                .and_then(|value| value.string_value)
                .unwrap_or_default()
        };
        Account {
            uid: uid.to_string(),
            name: take("name"),
            email: take("email"),
        }
    }
}

//=========================================================================================
// `AccountStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountStore for FirestoreAdapter {
    async fn get_account(&self, uid: &str) -> PortResult<Option<Account>> {
        let url = self.document_url(uid)?;
        debug!(%url, "Fetching account document");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let (status, error) = read_error(response).await;
            return Err(PortError::Unexpected(format!(
                "Firestore read failed: {status} {}",
                error.message
            )));
        }

        let document: AccountDocument = response.json().await.map_err(transport_error)?;
        Ok(Some(document.to_domain(uid)))
    }

    async fn set_account(&self, account: &Account) -> PortResult<()> {
        let url = self.document_url(&account.uid)?;
        debug!(%url, "Writing account document");
        // The precondition turns the write into a create: Firestore rejects it
        // if the document already exists.
        let response = self
            .client
            .patch(url)
            .query(&[("currentDocument.exists", "false")])
            .bearer_auth(&self.access_token)
            .json(&AccountDocument::from_domain(account))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, error) = read_error(response).await;
        if status == StatusCode::CONFLICT
            || matches!(error.status.as_str(), "ALREADY_EXISTS" | "FAILED_PRECONDITION")
        {
            return Err(PortError::AlreadyExists(account.uid.clone()));
        }
        Err(PortError::Unexpected(format!(
            "Firestore write failed: {status} {}",
            error.message
        )))
    }
}
