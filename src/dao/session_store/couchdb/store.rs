use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::dao::{models::SessionEntity, session_store::SessionStore, storage::StorageResult};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{CouchSessionDocument, session_doc_id},
};

/// CouchDB-backed [`SessionStore`] implementation speaking the HTTP API.
#[derive(Clone)]
pub struct CouchSessionStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchSessionStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.with_auth(self.client.request(method, url))
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn database_error(&self, action: &'static str) -> impl FnOnce(reqwest::Error) -> CouchDaoError {
        let database = self.database.to_string();
        move |source| CouchDaoError::Database {
            database,
            action,
            source,
        }
    }

    /// Create the database on first use; CouchDB answers 404 for unknown databases.
    async fn ensure_database(&self) -> CouchResult<()> {
        let url = self.database_url();
        let probe = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(self.database_error("query"))?;

        let status = match probe.status() {
            StatusCode::NOT_FOUND => self
                .with_auth(self.client.put(&url))
                .send()
                .await
                .map_err(self.database_error("create"))?
                .status(),
            other => other,
        };

        if status.is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::Status { path: url, status })
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::Decode {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::Status {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::Status {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn insert_session(&self, mut session: SessionEntity) -> CouchResult<Uuid> {
        let id = Uuid::new_v4();
        session.id = id;
        let document = CouchSessionDocument::from((session, None));
        self.put_document(&document.id, &document).await?;
        Ok(id)
    }

    async fn find_session(&self, id: Uuid) -> CouchResult<Option<SessionEntity>> {
        let doc_id = session_doc_id(id);
        self.get_document::<CouchSessionDocument>(&doc_id)
            .await?
            .map(SessionEntity::try_from)
            .transpose()
    }

    /// Replace the session document, carrying over the current revision as CouchDB requires.
    async fn update_session(&self, session: SessionEntity) -> CouchResult<()> {
        let id = session.id;
        let doc_id = session_doc_id(id);
        let existing = self
            .get_document::<CouchSessionDocument>(&doc_id)
            .await?
            .ok_or(CouchDaoError::MissingSession { id })?;
        let document = CouchSessionDocument::from((session, existing.rev));
        self.put_document(&doc_id, &document).await
    }

    async fn ping(&self) -> CouchResult<()> {
        let url = self.database_url();
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: url.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::Status {
                path: url,
                status: response.status(),
            })
        }
    }
}

impl SessionStore for CouchSessionStore {
    fn insert(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<Uuid>> {
        let store = self.clone();
        Box::pin(async move { store.insert_session(session).await.map_err(Into::into) })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_session(id).await.map_err(Into::into) })
    }

    fn update(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.update_session(session).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
