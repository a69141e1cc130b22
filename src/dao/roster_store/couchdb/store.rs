use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::dao::{
    models::{CheckInEventEntity, NewPlayerEntity, RosterEntity},
    roster_store::RosterStore,
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{CouchEventDocument, CouchRosterDocument, event_doc_id, roster_doc_id},
};

/// Read-modify-write cycles retried after a revision conflict.
const MAX_CONFLICT_RETRIES: usize = 3;

/// [`RosterStore`] persisting documents in a CouchDB database over HTTP.
#[derive(Clone)]
pub struct CouchRosterStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchRosterStore {
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

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn request(&self, method: Method, doc_id: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.database_url(), doc_id);
        self.authorize(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorize(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
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
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// Fetch the current `_rev` of a document, if it exists.
    async fn current_rev(&self, doc_id: &str) -> CouchResult<Option<String>> {
        let response = self
            .request(Method::HEAD, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(response
                .headers()
                .get(reqwest::header::ETAG)
                .and_then(|value| value.to_str().ok())
                .map(|etag| etag.trim_matches('"').to_string())),
            other => Err(CouchDaoError::RequestStatus {
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
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                path: doc_id.to_string(),
            }),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// Apply `mutate` to an event document, re-reading it when another writer got there first.
    async fn update_event<F>(&self, id: Uuid, mutate: F) -> CouchResult<Option<CheckInEventEntity>>
    where
        F: Fn(&mut CheckInEventEntity),
    {
        let doc_id = event_doc_id(id);
        let mut attempt = 0;
        loop {
            let Some(doc) = self.get_document::<CouchEventDocument>(&doc_id).await? else {
                return Ok(None);
            };
            let rev = doc.rev.clone();
            let mut event = CheckInEventEntity::try_from(doc)?;
            mutate(&mut event);

            let updated = CouchEventDocument::from((event.clone(), rev));
            match self.put_document(&doc_id, &updated).await {
                Ok(()) => return Ok(Some(event)),
                Err(CouchDaoError::Conflict { .. }) if attempt < MAX_CONFLICT_RETRIES => {
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl RosterStore for CouchRosterStore {
    fn load_roster(&self, id: String) -> BoxFuture<'static, StorageResult<Option<RosterEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = roster_doc_id(&id);
            let maybe_doc = store.get_document::<CouchRosterDocument>(&doc_id).await?;
            Ok(maybe_doc.map(RosterEntity::try_from).transpose()?)
        })
    }

    fn save_roster(&self, roster: RosterEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = roster_doc_id(&roster.id);
            let rev = store.current_rev(&doc_id).await?;
            let doc = CouchRosterDocument::from((roster, rev));
            store.put_document(&doc_id, &doc).await.map_err(Into::into)
        })
    }

    fn save_event(&self, event: CheckInEventEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = event_doc_id(event.id);
            let rev = store.current_rev(&doc_id).await?;
            let doc = CouchEventDocument::from((event, rev));
            store.put_document(&doc_id, &doc).await.map_err(Into::into)
        })
    }

    fn find_event(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = event_doc_id(id);
            let maybe_doc = store.get_document::<CouchEventDocument>(&doc_id).await?;
            Ok(maybe_doc.map(CheckInEventEntity::try_from).transpose()?)
        })
    }

    fn record_confirmation(
        &self,
        event_id: Uuid,
        player_id: String,
        confirmed_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_event(event_id, |event| {
                    event
                        .confirmations
                        .entry(player_id.clone())
                        .or_insert(confirmed_at);
                })
                .await
                .map_err(Into::into)
        })
    }

    fn record_new_player(
        &self,
        event_id: Uuid,
        player_id: String,
        player: NewPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<Option<CheckInEventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_event(event_id, |event| {
                    event.new_players.insert(player_id.clone(), player.clone());
                })
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .authorize(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
