use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use deck_api::{ApiClient, Image};
use parking_lot::RwLock;

use crate::machine::Machine;
use crate::{Error, Notifier, Result};

/// Asynchronous image resolution, keyed by image id.
///
/// Machines resolve their image lazily after the record appears; a failed
/// lookup leaves the machine without an image rather than surfacing an
/// error to the user.
#[async_trait]
pub trait ImageLookup: Send + Sync + 'static {
    async fn get_image(&self, image_id: &str) -> Result<Image>;
}

/// HTTP-backed [`ImageLookup`] that caches the backend's image listing.
///
/// The listing is fetched on first use and kept in memory; later lookups
/// are served from the cache.
pub struct ImageStore {
    client: ApiClient,
    backend_id: String,
    cache: RwLock<HashMap<String, Image>>,
}

impl ImageStore {
    pub fn new(client: ApiClient, backend_id: impl Into<String>) -> Self {
        Self {
            client,
            backend_id: backend_id.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ImageLookup for ImageStore {
    async fn get_image(&self, image_id: &str) -> Result<Image> {
        if let Some(image) = self.cache.read().get(image_id) {
            return Ok(image.clone());
        }

        let images = self.client.list_images(&self.backend_id).await?;
        let mut cache = self.cache.write();
        for image in images {
            cache.insert(image.id.clone(), image);
        }

        cache
            .get(image_id)
            .cloned()
            .ok_or_else(|| Error::UnknownImage(image_id.to_string()))
    }
}

/// An account/provider context owning a collection of machines.
///
/// Holds the API client and the collaborators shared by all of its machine
/// records.
pub struct Backend {
    id: String,
    client: ApiClient,
    images: Arc<dyn ImageLookup>,
    notifier: Arc<dyn Notifier>,
}

impl Backend {
    /// Backend with the default HTTP-backed image lookup.
    pub fn new(
        client: ApiClient,
        id: impl Into<String>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let id = id.into();
        let images = Arc::new(ImageStore::new(client.clone(), id.clone()));
        Self::with_image_lookup(client, id, notifier, images)
    }

    /// Backend with a custom image lookup.
    pub fn with_image_lookup(
        client: ApiClient,
        id: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        images: Arc<dyn ImageLookup>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            client,
            images,
            notifier,
        })
    }

    /// Create from env vars: `DECK_API_URL` (required).
    pub fn from_env(id: impl Into<String>, notifier: Arc<dyn Notifier>) -> Result<Arc<Self>> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("DECK_API_URL")
            .map_err(|_| Error::MissingEnv("DECK_API_URL".into()))?;

        Ok(Self::new(ApiClient::new(base_url), id, notifier))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn images(&self) -> &Arc<dyn ImageLookup> {
        &self.images
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Fetch the server-side machine listing and build one record per entry.
    ///
    /// Refresh scheduling belongs to the caller, which replaces its stale
    /// collection with the returned one.
    pub async fn list_machines(self: &Arc<Self>) -> Result<Vec<Arc<Machine>>> {
        let listings = self.client.list_machines(&self.id).await?;
        Ok(listings
            .into_iter()
            .map(|listing| Machine::from_listing(Arc::clone(self), listing))
            .collect())
    }
}
