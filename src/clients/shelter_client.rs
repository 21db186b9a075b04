use tracing::{debug, info, instrument};

use crate::actor_framework::{Filter, ResourceClient};
use crate::clients::StoreError;
use crate::domain::{default_shelters, Shelter};

/// Client for the shelter directory.
#[derive(Clone)]
pub struct ShelterClient {
    inner: ResourceClient<Shelter>,
}

impl_basic_client!(ShelterClient, Shelter, shelter);

impl ShelterClient {
    /// Active shelters sorted by name.
    #[instrument(skip(self))]
    pub async fn active_shelters(&self) -> Result<Vec<Shelter>, StoreError> {
        debug!("Sending request");
        let mut shelters = self.inner.list(Filter::new(|s: &Shelter| s.active)).await?;
        shelters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shelters)
    }

    /// Inserts the default shelters when the directory is empty. Returns how
    /// many were inserted, or `None` if shelters already existed.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> Result<Option<usize>, StoreError> {
        let existing = self.inner.list(Filter::all()).await?;
        if !existing.is_empty() {
            debug!(count = existing.len(), "Shelters already present, skipping seed");
            return Ok(None);
        }

        let seed = default_shelters();
        let count = seed.len();
        for params in seed {
            self.inner.create(params).await?;
        }
        info!(count, "Seeded shelters");
        Ok(Some(count))
    }
}
