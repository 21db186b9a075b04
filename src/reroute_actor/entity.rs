use std::convert::Infallible;

use chrono::Utc;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{RerouteCreate, RerouteRecord};

impl Entity for RerouteRecord {
    type Id = String;
    type CreateParams = RerouteCreate;
    type Patch = Infallible;

    const NAME: &'static str = "reroute";

    fn id(&self) -> &String { &self.id }

    /// Records are immutable once written, hence the uninhabited patch type.
    fn from_create_params(id: String, params: RerouteCreate) -> Result<Self, FrameworkError> {
        Ok(Self {
            id,
            order_id: params.order_id,
            shelter_id: params.shelter_id,
            shelter_name: params.shelter_name,
            shelter_address: params.shelter_address,
            shelter_contact_email: params.shelter_contact_email,
            shelter_contact_phone: params.shelter_contact_phone,
            items: params.items,
            total: params.total,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, patch: Infallible) -> Result<(), FrameworkError> {
        match patch {}
    }
}
