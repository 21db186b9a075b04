use std::convert::Infallible;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{Shelter, ShelterCreate};

impl Entity for Shelter {
    type Id = String;
    type CreateParams = ShelterCreate;
    type Patch = Infallible;

    const NAME: &'static str = "shelter";

    fn id(&self) -> &String { &self.id }

    fn from_create_params(id: String, params: ShelterCreate) -> Result<Self, FrameworkError> {
        if params.name.trim().is_empty() {
            return Err(FrameworkError::Rejected("shelter name is required".to_string()));
        }
        Ok(Self {
            id,
            name: params.name,
            contact_name: params.contact_name,
            contact_email: params.contact_email,
            contact_phone: params.contact_phone,
            address: params.address,
            capacity: params.capacity,
            active: true,
        })
    }

    fn on_update(&mut self, patch: Infallible) -> Result<(), FrameworkError> {
        match patch {}
    }
}
