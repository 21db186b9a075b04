use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderItem;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

impl Address {
    /// Single-line form used in assignment snapshots and reroute records.
    pub fn one_line(&self) -> String {
        [&self.street, &self.city, &self.state, &self.zipcode]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A partner shelter that can receive donated orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: Address,
    pub capacity: u32,
    pub active: bool,
}

/// Payload for registering a shelter.
#[derive(Debug, Clone)]
pub struct ShelterCreate {
    pub name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: Address,
    pub capacity: u32,
}

/// Audit entry written when an order is donated to a shelter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerouteRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub order_id: String,
    pub shelter_id: String,
    pub shelter_name: String,
    pub shelter_address: String,
    pub shelter_contact_email: String,
    pub shelter_contact_phone: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a reroute record.
#[derive(Debug, Clone)]
pub struct RerouteCreate {
    pub order_id: String,
    pub shelter_id: String,
    pub shelter_name: String,
    pub shelter_address: String,
    pub shelter_contact_email: String,
    pub shelter_contact_phone: String,
    pub items: Vec<OrderItem>,
    pub total: f64,
}

/// Shelters inserted by the seeding endpoint when the directory is empty.
pub fn default_shelters() -> Vec<ShelterCreate> {
    let shelter = |name: &str,
                   contact_name: &str,
                   contact_phone: &str,
                   contact_email: &str,
                   capacity: u32,
                   street: &str,
                   city: &str,
                   zipcode: &str| ShelterCreate {
        name: name.to_string(),
        contact_name: contact_name.to_string(),
        contact_email: contact_email.to_string(),
        contact_phone: contact_phone.to_string(),
        address: Address {
            street: street.to_string(),
            city: city.to_string(),
            state: "NC".to_string(),
            zipcode: zipcode.to_string(),
            country: "United States".to_string(),
        },
        capacity,
    };

    vec![
        shelter("City Shelter – Raleigh", "John Smith", "+1 919 555 0111", "john.smith@cityshelter.org", 200, "101 Main St", "Raleigh", "27601"),
        shelter("Triangle Food Bank", "Lisa Green", "+1 919 555 0112", "lisa.green@trianglefb.org", 150, "22 Triangle Way", "Raleigh", "27606"),
        shelter("Community Outreach Center", "Mark Lee", "+1 919 555 0113", "mark.lee@cocenter.org", 100, "400 Elm Ave", "Raleigh", "27607"),
        shelter("Wake County Relief Shelter", "Angela Torres", "+1 919 555 0114", "angela.torres@wake-relief.org", 180, "75 Oak Blvd", "Cary", "27513"),
        shelter("Durham Helping Hands", "Calvin Brooks", "+1 984 555 0115", "calvin.brooks@helpinghands.org", 130, "19 Ninth St", "Durham", "27701"),
        shelter("Chapel Hill Community Pantry", "Priya Shah", "+1 919 555 0116", "priya.shah@chpantry.org", 120, "8 Franklin St", "Chapel Hill", "27514"),
        shelter("Garner Hope Center", "Evan Clark", "+1 919 555 0117", "evan.clark@garnerhope.org", 90, "210 Meadow Rd", "Garner", "27529"),
        shelter("Morrisville Food & Shelter", "Sarah Nguyen", "+1 919 555 0118", "sarah.nguyen@mfs.org", 110, "310 Park Center Dr", "Morrisville", "27560"),
    ]
}
