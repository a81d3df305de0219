use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{PickupStatus, Priority};

/// One pickup request as delivered by the storefront's pickup API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRecord {
    pub pickup_id: String,
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub dealer_name: String,
    pub scheduled_date: DateTime<Utc>,
    pub status: PickupStatus,
    pub priority: Priority,
    #[serde(default)]
    pub pickup_address: Option<Address>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "address")]
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
}
