//! Hotmart webhook payload types.
//!
//! Hotmart posts one JSON body per event with nested buyer / purchase /
//! subscription sections and millisecond timestamps. Only the fields this
//! subsystem reads are captured.

use serde::Deserialize;

/// Hotmart webhook notification envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct HotmartNotification {
    /// Notification id.
    #[serde(default)]
    pub id: Option<String>,

    /// Event name, e.g. "PURCHASE_APPROVED".
    pub event: String,

    /// When the notification was created (Unix milliseconds).
    #[serde(default)]
    pub creation_date: Option<i64>,

    /// Event payload.
    pub data: HotmartData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotmartData {
    #[serde(default)]
    pub product: Option<HotmartProduct>,

    #[serde(default)]
    pub buyer: Option<HotmartBuyer>,

    #[serde(default)]
    pub purchase: Option<HotmartPurchase>,

    #[serde(default)]
    pub subscription: Option<HotmartSubscription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotmartProduct {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotmartBuyer {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotmartPurchase {
    /// Gateway transaction code (e.g. "HP17715690036014").
    #[serde(default)]
    pub transaction: Option<String>,

    /// Purchase status as reported alongside the event name.
    #[serde(default)]
    pub status: Option<String>,

    /// Offer the buyer purchased; maps to a plan via the catalog.
    #[serde(default)]
    pub offer: Option<HotmartOffer>,

    /// When the purchase was approved (Unix milliseconds).
    #[serde(default)]
    pub approved_date: Option<i64>,

    /// Next charge date for recurring purchases (Unix milliseconds).
    #[serde(default)]
    pub date_next_charge: Option<i64>,

    /// 1 for the first charge of a subscription, increasing per renewal.
    #[serde(default)]
    pub recurrence_number: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotmartOffer {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotmartSubscription {
    #[serde(default)]
    pub subscriber: Option<HotmartSubscriber>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotmartSubscriber {
    /// Subscriber code, stable across the subscription's lifetime.
    #[serde(default)]
    pub code: Option<String>,
}
