//! Hotmart gateway adapter.
//!
//! Static-token authentication and normalization of the purchase-status
//! taxonomy into canonical events. The endpoint acknowledges everything
//! once authenticated; see the HTTP layer for the response contract.

mod adapter;
mod webhook_types;

pub use adapter::HotmartWebhookAdapter;
pub use webhook_types::{
    HotmartBuyer, HotmartData, HotmartNotification, HotmartOffer, HotmartProduct,
    HotmartPurchase, HotmartSubscriber, HotmartSubscription,
};
