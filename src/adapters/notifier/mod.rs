//! Notifier adapters for post-entitlement side effects.

mod logging;

pub use logging::LoggingNotifier;
