use serde::{Deserialize, Deserializer};

mod client_context;
pub mod notifications;
pub mod reminders;
pub mod users;

pub use client_context::ClientContext;

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`) in patch bodies.
/// Use together with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
