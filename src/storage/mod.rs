use crate::models::Actor;
use serde::Deserialize;

/// Written by the host after sign-in; the editor only reads these keys.
pub(crate) const TOKEN_KEY: &str = "blockdesk_token";
pub(crate) const ACTOR_KEY: &str = "blockdesk_actor";

pub(crate) fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

/// The identity context the host stored for this browser, if any.
pub(crate) fn load_actor() -> Option<Actor> {
    load_json_from_storage::<Actor>(ACTOR_KEY).filter(|a| !a.id.trim().is_empty())
}
