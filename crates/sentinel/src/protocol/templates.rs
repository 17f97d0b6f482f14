//! Signed-message templates.
//!
//! Both sides build these strings independently; a single differing byte
//! makes verification fail silently, so they live in exactly one place.

/// Message a validator signs when registering.
pub fn signup_message(callback_id: &str, public_key: &str) -> String {
    format!("Signed message for {callback_id}, {public_key}")
}

/// Message a validator signs when answering a probe request.
pub fn reply_message(callback_id: &str) -> String {
    format!("Replying to {callback_id}")
}
