//! ID utilities (ULID room ids, session ids).

use ulid::Ulid;
use uuid::Uuid;

/// Generate a short room ID using ULID, truncated for readability.
pub fn new_room_id() -> String {
    let ulid = Ulid::new().to_string();
    // the leading 10 chars are the millisecond timestamp; keep a little of the
    // random part so rooms created in the same millisecond differ
    ulid.chars().skip(6).take(10).collect()
}

/// Session id handed to clients that connect without one.
pub fn new_session_id() -> String { Uuid::new_v4().to_string() }
