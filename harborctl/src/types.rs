//! Common type definitions.
//!
//! Entity IDs are UUIDs wrapped in type aliases; catways are addressed by
//! their harbor-assigned number rather than a surrogate ID.

use uuid::Uuid;

pub type UserId = Uuid;
pub type ReservationId = Uuid;

/// A catway (berth) number. Positive, bounded by the configured harbor capacity.
pub type CatwayNumber = i32;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&uuid), "550e8400");
    }
}
