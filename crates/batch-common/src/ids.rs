//! Short opaque identifiers
//!
//! Jobs and models are addressed by 8-character lowercase alphanumeric ids.
//! Randomness comes from a v4 UUID.

use uuid::Uuid;

/// Length of every generated identifier.
pub const SHORT_ID_LEN: usize = 8;

const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a new random 8-character identifier.
pub fn short_id() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(SHORT_ID_LEN)
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_shape() {
        let id = short_id();
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_short_ids_differ() {
        let ids: std::collections::HashSet<_> = (0..64).map(|_| short_id()).collect();
        assert!(ids.len() > 60);
    }
}
