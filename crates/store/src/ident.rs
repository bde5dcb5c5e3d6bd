//! Short identifier generation and validation.

use rand::Rng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated identifiers.
pub const DEFAULT_LENGTH: usize = 6;

/// Longest identifier accepted from a client.
pub const MAX_LENGTH: usize = 64;

/// Generate a random identifier of the given length.
///
/// Each character is drawn independently and uniformly from `[a-zA-Z0-9]`.
/// No collision check is performed; callers rely on the index and blob store
/// rejecting duplicates.
pub fn generate(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Whether a client-supplied identifier is acceptable as a storage key.
///
/// Restricted to the same alphabet as generated identifiers, so path
/// separators and traversal sequences can never reach the blob store.
pub fn is_valid(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_LENGTH && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_shape() {
        for _ in 0..200 {
            let id = generate(DEFAULT_LENGTH);
            assert_eq!(id.len(), DEFAULT_LENGTH);
            assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generated_ids_vary() {
        let a = generate(DEFAULT_LENGTH);
        let b = generate(DEFAULT_LENGTH);
        // 62^6 values; two equal draws in a row mean a broken generator.
        assert_ne!(a, b);
    }

    #[test]
    fn test_custom_length() {
        assert_eq!(generate(12).len(), 12);
        assert_eq!(generate(1).len(), 1);
    }

    #[test]
    fn test_generated_ids_validate() {
        for _ in 0..50 {
            assert!(is_valid(&generate(DEFAULT_LENGTH)));
        }
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!is_valid(""));
        assert!(!is_valid("../etc"));
        assert!(!is_valid("a/b"));
        assert!(!is_valid("a b"));
        assert!(!is_valid("naïve"));
        assert!(!is_valid(&"x".repeat(MAX_LENGTH + 1)));
    }

    #[test]
    fn test_valid_ids() {
        assert!(is_valid("a"));
        assert!(is_valid("aB3dE9"));
        assert!(is_valid(&"x".repeat(MAX_LENGTH)));
    }
}
