// Credential generation
//
// Usernames are `prefix` plus six random characters from a fixed alphabet
// that excludes symbols operators tend to mis-transcribe (0/O, 1/I/L, 5/S,
// 8/B, R, W). 26^6 combinations per prefix; uniqueness against existing
// router records is NOT checked -- a collision surfaces as an ordinary
// per-item provisioning failure.

use rand::Rng;

/// The fixed safe alphabet. 26 symbols, not configurable.
pub const SAFE_ALPHABET: &[u8] = b"234679ACDEFGHJKMNPQTUVWXYZ";

/// Random characters appended after the prefix.
pub const SUFFIX_LEN: usize = 6;

/// One voucher credential. The password always equals the username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Generate a fresh credential for the given prefix.
pub fn generate(prefix: &str) -> Credential {
    let mut rng = rand::rng();
    let mut username = String::with_capacity(prefix.len() + SUFFIX_LEN);
    username.push_str(prefix);
    for _ in 0..SUFFIX_LEN {
        let idx = rng.random_range(0..SAFE_ALPHABET.len());
        username.push(char::from(SAFE_ALPHABET[idx]));
    }
    Credential {
        password: username.clone(),
        username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_shape() {
        for _ in 0..100 {
            let cred = generate("4R");
            assert!(cred.username.starts_with("4R"));
            assert_eq!(cred.username.len(), 2 + SUFFIX_LEN);
            assert_eq!(cred.password, cred.username);
        }
    }

    #[test]
    fn suffix_stays_inside_safe_alphabet() {
        for _ in 0..100 {
            let cred = generate("30D");
            let suffix = &cred.username["30D".len()..];
            for c in suffix.bytes() {
                assert!(
                    SAFE_ALPHABET.contains(&c),
                    "character '{}' outside safe alphabet",
                    char::from(c)
                );
            }
        }
    }

    #[test]
    fn ambiguous_characters_excluded() {
        for banned in b"0158BILORSW" {
            assert!(!SAFE_ALPHABET.contains(banned));
        }
        assert_eq!(SAFE_ALPHABET.len(), 26);
    }

    #[test]
    fn empty_prefix_still_generates() {
        let cred = generate("");
        assert_eq!(cred.username.len(), SUFFIX_LEN);
    }
}
