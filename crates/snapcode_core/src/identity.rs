use rand::Rng;

/// Length of an asset token.
pub const TOKEN_LEN: usize = 8;

/// Lowercase so that names survive case-insensitive filesystems.
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a short random asset token.
///
/// 36^8 is roughly 2.8e12 possible tokens. Existing files are not checked: with
/// `n` stored assets the chance of any collision is about `n^2 / 5.6e12`, which
/// is below one in a million for 2,000 uploads.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
