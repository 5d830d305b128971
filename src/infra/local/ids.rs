use chrono::Utc;
use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 7;

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// `<millis>-<7 base36 chars>`. Unlikely to collide in a single-process store, not guaranteed unique.
pub fn generate_id() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), random_suffix())
}

pub fn generate_user_id() -> String {
    format!("u_{}_{}", Utc::now().timestamp_millis(), random_suffix())
}
