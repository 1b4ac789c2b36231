use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};

/*
 *  ids that need to be quickly generated from multiple threads.  player and
 *  trade ids are uuids; game codes are short human-typable strings.
 */

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::from_entropy());
}

pub fn get_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

//  6 uppercase alphanumerics.  I, O, 0 and 1 are excluded because players
//  read these codes to each other over voice chat.
static CODE_ALPHABET: Lazy<Vec<char>> =
    Lazy::new(|| "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".chars().collect());

pub const GAME_CODE_LEN: usize = 6;

pub fn new_game_code() -> String {
    RNG.with(|rng| {
        let mut rng = rng.borrow_mut();
        (0..GAME_CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())])
            .collect()
    })
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
