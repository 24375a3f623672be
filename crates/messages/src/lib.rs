//! Message types and randomized message production.
//!
//! Provides the [`Message`] record that flows through the simulator and a
//! generator that builds pools of synthetic messages with randomized phone
//! numbers and bodies. Generation is pure and stateless: it draws from a
//! caller-supplied RNG and is consumed once at startup.

use rand::Rng;

/// Number of digits in a generated phone number (standard US length).
pub const PHONE_NUMBER_LEN: usize = 10;

/// Maximum body length for a generated message.
pub const MAX_BODY_LEN: usize = 100;

const ASCII_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// A single SMS message tracked through the simulation.
///
/// Created by the generator with zeroed bookkeeping fields; a sender worker
/// stamps `send_time_secs` and `sent` when it processes the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Destination phone number as a fixed-length digit string.
    pub phone_number: String,

    /// Message body, 1-100 alphabetic characters.
    pub body: String,

    /// Seconds the simulated send took. Zero until processed.
    pub send_time_secs: u64,

    /// Whether the simulated send succeeded. False until processed.
    pub sent: bool,
}

/// Generate a single message with a random phone number and body.
pub fn generate_message<R: Rng + ?Sized>(rng: &mut R) -> Message {
    let phone_number: String = (0..PHONE_NUMBER_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect();

    let body_len = rng.gen_range(1..=MAX_BODY_LEN);
    let body: String = (0..body_len)
        .map(|_| char::from(ASCII_LETTERS[rng.gen_range(0..ASCII_LETTERS.len())]))
        .collect();

    Message {
        phone_number,
        body,
        send_time_secs: 0,
        sent: false,
    }
}

/// Generate a pool of `count` messages.
///
/// The pool is handed to the sender manager as the initial work queue.
pub fn generate_pool<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
) -> Result<Vec<Message>, MessageError> {
    if count == 0 {
        return Err(MessageError::InvalidCount(count));
    }

    Ok((0..count).map(|_| generate_message(rng)).collect())
}

/// Errors during message generation.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("msg_count cannot be {0}, must be 1 or greater")]
    InvalidCount(usize),
}
