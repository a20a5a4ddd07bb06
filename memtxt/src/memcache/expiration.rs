use crate::cache::cache::ExpirationType;

/// Thirty days in seconds. Larger exptime values are absolute Unix time.
pub const RELATIVE_EXPIRATION_LIMIT: i64 = 60 * 60 * 24 * 30;

/// Never expires
pub const NO_EXPIRATION: ExpirationType = 0;

/// Turns protocol exptime into an absolute Unix timestamp.
///
/// The protocol overloads one integer with two meanings:
/// - `exptime > 30 days` is an absolute Unix time,
/// - `0 < exptime <= 30 days` is an offset from `now`,
/// - `exptime <= 0` never expires.
pub fn get_expiration(exptime: i64, now: u64) -> ExpirationType {
    match exptime {
        exptime if exptime > RELATIVE_EXPIRATION_LIMIT => exptime as u64,
        exptime if exptime > 0 => now.saturating_add(exptime as u64),
        _ => NO_EXPIRATION,
    }
}
