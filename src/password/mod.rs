/// Password policy engine
///
/// Hashing and verification use bcrypt at cost 12. The work is CPU-heavy
/// on purpose; both operations run on the blocking pool so a login burst
/// cannot stall unrelated requests on the async executor.
use crate::error::{CampusError, CampusResult};

/// Work factor for all new hashes
const BCRYPT_COST: u32 = 12;

/// Number of prior hashes retained for reuse checks
pub const HISTORY_DEPTH: usize = 5;

/// Why a candidate password was rejected by the reuse check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReuseRejection {
    SameAsCurrent,
    RecentlyUsed,
}

impl ReuseRejection {
    pub fn message(&self) -> &'static str {
        match self {
            ReuseRejection::SameAsCurrent => {
                "New password cannot be the same as your current password"
            }
            ReuseRejection::RecentlyUsed => "You cannot reuse a recent password",
        }
    }
}

/// Hash a plaintext password. The plaintext is never logged.
pub async fn hash(plaintext: &str) -> CampusResult<String> {
    let plaintext = plaintext.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, BCRYPT_COST))
        .await
        .map_err(|e| CampusError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| CampusError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a plaintext against a stored hash
pub async fn verify(plaintext: &str, hash: &str) -> CampusResult<bool> {
    let plaintext = plaintext.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
        .await
        .map_err(|e| CampusError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(|e| CampusError::Internal(format!("Password verification failed: {}", e)))
}

/// Check a candidate password against the current hash and the retained
/// history. An empty history is fine (legacy and freshly created accounts).
pub async fn check_reuse(
    candidate: &str,
    current_hash: &str,
    history: &[String],
) -> CampusResult<Option<ReuseRejection>> {
    if verify(candidate, current_hash).await? {
        return Ok(Some(ReuseRejection::SameAsCurrent));
    }

    for old_hash in history {
        if verify(candidate, old_hash).await? {
            return Ok(Some(ReuseRejection::RecentlyUsed));
        }
    }

    Ok(None)
}

/// Prepend the outgoing hash to the history, truncating to HISTORY_DEPTH
pub fn rotate_history(history: &[String], outgoing_hash: &str) -> Vec<String> {
    let mut rotated = Vec::with_capacity(HISTORY_DEPTH);
    rotated.push(outgoing_hash.to_string());
    rotated.extend(history.iter().take(HISTORY_DEPTH - 1).cloned());
    rotated
}
