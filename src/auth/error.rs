use thiserror::Error;

/// Categorized token rejections. At the upgrade boundary all of these map to
/// a 403 response; the category is kept for logging and for callers that
/// want to distinguish a stale session from a forged one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is not in the expected payload.signature form")]
    Malformed,
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token expired at {expired_at} (unix seconds)")]
    Expired { expired_at: u64 },
}
