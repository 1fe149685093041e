mod cache;
mod credential;
mod minter;
mod signer;

pub use cache::{TOKEN_REFRESH_MARGIN_SECS, TokenCache};
pub use credential::ServiceAccountCredential;
pub use minter::{ASSERTION_LIFETIME_SECS, JWT_BEARER_GRANT, MintToken, ServiceAccountMinter};
pub use signer::sign;

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Source of the current instant for assertion claims and token expiry.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
