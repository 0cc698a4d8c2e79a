use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub tokens: i32,
    pub purchased_tokens: i32,
    pub subscription_tier: Option<String>,
    pub is_admin: bool,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub banned_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Spendable balance: plan tokens plus purchased tokens
    pub fn total_tokens(&self) -> i64 {
        i64::from(self.tokens) + i64::from(self.purchased_tokens)
    }

    pub fn tier(&self) -> &str {
        self.subscription_tier.as_deref().unwrap_or("free")
    }
}

/// The slice of a profile returned by ban/unban
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanStatus {
    pub id: Uuid,
    pub email: Option<String>,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub banned_at: Option<DateTime<Utc>>,
}

impl From<&Profile> for BanStatus {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            banned: profile.banned,
            ban_reason: profile.ban_reason.clone(),
            banned_at: profile.banned_at,
        }
    }
}
