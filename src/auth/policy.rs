use uuid::Uuid;

use super::AuthUser;
use crate::config::AdminConfig;
use crate::database::models::Profile;

/// Who counts as an administrator. One policy serves every admin surface.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    user_ids: Vec<Uuid>,
    emails: Vec<String>,
}

impl AdminPolicy {
    pub fn new(user_ids: Vec<Uuid>, emails: Vec<String>) -> Self {
        Self {
            user_ids,
            emails: emails.into_iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Unparseable ids in the config are skipped with a warning
    pub fn from_config(config: &AdminConfig) -> Self {
        let user_ids = config
            .user_ids
            .iter()
            .filter_map(|raw| match Uuid::parse_str(raw.trim()) {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!("Ignoring invalid admin user id '{}'", raw);
                    None
                }
            })
            .collect();
        Self::new(user_ids, config.emails.clone())
    }

    fn email_listed(&self, email: Option<&str>) -> bool {
        email.map_or(false, |e| self.emails.contains(&e.to_lowercase()))
    }

    /// Allowlisted id, allowlisted email (token or metadata), or the profile's admin flag
    pub fn is_admin(&self, user: &AuthUser, profile: Option<&Profile>) -> bool {
        self.user_ids.contains(&user.user_id)
            || self.email_listed(user.email.as_deref())
            || self.email_listed(user.metadata_email.as_deref())
            || profile.map_or(false, |p| p.is_admin)
    }

    /// Allowlist check only; callers that have no profile at hand use this first
    pub fn is_allowlisted(&self, user: &AuthUser) -> bool {
        self.is_admin(user, None)
    }
}
