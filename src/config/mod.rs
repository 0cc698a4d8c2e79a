use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub supabase: SupabaseConfig,
    pub providers: ProviderConfig,
    pub admin: AdminConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Supabase project settings. The JWT secret verifies access tokens issued by Supabase Auth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub jwt_secret: String,
    #[serde(skip_serializing)]
    pub service_role_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing)]
    pub fal_api_key: Option<String>,
    pub fal_queue_url: String,
    pub railway_api_url: String,
    #[serde(skip_serializing)]
    pub railway_api_key: String,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    /// Upper bound on a single submission round trip. Expiry never cancels the upstream job.
    pub submit_timeout_secs: u64,
    pub railway_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub user_ids: Vec<String>,
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    pub items_per_page: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("IMGMOTION_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = split_list(&v);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Supabase overrides
        if let Ok(v) = env::var("SUPABASE_URL").or_else(|_| env::var("VITE_SUPABASE_URL")) {
            self.supabase.url = v;
        }
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            self.supabase.jwt_secret = v;
        }
        if let Ok(v) = env::var("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_role_key = v;
        }

        // Provider overrides
        if let Ok(v) = env::var("FAL_API_KEY") {
            self.providers.fal_api_key = Some(v).filter(|k| !k.is_empty());
        }
        if let Ok(v) = env::var("FAL_QUEUE_URL") {
            self.providers.fal_queue_url = v;
        }
        if let Ok(v) = env::var("RAILWAY_API_URL") {
            self.providers.railway_api_url = v;
        }
        if let Ok(v) = env::var("RAILWAY_API_KEY") {
            self.providers.railway_api_key = v;
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.providers.openai_api_key = Some(v).filter(|k| !k.is_empty());
        }
        if let Ok(v) = env::var("OPENAI_API_URL") {
            self.providers.openai_api_url = v;
        }
        if let Ok(v) = env::var("SUBMIT_TIMEOUT_SECS") {
            self.providers.submit_timeout_secs = v.parse().unwrap_or(self.providers.submit_timeout_secs);
        }
        if let Ok(v) = env::var("RAILWAY_TIMEOUT_SECS") {
            self.providers.railway_timeout_secs = v.parse().unwrap_or(self.providers.railway_timeout_secs);
        }

        // Admin overrides
        if let Ok(v) = env::var("ADMIN_USER_IDS") {
            self.admin.user_ids = split_list(&v);
        }
        if let Ok(v) = env::var("ADMIN_EMAILS") {
            self.admin.emails = split_list(&v);
        }

        // Asset library overrides
        if let Ok(v) = env::var("ASSETS_ITEMS_PER_PAGE") {
            self.assets.items_per_page = v.parse().unwrap_or(self.assets.items_per_page);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            supabase: Self::default_supabase(),
            providers: ProviderConfig {
                submit_timeout_secs: 30,
                ..Self::default_providers()
            },
            admin: Self::default_admin(),
            assets: AssetsConfig { items_per_page: 20 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["https://staging.imgmotionmagic.com".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            supabase: Self::default_supabase(),
            providers: Self::default_providers(),
            admin: Self::default_admin(),
            assets: AssetsConfig { items_per_page: 20 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["https://imgmotionmagic.com".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            supabase: Self::default_supabase(),
            providers: ProviderConfig {
                submit_timeout_secs: 15,
                ..Self::default_providers()
            },
            admin: AdminConfig {
                user_ids: Vec::new(),
                emails: Vec::new(),
            },
            assets: AssetsConfig { items_per_page: 20 },
        }
    }

    fn default_supabase() -> SupabaseConfig {
        SupabaseConfig {
            url: String::new(),
            jwt_secret: String::new(),
            service_role_key: String::new(),
        }
    }

    fn default_providers() -> ProviderConfig {
        ProviderConfig {
            fal_api_key: None,
            fal_queue_url: "https://queue.fal.run".to_string(),
            railway_api_url: "https://ai-scene-maker-production.up.railway.app".to_string(),
            railway_api_key: "railway-api-key".to_string(),
            openai_api_key: None,
            openai_api_url: "https://api.openai.com".to_string(),
            submit_timeout_secs: 20,
            railway_timeout_secs: 15,
        }
    }

    // Production starts empty and must be configured through ADMIN_USER_IDS / ADMIN_EMAILS.
    fn default_admin() -> AdminConfig {
        AdminConfig {
            user_ids: vec!["991e17a6-c1a8-4496-8b28-cc83341c028a".to_string()],
            emails: vec!["jim@1busyguy.com".to_string()],
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.assets.items_per_page, 20);
        assert_eq!(config.providers.railway_timeout_secs, 15);
        assert_eq!(config.providers.fal_queue_url, "https://queue.fal.run");
        assert_eq!(config.admin.emails, vec!["jim@1busyguy.com".to_string()]);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert!(config.admin.user_ids.is_empty());
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn splits_comma_lists() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
