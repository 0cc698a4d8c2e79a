use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::assets::UploadFavorites;
use crate::auth::AdminPolicy;
use crate::config::AppConfig;
use crate::database::{
    DatabaseError, DatabaseManager, GenerationStore, LoraStore, PgGenerationStore, PgLoraStore,
    PgProfileStore, ProfileStore,
};
use crate::generation::realtime::RealtimeHub;
use crate::providers::{
    DocParser, FalGateway, HttpFalGateway, HttpSceneGateway, OpenAiDocParser, SceneGateway,
};

/// Everything a handler needs, built once at startup and cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generations: Arc<dyn GenerationStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub loras: Arc<dyn LoraStore>,
    pub fal: Arc<dyn FalGateway>,
    pub scenes: Arc<dyn SceneGateway>,
    pub doc_parser: Arc<dyn DocParser>,
    pub realtime: RealtimeHub,
    pub admin: Arc<AdminPolicy>,
    pub upload_favorites: UploadFavorites,
    /// Present when backed by Postgres; `/health` pings it
    pub pool: Option<PgPool>,
}

impl AppState {
    /// Postgres stores and HTTP provider clients from configuration
    pub fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        let providers = &config.providers;

        let fal = HttpFalGateway::new(
            providers.fal_queue_url.clone(),
            providers.fal_api_key.clone(),
            Duration::from_secs(providers.submit_timeout_secs),
        );
        let scenes = HttpSceneGateway::new(
            providers.railway_api_url.clone(),
            providers.railway_api_key.clone(),
            Duration::from_secs(providers.railway_timeout_secs),
        );
        let doc_parser =
            OpenAiDocParser::new(providers.openai_api_url.clone(), providers.openai_api_key.clone());

        Self::builder(config)
            .generations(Arc::new(PgGenerationStore::new(pool.clone())))
            .profiles(Arc::new(PgProfileStore::new(pool.clone())))
            .loras(Arc::new(PgLoraStore::new(pool.clone())))
            .fal(Arc::new(fal))
            .scenes(Arc::new(scenes))
            .doc_parser(Arc::new(doc_parser))
            .pool(pool)
            .build()
    }

    pub fn builder(config: AppConfig) -> AppStateBuilder {
        AppStateBuilder::new(config)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.config.providers.submit_timeout_secs)
    }
}

/// Assembles an `AppState` from parts; tests swap in fakes here
pub struct AppStateBuilder {
    config: AppConfig,
    generations: Option<Arc<dyn GenerationStore>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    loras: Option<Arc<dyn LoraStore>>,
    fal: Option<Arc<dyn FalGateway>>,
    scenes: Option<Arc<dyn SceneGateway>>,
    doc_parser: Option<Arc<dyn DocParser>>,
    realtime: RealtimeHub,
    pool: Option<PgPool>,
}

impl AppStateBuilder {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            generations: None,
            profiles: None,
            loras: None,
            fal: None,
            scenes: None,
            doc_parser: None,
            realtime: RealtimeHub::default(),
            pool: None,
        }
    }

    pub fn generations(mut self, store: Arc<dyn GenerationStore>) -> Self {
        self.generations = Some(store);
        self
    }

    pub fn profiles(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(store);
        self
    }

    pub fn loras(mut self, store: Arc<dyn LoraStore>) -> Self {
        self.loras = Some(store);
        self
    }

    pub fn fal(mut self, gateway: Arc<dyn FalGateway>) -> Self {
        self.fal = Some(gateway);
        self
    }

    pub fn scenes(mut self, gateway: Arc<dyn SceneGateway>) -> Self {
        self.scenes = Some(gateway);
        self
    }

    pub fn doc_parser(mut self, parser: Arc<dyn DocParser>) -> Self {
        self.doc_parser = Some(parser);
        self
    }

    pub fn realtime(mut self, hub: RealtimeHub) -> Self {
        self.realtime = hub;
        self
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn build(self) -> Result<AppState, DatabaseError> {
        let admin = AdminPolicy::from_config(&self.config.admin);
        Ok(AppState {
            generations: self.generations.ok_or(DatabaseError::ConfigMissing("generation store"))?,
            profiles: self.profiles.ok_or(DatabaseError::ConfigMissing("profile store"))?,
            loras: self.loras.ok_or(DatabaseError::ConfigMissing("LoRA store"))?,
            fal: self.fal.ok_or(DatabaseError::ConfigMissing("FAL gateway"))?,
            scenes: self.scenes.ok_or(DatabaseError::ConfigMissing("scene gateway"))?,
            doc_parser: self.doc_parser.ok_or(DatabaseError::ConfigMissing("documentation parser"))?,
            realtime: self.realtime,
            admin: Arc::new(admin),
            upload_favorites: UploadFavorites::new(),
            pool: self.pool,
            config: Arc::new(self.config),
        })
    }
}
