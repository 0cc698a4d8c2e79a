use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use super::uploads::{extract_uploads, is_upload_id, AssetKind, Upload};
use crate::database::models::Generation;
use crate::database::{DatabaseError, GenerationStore};
use crate::generation::catalogue::{is_image_tool, is_video_tool, IMAGE_TOOLS, VIDEO_TOOLS};
use crate::generation::output::{base_generation_id, expand_outputs, normalize_output};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetTab {
    #[default]
    Generations,
    Uploads,
    Favorites,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Image,
    Video,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetQuery {
    #[serde(default)]
    pub tab: AssetTab,
    #[serde(default)]
    pub filter_type: TypeFilter,
    /// Restricts which tool types are fetched at all
    #[serde(default)]
    pub asset_type: TypeFilter,
    pub search: Option<String>,
    pub page: Option<i64>,
}

impl AssetQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// One entry in the library: an expanded generation output or an upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetItem {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub tool_type: Option<String>,
    pub tool_name: Option<String>,
    pub generation_name: Option<String>,
    pub input_data: Option<Value>,
    pub is_upload: bool,
    pub is_favorite: bool,
    pub original_generation_id: Option<Uuid>,
    pub used_in: Option<String>,
    pub used_for: Option<String>,
    pub output_index: Option<usize>,
    pub output_total: Option<usize>,
}

impl AssetItem {
    fn from_upload(upload: Upload) -> Self {
        Self {
            id: upload.id,
            url: upload.url,
            kind: upload.kind,
            name: upload.name,
            created_at: upload.created_at,
            tool_type: None,
            tool_name: None,
            generation_name: None,
            input_data: None,
            is_upload: true,
            is_favorite: upload.is_favorite,
            original_generation_id: Some(upload.original_generation_id),
            used_in: upload.used_in,
            used_for: upload.used_for,
            output_index: None,
            output_total: None,
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        let prompt = self
            .input_data
            .as_ref()
            .and_then(|d| d.get("prompt"))
            .and_then(Value::as_str);
        [
            self.generation_name.as_deref(),
            Some(self.name.as_str()),
            prompt,
            self.tool_name.as_deref(),
            self.used_in.as_deref(),
            self.used_for.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }

    fn matches_type(&self, filter: TypeFilter) -> bool {
        match (filter, self.is_upload) {
            (TypeFilter::All, _) => true,
            (TypeFilter::Image, true) => self.kind == AssetKind::Image,
            (TypeFilter::Video, true) => self.kind == AssetKind::Video,
            (TypeFilter::Image, false) => self.tool_type.as_deref().map_or(false, is_image_tool),
            (TypeFilter::Video, false) => self.tool_type.as_deref().map_or(false, is_video_tool),
        }
    }

    /// Payload handed to a tool page when the user picks this asset as input
    pub fn selection(&self) -> SelectionPayload {
        SelectionPayload {
            url: self.url.clone(),
            kind: self.kind,
            name: self.name.clone(),
            created: self.created_at,
            metadata: self.input_data.clone().unwrap_or_else(|| json!({})),
            is_upload: self.is_upload,
            is_generation: !self.is_upload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub name: String,
    pub created: DateTime<Utc>,
    pub metadata: Value,
    pub is_upload: bool,
    pub is_generation: bool,
}

pub fn generation_kind(tool_type: &str) -> AssetKind {
    if is_image_tool(tool_type) {
        AssetKind::Image
    } else {
        AssetKind::Video
    }
}

/// Every output of a generation as a library item
pub fn generation_items(generation: &Generation) -> Vec<AssetItem> {
    let urls = normalize_output(generation.output_file_url.as_deref());
    let id = generation.id.to_string();
    expand_outputs(&id, generation.display_name(), &urls)
        .into_iter()
        .map(|view| AssetItem {
            id: view.id,
            url: view.url,
            kind: generation_kind(&generation.tool_type),
            name: view.name,
            created_at: generation.created_at,
            tool_type: Some(generation.tool_type.clone()),
            tool_name: generation.tool_name.clone(),
            generation_name: generation.generation_name.clone(),
            input_data: generation.input_data.clone(),
            is_upload: false,
            is_favorite: generation.is_favorite,
            original_generation_id: None,
            used_in: None,
            used_for: None,
            output_index: (view.total > 1).then_some(view.index),
            output_total: (view.total > 1).then_some(view.total),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetPage {
    pub items: Vec<AssetItem>,
    pub page: i64,
    pub has_more: bool,
    pub upload_count: usize,
}

/// Favorited upload ids per user. Uploads have no table of their own, so these live in memory.
#[derive(Debug, Clone, Default)]
pub struct UploadFavorites {
    inner: Arc<Mutex<HashMap<Uuid, HashSet<String>>>>,
}

impl UploadFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag and return the new state
    pub fn toggle(&self, user_id: Uuid, upload_id: &str) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let set = map.entry(user_id).or_default();
        if set.remove(upload_id) {
            false
        } else {
            set.insert(upload_id.to_string());
            true
        }
    }

    pub fn is_favorite(&self, user_id: Uuid, upload_id: &str) -> bool {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&user_id).map_or(false, |set| set.contains(upload_id))
    }
}

/// Tool types fetched for an `asset_type` restriction
fn tool_types_for(asset_type: TypeFilter) -> Option<Vec<String>> {
    let list = match asset_type {
        TypeFilter::All => return None,
        TypeFilter::Image => IMAGE_TOOLS,
        TypeFilter::Video => VIDEO_TOOLS,
    };
    Some(list.iter().map(|t| t.to_string()).collect())
}

/// One page of the asset library for a user
pub async fn list_assets(
    store: &dyn GenerationStore,
    favorites: &UploadFavorites,
    user_id: Uuid,
    query: &AssetQuery,
    per_page: i64,
) -> Result<AssetPage, DatabaseError> {
    let page = query.page();
    let offset = (page - 1).saturating_mul(per_page);

    // one extra row tells us whether another page exists
    let mut rows = store
        .list_completed(user_id, tool_types_for(query.asset_type), offset, per_page + 1)
        .await?;
    let has_more = rows.len() as i64 > per_page;
    rows.truncate(per_page as usize);

    let generations: Vec<AssetItem> = rows.iter().flat_map(generation_items).collect();

    let uploads: Vec<AssetItem> = if query.tab == AssetTab::Generations {
        Vec::new()
    } else {
        let history = store.list_history(user_id).await?;
        extract_uploads(&history)
            .into_iter()
            .map(|mut upload| {
                upload.is_favorite = favorites.is_favorite(user_id, &upload.id);
                AssetItem::from_upload(upload)
            })
            .collect()
    };
    let upload_count = uploads.len();

    let mut items: Vec<AssetItem> = match query.tab {
        AssetTab::Generations => generations,
        AssetTab::Uploads => uploads,
        AssetTab::Favorites => generations
            .into_iter()
            .filter(|g| g.is_favorite)
            .chain(uploads.into_iter().filter(|u| u.is_favorite))
            .collect(),
    };

    if let Some(needle) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = needle.to_lowercase();
        items.retain(|item| item.matches_search(&needle));
    }
    items.retain(|item| item.matches_type(query.filter_type));

    debug!(
        "Asset page {} for {}: {} items (tab={:?}, has_more={})",
        page,
        user_id,
        items.len(),
        query.tab,
        has_more
    );

    Ok(AssetPage {
        items,
        page,
        has_more,
        upload_count,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteToggle {
    pub id: String,
    pub is_favorite: bool,
}

/// Toggle a library item's favorite flag. Upload ids are recognised before expanded
/// generation ids are reduced to their base.
pub async fn toggle_favorite(
    store: &dyn GenerationStore,
    favorites: &UploadFavorites,
    user_id: Uuid,
    asset_id: &str,
) -> Result<FavoriteToggle, DatabaseError> {
    if is_upload_id(asset_id) {
        return Ok(FavoriteToggle {
            id: asset_id.to_string(),
            is_favorite: favorites.toggle(user_id, asset_id),
        });
    }

    let base = base_generation_id(asset_id);
    let id = Uuid::parse_str(base)
        .map_err(|_| DatabaseError::NotFound(format!("Asset {} not found", asset_id)))?;
    let current = store
        .get(id, user_id)
        .await?
        .filter(|g| g.deleted_at.is_none())
        .ok_or_else(|| DatabaseError::NotFound("Generation not found".to_string()))?;

    let updated = store.set_favorite(id, user_id, !current.is_favorite).await?;
    Ok(FavoriteToggle {
        id: updated.id.to_string(),
        is_favorite: updated.is_favorite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(tool_type: &str, output: &str) -> Generation {
        Generation {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            tool_type: tool_type.into(),
            tool_name: Some("FLUX Kontext".into()),
            generation_name: Some("castle".into()),
            status: "completed".into(),
            input_data: Some(json!({"prompt": "A Castle at dusk"})),
            output_file_url: Some(output.into()),
            thumbnail_url: None,
            metadata: None,
            tokens_used: Some(4),
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
            error_message: None,
            deleted_at: None,
            is_favorite: false,
            showcased: false,
        }
    }

    #[test]
    fn multi_output_image_generation_expands() {
        let g = completed("fal_flux_kontext", r#"{"urls":["https://a","https://b"]}"#);
        let items = generation_items(&g);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, format!("{}_0", g.id));
        assert_eq!(items[1].id, format!("{}_1", g.id));
        assert!(items.iter().all(|i| i.kind == AssetKind::Image));
        assert!(items.iter().all(|i| i.matches_type(TypeFilter::Image)));
        assert!(!items.iter().any(|i| i.matches_type(TypeFilter::Video)));
        assert_eq!(items[1].name, "castle (2/2)");
    }

    #[test]
    fn search_covers_prompt_case_insensitively() {
        let items = generation_items(&completed("fal_flux_kontext", "https://a"));
        assert!(items[0].matches_search("castle at"));
        assert!(items[0].matches_search("flux"));
        assert!(!items[0].matches_search("ocean"));
    }

    #[test]
    fn selection_payload_marks_origin() {
        let items = generation_items(&completed("fal_ltxv", "https://v.mp4"));
        let selection = items[0].selection();
        assert!(selection.is_generation);
        assert_eq!(selection.kind, AssetKind::Video);
        let body = serde_json::to_value(&selection).unwrap();
        assert_eq!(body["isUpload"], false);
        assert_eq!(body["metadata"]["prompt"], "A Castle at dusk");
    }

    #[test]
    fn upload_favorites_toggle_per_user() {
        let favorites = UploadFavorites::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(favorites.toggle(alice, "upload_abc"));
        assert!(favorites.is_favorite(alice, "upload_abc"));
        assert!(!favorites.is_favorite(bob, "upload_abc"));
        assert!(!favorites.toggle(alice, "upload_abc"));
    }

    #[test]
    fn query_defaults() {
        let query: AssetQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.tab, AssetTab::Generations);
        assert_eq!(query.filter_type, TypeFilter::All);
        assert_eq!(query.page(), 1);
    }
}
