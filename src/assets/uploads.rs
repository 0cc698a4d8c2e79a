use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::models::Generation;

pub const UPLOAD_ID_PREFIX: &str = "upload_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

/// A user-supplied input file, recovered from the `input_data` of past generations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Upload {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub used_in: Option<String>,
    pub used_for: Option<String>,
    pub is_upload: bool,
    pub original_generation_id: Uuid,
    pub is_favorite: bool,
}

/// Input fields that carry uploaded files
const UPLOAD_FIELDS: &[(&str, AssetKind, &str)] = &[
    ("imageUrl", AssetKind::Image, "Upload from"),
    ("videoUrl", AssetKind::Video, "Upload from"),
    ("referenceImageUrl", AssetKind::Image, "Reference from"),
];

/// Stable id for an uploaded URL
pub fn upload_id(url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("{}{}", UPLOAD_ID_PREFIX, &digest[..10])
}

pub fn is_upload_id(id: &str) -> bool {
    id.starts_with(UPLOAD_ID_PREFIX)
}

/// Uploads across a user's history. The first row to mention a URL owns it, so `history`
/// should be newest first; deleted rows are ignored.
pub fn extract_uploads(history: &[Generation]) -> Vec<Upload> {
    let mut seen = HashSet::new();
    let mut uploads = Vec::new();

    for generation in history.iter().filter(|g| g.deleted_at.is_none()) {
        let source = generation
            .generation_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(generation.tool_name.as_deref())
            .unwrap_or("Unknown");

        for (field, kind, label) in UPLOAD_FIELDS {
            let url = match generation.input_str(field) {
                Some(url) if !url.trim().is_empty() => url,
                _ => continue,
            };
            if !seen.insert(url.to_string()) {
                continue;
            }
            uploads.push(Upload {
                id: upload_id(url),
                url: url.to_string(),
                kind: *kind,
                name: format!("{} {}", label, source),
                created_at: generation.created_at,
                used_in: generation.tool_name.clone(),
                used_for: generation.generation_name.clone(),
                is_upload: true,
                original_generation_id: generation.id,
                is_favorite: false,
            });
        }
    }

    uploads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    uploads
}
