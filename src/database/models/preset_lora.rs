use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PresetLora {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub path: String,
    pub weight_name: Option<String>,
    pub tool_types: Vec<String>,
    pub tier_access: Vec<String>,
    pub default_scale: f64,
    pub trigger_words: Vec<String>,
    pub category: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PresetLora {
    /// Tool match accepts the wildcard "both"; higher tiers inherit lower-tier presets
    /// (business ⊇ pro ⊇ free).
    pub fn available_to(&self, tool_type: &str, tier: &str) -> bool {
        let tool_match = self.tool_types.iter().any(|t| t == tool_type || t == "both");
        let has = |t: &str| self.tier_access.iter().any(|a| a == t);
        let tier_match = has(tier)
            || (tier == "business" && (has("pro") || has("free")))
            || (tier == "pro" && has("free"));
        self.is_active && tool_match && tier_match
    }
}

/// Create/update payload for the admin LoRA manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetLoraInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub path: String,
    #[serde(default)]
    pub weight_name: Option<String>,
    #[serde(default)]
    pub tool_types: Vec<String>,
    #[serde(default)]
    pub tier_access: Vec<String>,
    #[serde(default = "default_scale")]
    pub default_scale: f64,
    #[serde(default)]
    pub trigger_words: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_scale() -> f64 {
    1.0
}

fn default_active() -> bool {
    true
}

impl PresetLoraInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if self.path.trim().is_empty() {
            return Err("Path is required".to_string());
        }
        if !(0.0..=4.0).contains(&self.default_scale) {
            return Err("default_scale must be between 0 and 4".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lora(tool_types: &[&str], tiers: &[&str]) -> PresetLora {
        PresetLora {
            id: Uuid::new_v4(),
            title: "Film grain".into(),
            description: None,
            path: "https://huggingface.co/x/film-grain".into(),
            weight_name: None,
            tool_types: tool_types.iter().map(|s| s.to_string()).collect(),
            tier_access: tiers.iter().map(|s| s.to_string()).collect(),
            default_scale: 1.0,
            trigger_words: vec![],
            category: Some("style".into()),
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn higher_tiers_inherit_lower_presets() {
        let free = lora(&["fal_flux_kontext_lora"], &["free"]);
        assert!(free.available_to("fal_flux_kontext_lora", "free"));
        assert!(free.available_to("fal_flux_kontext_lora", "pro"));
        assert!(free.available_to("fal_flux_kontext_lora", "business"));

        let pro = lora(&["fal_flux_kontext_lora"], &["pro"]);
        assert!(!pro.available_to("fal_flux_kontext_lora", "free"));
        assert!(pro.available_to("fal_flux_kontext_lora", "business"));
    }

    #[test]
    fn both_matches_any_tool() {
        let l = lora(&["both"], &["free"]);
        assert!(l.available_to("fal_wan_v22_img2video_lora", "free"));
        let mut inactive = l.clone();
        inactive.is_active = false;
        assert!(!inactive.available_to("fal_wan_v22_img2video_lora", "free"));
    }

    #[test]
    fn input_requires_title_and_path() {
        let input: PresetLoraInput =
            serde_json::from_value(serde_json::json!({"title": " ", "path": "p"})).unwrap();
        assert!(input.validate().is_err());
        let input: PresetLoraInput =
            serde_json::from_value(serde_json::json!({"title": "t", "path": "p"})).unwrap();
        assert_eq!(input.default_scale, 1.0);
        assert!(input.is_active);
        assert!(input.validate().is_ok());
    }
}
