use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Image,
    Video,
    Audio,
    Enhancement,
    Ai,
}

/// Token price of a single generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCost {
    Fixed(i32),
    /// Billed per second of input media; the base covers one second
    PerSecond(i32),
}

impl TokenCost {
    pub fn base(&self) -> i32 {
        match self {
            TokenCost::Fixed(n) | TokenCost::PerSecond(n) => *n,
        }
    }
}

impl Serialize for TokenCost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TokenCost::Fixed(n) => serializer.serialize_i32(*n),
            TokenCost::PerSecond(n) => serializer.serialize_str(&format!("{}/sec", n)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub tool_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ToolCategory,
    pub tokens_required: TokenCost,
    pub route: Option<&'static str>,
    /// Edge function that submits this tool's jobs, if one is served here
    pub function: Option<&'static str>,
}

macro_rules! tool {
    ($tt:expr, $name:expr, $desc:expr, $cat:ident, $cost:expr, $route:expr, $func:expr) => {
        ToolInfo {
            tool_type: $tt,
            name: $name,
            description: $desc,
            category: ToolCategory::$cat,
            tokens_required: $cost,
            route: $route,
            function: $func,
        }
    };
}

use TokenCost::{Fixed, PerSecond};

pub static AI_TOOLS: &[ToolInfo] = &[
    tool!("fal_flux_redux", "FLUX Redux Pro", "Create image variations with advanced IP-Adapter control", Image, Fixed(8), Some("/flux-redux"), Some("fal-flux-redux")),
    tool!("fal_flux_kontext", "FLUX Kontext", "Generate images with context-aware composition and spatial understanding", Image, Fixed(4), Some("/flux-kontext"), Some("fal-flux-kontext")),
    tool!("fal_minimax_hailuo", "Minimax Hailuo Video", "Transform images into cinematic videos", Video, Fixed(7), Some("/minimax-hailuo"), Some("fal-minimax-hailuo")),
    tool!("fal_wan_pro", "WAN Pro", "Image-to-video with WAN Pro", Video, Fixed(150), Some("/wan-pro"), Some("fal-wan-pro")),
    tool!("wan22_pro", "WAN 2.2 Professional", "Latest model with 1080P support and improved motion stability", Video, Fixed(50), Some("/wan22-pro"), None),
    tool!("fal_video_prompt", "Video Prompt Generator", "AI-powered prompt generation for video creation", Ai, Fixed(5), None, None),
    tool!("fal_veo2", "Kling Pro Video", "Professional-grade image-to-video with Kling v2.1", Video, Fixed(25), Some("/veo2-video"), None),
    tool!("fal_flux_kontext_lora", "FLUX Kontext LoRA", "Advanced text-to-image with LoRA fine-tuning", Image, Fixed(12), Some("/flux-kontext-lora"), Some("fal-flux-kontext-lora")),
    tool!("fal_video_upscaler", "AI Video Upscaler", "Enhance video quality with AI-powered upscaling", Enhancement, Fixed(39), Some("/fal-video-upscaler"), Some("fal-video-upscaler")),
    tool!("fal_ltxv", "LTXV Video Creator", "Advanced image-to-video generation with extensive customization", Video, Fixed(25), Some("/ltxv-video"), Some("fal-ltxv")),
    tool!("fal_bria_bg_remove", "BRIA Background Remover", "Professional AI-powered background removal", Image, Fixed(5), Some("/bria-bg-remove"), Some("fal-bria-bg-remove")),
    tool!("ai_scene_gen", "AI Scene Maker", "Transform images into cinematic video sequences with advanced AI scene generation", Video, Fixed(100), Some("/ai-scene-gen"), Some("ai-scene-gen")),
    tool!("fal_hidream_i1", "HiDream I1 Dev", "Advanced text-to-image generation with HiDream I1 development model", Image, Fixed(8), Some("/hidream-i1"), Some("fal-hidream-i1")),
    tool!("fal_seedance_pro", "Seedance Pro Video", "Professional image-to-video generation with Seedance Pro technology", Video, Fixed(120), Some("/seedance-pro"), Some("fal-seedance-pro")),
    tool!("fal_wan_v22_a14b", "WAN v2.2-a14b Video", "Advanced image-to-video generation with WAN v2.2-a14b model and interpolation", Video, Fixed(20), Some("/wan-v22-a14b"), None),
    tool!("fal_cassetteai_music", "CassetteAI Music Generator", "Generate original music tracks with AI - from chill beats to epic orchestral pieces", Audio, Fixed(15), Some("/cassetteai-music"), Some("fal-cassetteai-music")),
    tool!("fal_mmaudio_v2", "MMAudio v2", "Advanced text-to-audio generation with high-quality synthesis and precise control", Audio, Fixed(5), Some("/mmaudio-v2"), Some("fal-mmaudio-v2")),
    tool!("fal_mmaudio_video2", "MMAudio Video2Audio", "Generate synchronized audio for videos - perfect soundtracks that match your content", Audio, Fixed(5), Some("/mmaudio-video2"), Some("fal-mmaudio-video2")),
    tool!("fal_flux_kontext_max_multi", "FLUX Kontext Max Multi", "Advanced multi-image composition with FLUX Pro Kontext Max", Image, Fixed(15), Some("/flux-kontext-max-multi"), Some("fal-flux-kontext-max-multi")),
    tool!("fal_wan_v22_text2video_lora", "WAN v2.2 Text2Video LoRA", "Advanced text-to-video generation with WAN v2.2-a14b model and LoRA fine-tuning support", Video, Fixed(25), Some("/wan-v22-text2video-lora"), None),
    tool!("fal_omnihuman", "Omnihuman Talking Avatar", "Create realistic talking avatars from images and audio - bring photos to life with speech", Video, PerSecond(30), Some("/omnihuman"), None),
    tool!("fal_wan_v22_img2video_lora", "WAN v2.2 Img2Video LoRA", "Advanced image-to-video generation with WAN v2.2-a14b model and LoRA fine-tuning support", Video, Fixed(30), Some("/wan-v22-img2video-lora"), Some("fal-wan-v22-img2video-lora")),
    tool!("fal_wan_v22_video2video", "WAN v2.2 Video2Video", "Transform existing videos with AI - change style, content, and motion while preserving structure", Video, Fixed(25), Some("/wan-v22-video2video"), Some("fal-wan-v22-video2video")),
    tool!("fal_veo3_fast", "VEO3 Fast", "Fast image-to-video generation with Google's VEO3 model", Video, Fixed(288), Some("/veo3-fast"), Some("fal-veo3-fast")),
    tool!("fal_veo3", "VEO3 Standard", "High-quality image-to-video generation with Google's VEO3 model", Video, Fixed(534), Some("/veo3-standard"), None),
    tool!("fal_wan22_s2v", "Speech to Video Creator", "Transform speech audio into dynamic videos - create talking avatars and animated scenes from voice recordings", Video, Fixed(35), Some("/wan-22-s2v"), Some("fal-wan22-s2v")),
    tool!("fal_gemini_flash_image_edit", "Gemini 2.5 Flash Image Edit", "Advanced AI image editing with Google's Gemini 2.5 Flash model", Image, Fixed(8), Some("/gemini-flash-image-edit"), Some("fal-gemini-flash-image-edit")),
];

/// Tool types whose outputs are images in the asset library
pub static IMAGE_TOOLS: &[&str] = &[
    "fal_flux_kontext",
    "fal_flux_kontext_lora",
    "fal_flux_kontext_max_multi",
    "fal_hidream_i1",
    "fal_bria_bg_remove",
    "fal_gemini_flash_image_edit",
    "fal_qwen_image",
    "fal_qwen_image_to_image",
];

pub static VIDEO_TOOLS: &[&str] = &[
    "fal_minimax_hailuo",
    "fal_kling_pro",
    "fal_ltxv",
    "fal_seedance_pro",
    "fal_wan_v22_img2video_lora",
    "fal_wan_v22_text2video_lora",
    "fal_wan_v22_video2video",
    "fal_veo3_fast",
    "fal_veo3",
    "fal_wan22_s2v",
    "fal_omnihuman",
    "ai_scene_gen",
];

pub fn find_tool(tool_type: &str) -> Option<&'static ToolInfo> {
    AI_TOOLS.iter().find(|t| t.tool_type == tool_type)
}

pub fn find_tool_by_function(function: &str) -> Option<&'static ToolInfo> {
    AI_TOOLS.iter().find(|t| t.function == Some(function))
}

pub fn is_image_tool(tool_type: &str) -> bool {
    IMAGE_TOOLS.contains(&tool_type)
}

pub fn is_video_tool(tool_type: &str) -> bool {
    VIDEO_TOOLS.contains(&tool_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FAL_TOOLS;

    #[test]
    fn tool_types_are_unique() {
        for (i, a) in AI_TOOLS.iter().enumerate() {
            assert!(
                AI_TOOLS.iter().skip(i + 1).all(|b| b.tool_type != a.tool_type),
                "duplicate {}",
                a.tool_type
            );
        }
    }

    #[test]
    fn every_fal_submitter_has_a_catalogue_entry() {
        for spec in FAL_TOOLS {
            let tool = find_tool(spec.tool_type).expect(spec.tool_type);
            assert_eq!(tool.function, Some(spec.function));
        }
    }

    #[test]
    fn costs_match_the_price_list() {
        assert_eq!(find_tool("fal_flux_kontext").unwrap().tokens_required, TokenCost::Fixed(4));
        assert_eq!(find_tool("fal_veo3").unwrap().tokens_required.base(), 534);
        assert_eq!(
            serde_json::to_value(find_tool("fal_omnihuman").unwrap().tokens_required).unwrap(),
            serde_json::json!("30/sec")
        );
        assert!(find_tool("gen_01").is_none());
    }

    #[test]
    fn function_lookup_finds_the_owning_tool() {
        assert_eq!(find_tool_by_function("fal-flux-kontext").unwrap().tool_type, "fal_flux_kontext");
        assert_eq!(find_tool_by_function("fal-wan22-s2v").unwrap().tool_type, "fal_wan22_s2v");
        assert!(find_tool_by_function("fal-webhook").is_none());
    }

    #[test]
    fn image_and_video_tables_are_disjoint() {
        assert!(IMAGE_TOOLS.iter().all(|t| !is_video_tool(t)));
        assert!(is_image_tool("fal_hidream_i1"));
        assert!(!is_image_tool("fal_ltxv"));
    }
}
