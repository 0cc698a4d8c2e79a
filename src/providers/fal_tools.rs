//! Per-tool FAL queue submitters: endpoint, metadata labels and the request builder that
//! turns the client's camelCase body into FAL's snake_case parameters with defaults and clamps.

use serde_json::{json, Map, Value};

pub type ParamBuilder = fn(&ToolInput<'_>) -> Result<Value, String>;

pub struct FalToolSpec {
    /// Edge function name, e.g. `fal-ltxv`
    pub function: &'static str,
    /// Catalogue tool type, e.g. `fal_ltxv`
    pub tool_type: &'static str,
    pub endpoint: &'static str,
    pub model: &'static str,
    /// Storage folder label written to metadata; some tools record none
    pub storage_type: Option<&'static str>,
    pub estimated_time: &'static str,
    pub queued_message: &'static str,
    pub build_params: ParamBuilder,
}

pub static FAL_TOOLS: &[FalToolSpec] = &[
    FalToolSpec {
        function: "fal-ltxv",
        tool_type: "fal_ltxv",
        endpoint: "fal-ai/ltxv-13b-098-distilled/image-to-video",
        model: "ltxv-13b-098-distilled",
        storage_type: Some("ltxv-13b"),
        estimated_time: "3-8 minutes",
        queued_message: "LTXV video generation queued successfully. Webhook will update when complete.",
        build_params: ltxv_params,
    },
    FalToolSpec {
        function: "fal-wan-pro",
        tool_type: "fal_wan_pro",
        endpoint: "fal-ai/wan-pro/image-to-video",
        model: "wan-pro",
        storage_type: Some("wan-pro"),
        estimated_time: "3-7 minutes",
        queued_message: "WAN Pro video generation queued successfully. Webhook will update when complete.",
        build_params: wan_pro_params,
    },
    FalToolSpec {
        function: "fal-hidream-i1",
        tool_type: "fal_hidream_i1",
        endpoint: "fal-ai/hidream-i1-dev",
        model: "fal-ai/hidream-i1-dev",
        storage_type: Some("hidream-i1"),
        estimated_time: "20-40 seconds",
        queued_message: "HiDream I1 image generation queued successfully. Webhook will update when complete.",
        build_params: hidream_params,
    },
    FalToolSpec {
        function: "fal-seedance-pro",
        tool_type: "fal_seedance_pro",
        endpoint: "fal-ai/bytedance/seedance/v1/pro/image-to-video",
        model: "seedance-pro-v1",
        storage_type: None,
        estimated_time: "3-8 minutes",
        queued_message: "Seedance Pro video generation queued successfully. Webhook will update when complete.",
        build_params: seedance_params,
    },
    FalToolSpec {
        function: "fal-veo3-fast",
        tool_type: "fal_veo3_fast",
        endpoint: "fal-ai/veo3/fast",
        model: "fal-ai/veo3/fast",
        storage_type: Some("veo3-fast-video"),
        estimated_time: "30 seconds to 2 minutes",
        queued_message: "VEO3 Fast video generation queued successfully. Webhook will update when complete.",
        build_params: veo3_fast_params,
    },
    FalToolSpec {
        function: "fal-mmaudio-v2",
        tool_type: "fal_mmaudio_v2",
        endpoint: "fal-ai/mmaudio-v2/text-to-audio",
        model: "fal-ai/mmaudio-v2/text-to-audio",
        storage_type: Some("mmaudio-v2"),
        estimated_time: "30-60 seconds",
        queued_message: "MMAudio v2 audio generation queued successfully. Webhook will update when complete.",
        build_params: mmaudio_params,
    },
    FalToolSpec {
        function: "fal-video-upscaler",
        tool_type: "fal_video_upscaler",
        endpoint: "fal-ai/video-upscaler",
        model: "fal-ai/video-upscaler",
        storage_type: Some("fal-upscaler"),
        estimated_time: "10-20 minutes",
        queued_message: "Video upscaling queued successfully. Webhook will update when complete.",
        build_params: upscaler_params,
    },
    FalToolSpec {
        function: "fal-flux-kontext",
        tool_type: "fal_flux_kontext",
        endpoint: "fal-ai/flux-kontext/dev",
        model: "flux-kontext-dev",
        storage_type: Some("flux-kontext"),
        estimated_time: "20-40 seconds",
        queued_message: "FLUX Kontext image generation queued successfully. Webhook will update when complete.",
        build_params: flux_kontext_params,
    },
    FalToolSpec {
        function: "fal-flux-kontext-lora",
        tool_type: "fal_flux_kontext_lora",
        endpoint: "fal-ai/flux-kontext-lora/text-to-image",
        model: "fal-ai/flux-kontext-lora/text-to-image",
        storage_type: Some("flux-kontext-lora"),
        estimated_time: "30-60 seconds",
        queued_message: "FLUX Kontext LoRA image generation queued successfully. Webhook will update when complete.",
        build_params: flux_kontext_lora_params,
    },
    FalToolSpec {
        function: "fal-flux-kontext-max-multi",
        tool_type: "fal_flux_kontext_max_multi",
        endpoint: "fal-ai/flux-pro/kontext/max/multi",
        model: "fal-ai/flux-pro/kontext/max/multi",
        storage_type: Some("flux-kontext-max-multi"),
        estimated_time: "30-60 seconds",
        queued_message: "FLUX Kontext Max Multi image generation queued successfully. Webhook will update when complete.",
        build_params: flux_kontext_max_multi_params,
    },
    FalToolSpec {
        function: "fal-flux-redux",
        tool_type: "fal_flux_redux",
        endpoint: "fal-ai/flux-pro/v1.1/redux",
        model: "flux-redux-v1.1",
        storage_type: Some("flux-redux"),
        estimated_time: "20-40 seconds",
        queued_message: "FLUX Redux image generation queued successfully. Webhook will update when complete.",
        build_params: flux_redux_params,
    },
    FalToolSpec {
        function: "fal-bria-bg-remove",
        tool_type: "fal_bria_bg_remove",
        endpoint: "fal-ai/bria/background/remove",
        model: "bria-background-remover",
        storage_type: Some("bria-bg-remove"),
        estimated_time: "10-20 seconds",
        queued_message: "Background removal queued successfully. Webhook will update when complete.",
        build_params: bria_params,
    },
    FalToolSpec {
        function: "fal-gemini-flash-image-edit",
        tool_type: "fal_gemini_flash_image_edit",
        endpoint: "fal-ai/gemini-25-flash-image/edit",
        model: "gemini-25-flash-image-edit",
        storage_type: Some("gemini-flash-edit"),
        estimated_time: "30-60 seconds",
        queued_message: "Gemini 2.5 Flash Image Edit queued successfully. Webhook will update when complete.",
        build_params: gemini_edit_params,
    },
    FalToolSpec {
        function: "fal-minimax-hailuo",
        tool_type: "fal_minimax_hailuo",
        endpoint: "fal-ai/minimax/hailuo-02/standard/image-to-video",
        model: "minimax-hailuo-02",
        storage_type: Some("minimax-hailuo"),
        estimated_time: "3-6 minutes",
        queued_message: "Minimax Hailuo video generation queued successfully. Webhook will update when complete.",
        build_params: minimax_params,
    },
    FalToolSpec {
        function: "fal-cassetteai-music",
        tool_type: "fal_cassetteai_music",
        endpoint: "CassetteAI/music-generator",
        model: "CassetteAI-music-generator",
        storage_type: Some("cassetteai-music"),
        estimated_time: "30-90 seconds",
        queued_message: "CassetteAI music generation queued successfully. Webhook will update when complete.",
        build_params: cassette_params,
    },
    FalToolSpec {
        function: "fal-mmaudio-video2",
        tool_type: "fal_mmaudio_video2",
        endpoint: "fal-ai/mmaudio-v2",
        model: "mmaudio-v2-video",
        storage_type: Some("mmaudio-video2"),
        estimated_time: "30-60 seconds",
        queued_message: "MMAudio video-to-audio generation queued successfully. Webhook will update when complete.",
        build_params: mmaudio_video_params,
    },
    FalToolSpec {
        function: "fal-wan-v22-img2video-lora",
        tool_type: "fal_wan_v22_img2video_lora",
        endpoint: "fal-ai/wan/v2.2-a14b/image-to-video/lora",
        model: "wan-v2.2-a14b-img2video-lora",
        storage_type: Some("wan-v22-img2video-lora"),
        estimated_time: "1-3 minutes",
        queued_message: "WAN v2.2 Img2Video LoRA generation queued successfully",
        build_params: wan_img2video_lora_params,
    },
    FalToolSpec {
        function: "fal-wan-v22-video2video",
        tool_type: "fal_wan_v22_video2video",
        endpoint: "fal-ai/wan/v2.2-a14b/video-to-video",
        model: "wan-v2.2-a14b-video2video",
        storage_type: Some("wan-v22-video2video"),
        estimated_time: "2-5 minutes",
        queued_message: "WAN v2.2 Video2Video generation queued successfully",
        build_params: wan_video2video_params,
    },
    FalToolSpec {
        function: "fal-wan22-s2v",
        tool_type: "fal_wan22_s2v",
        endpoint: "fal-ai/wan-22-s2v",
        model: "wan-22-s2v",
        storage_type: Some("wan22-s2v"),
        estimated_time: "3-8 minutes",
        queued_message: "WAN 22 S2V video generation queued successfully. Webhook will update when complete.",
        build_params: wan_s2v_params,
    },
];

pub fn find_fal_tool(function: &str) -> Option<&'static FalToolSpec> {
    FAL_TOOLS.iter().find(|t| t.function == function)
}

/// Read-only view over a loosely typed JSON request body
pub struct ToolInput<'a>(pub &'a Value);

impl<'a> ToolInput<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Non-blank string, trimmed
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn required_text(&self, key: &str, message: &str) -> Result<String, String> {
        self.text(key).ok_or_else(|| message.to_string())
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Seed only when strictly positive; -1 and 0 mean "random"
    pub fn positive_seed(&self, key: &str) -> Option<i64> {
        Some(self.i64_or(key, -1)).filter(|s| *s > 0)
    }

    /// String or number rendered as a string; FAL wants some numeric knobs quoted
    pub fn string_or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => default.to_string(),
        }
    }

    /// Non-blank strings of an array; absent or malformed reads as empty
    pub fn text_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.get(key)
    }
}

fn insert_opt(params: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(v) = value {
        params.insert(key.to_string(), v.into());
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn ltxv_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let image_url = input.required_text("imageUrl", "Missing required parameters")?;
    let prompt = input.required_text("prompt", "Missing required parameters")?;

    let mut params = object(json!({
        "prompt": prompt,
        "image_url": image_url,
        "prompt_extend": false,
        "resolution": input.str_or("resolution", "720p"),
        "aspect_ratio": input.str_or("aspectRatio", "auto"),
        "num_frames": input.i64_or("numFrames", 121),
        "first_pass_num_inference_steps": input.i64_or("firstPassNumInferenceSteps", 8),
        "second_pass_num_inference_steps": input.i64_or("secondPassNumInferenceSteps", 8),
        "second_pass_skip_initial_steps": input.i64_or("secondPassSkipInitialSteps", 5),
        "frame_rate": input.i64_or("frameRate", 24),
        "expand_prompt": input.bool_or("expandPrompt", false),
        "reverse_video": input.bool_or("reverseVideo", false),
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
        "enable_detail_pass": input.bool_or("enableDetailPass", false),
        "temporal_adain_factor": input.f64_or("temporalAdainFactor", 0.5),
        "tone_map_compression_ratio": input.f64_or("toneMapCompressionRatio", 0.0),
        "constant_rate_factor": input.i64_or("constantRateFactor", 29),
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negativePrompt"));
    let loras = input
        .raw("loras")
        .and_then(Value::as_array)
        .filter(|l| !l.is_empty())
        .cloned();
    insert_opt(&mut params, "loras", loras);
    Ok(Value::Object(params))
}

fn wan_pro_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let image_url = input.required_text("imageUrl", "Image URL is required")?;
    let prompt = input.required_text("prompt", "Prompt is required")?;

    let mut params = object(json!({
        "image_url": image_url,
        "prompt": prompt,
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
    }));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn hidream_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let prompt = input.required_text("prompt", "Prompt is required")?;
    let size = ToolInput(input.raw("imageSize").unwrap_or(&Value::Null));

    let mut params = object(json!({
        "prompt": prompt,
        "image_size": {
            "width": Some(size.i64_or("width", 0)).filter(|w| *w > 0).unwrap_or(1024),
            "height": Some(size.i64_or("height", 0)).filter(|h| *h > 0).unwrap_or(1024),
        },
        "num_inference_steps": input.i64_or("numInferenceSteps", 28).clamp(10, 50),
        "num_images": input.i64_or("numImages", 1).clamp(1, 4),
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
        "output_format": input.str_or("outputFormat", "png"),
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negativePrompt"));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn seedance_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let image_url = input.required_text("imageUrl", "Missing required parameters")?;
    let prompt = input.required_text("prompt", "Missing required parameters")?;

    let mut params = object(json!({
        "image_url": image_url,
        "prompt": prompt,
        "prompt_extend": false,
        "resolution": input.str_or("resolution", "1080p"),
        "duration": input.string_or("duration", "5"),
        "camera_fixed": input.bool_or("cameraFixed", false),
    }));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn veo3_fast_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let prompt = input.required_text("prompt", "Prompt is required")?;

    let mut params = object(json!({
        "prompt": prompt,
        "aspect_ratio": input.str_or("aspectRatio", "16:9"),
        "duration": input.str_or("duration", "8s"),
        "enhance_prompt": input.bool_or("enhancePrompt", true),
        "resolution": input.str_or("resolution", "720p"),
        "generate_audio": input.bool_or("generateAudio", true),
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negativePrompt"));
    Ok(Value::Object(params))
}

// The audio tool takes snake_case keys from the client
fn mmaudio_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let prompt = input.required_text("prompt", "Audio prompt is required")?;
    let duration = input.f64_or("duration", 8.0);
    if !(1.0..=30.0).contains(&duration) {
        return Err("Duration must be between 1 and 30 seconds".to_string());
    }

    let mut params = object(json!({
        "prompt": prompt,
        "duration": duration.clamp(1.0, 30.0),
        "cfg_strength": input.f64_or("cfg_strength", 4.5).clamp(1.0, 10.0),
        "num_steps": input.i64_or("num_steps", 25).clamp(10, 100),
        "seed": input.i64_or("seed", 34710),
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negative_prompt"));
    Ok(Value::Object(params))
}

fn upscaler_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let video_url = input.required_text("videoUrl", "Missing required parameters")?;
    let scale = input.i64_or("scale", 2);
    if scale != 2 && scale != 4 {
        return Err("Scale must be 2 or 4".to_string());
    }
    Ok(json!({
        "video_url": video_url,
        "prompt_extend": false,
        "scale": scale,
    }))
}

fn flux_kontext_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let image_url = input.required_text("imageUrl", "Image URL is required")?;
    let prompt = input.required_text("prompt", "Prompt is required")?;

    let mut params = object(json!({
        "image_url": image_url,
        "prompt": prompt,
        "guidance_scale": input.f64_or("guidanceScale", 7.5).clamp(1.0, 20.0),
        "num_images": input.i64_or("numImages", 1).clamp(1, 4),
        "num_inference_steps": input.i64_or("steps", 30).clamp(10, 50),
        "enable_safety_checker": true,
        "output_format": "jpeg",
        "resolution_mode": input.str_or("resolutionMode", "1:1"),
        "acceleration": "none",
    }));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn flux_kontext_lora_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let prompt = input.required_text("prompt", "Prompt is required")?;
    let output_format = input.str_or("outputFormat", "jpeg");

    let mut params = object(json!({
        "prompt": prompt,
        "guidance_scale": input.f64_or("guidanceScale", 7.5).clamp(1.0, 20.0),
        "num_images": input.i64_or("numImages", 1).clamp(1, 4),
        "num_inference_steps": input.i64_or("steps", 30).clamp(10, 50),
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
        "output_format": output_format,
        "image_size": input.raw("imageSize").cloned().unwrap_or_else(|| json!("square_hd")),
        "expand_prompt": true,
        "format": "jpeg",
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negativePrompt"));
    if let Some(lora_url) = input.text("loraUrl") {
        params.insert("lora_url".into(), json!(lora_url));
        params.insert("lora_scale".into(), json!(input.f64_or("loraScale", 1.0).clamp(0.0, 2.0)));
    }
    if output_format == "jpeg" {
        params.insert("output_quality".into(), json!(input.i64_or("outputQuality", 95).clamp(60, 100)));
    }
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn flux_kontext_max_multi_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let prompt = input.required_text("prompt", "Prompt is required")?;
    let image_urls = input.text_list("imageUrls");
    if image_urls.is_empty() {
        return Err("At least one image URL is required".to_string());
    }
    if image_urls.len() > 10 {
        return Err("Maximum 10 images allowed".to_string());
    }

    let mut params = object(json!({
        "prompt": prompt,
        "image_urls": image_urls,
        "guidance_scale": input.f64_or("guidanceScale", 10.5).clamp(1.0, 20.0),
        "num_images": input.i64_or("numImages", 1).clamp(1, 4),
        "output_format": "png",
        "safety_tolerance": input.string_or("safetyTolerance", "2"),
        "aspect_ratio": input.str_or("aspectRatio", "1:1"),
    }));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn flux_redux_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let image_url = input.required_text("guideImageUrl", "Guide image URL is required")?;
    let size = ToolInput(input.raw("imageSize").unwrap_or(&Value::Null));

    let mut params = object(json!({
        "image_url": image_url,
        "prompt": input.text("prompt").unwrap_or_default(),
        "guidance_scale": input.f64_or("guidanceScale", 7.5).clamp(1.0, 20.0),
        "num_images": input.i64_or("numImages", 1).clamp(1, 4),
        "image_size": {
            "width": size.i64_or("width", 1024).clamp(256, 2048),
            "height": size.i64_or("height", 1024).clamp(256, 2048),
        },
        "ip_adapter_weight": input.f64_or("ipAdapterWeight", 0.5).clamp(0.0, 1.0),
        "num_inference_steps": input.i64_or("steps", 30).clamp(10, 50),
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
        "safety_tolerance": input.string_or("safetyTolerance", "2"),
        "output_format": "png",
    }));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn bria_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let image_url = input.required_text("imageUrl", "Image URL is required")?;
    Ok(json!({ "image_url": image_url }))
}

fn gemini_edit_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let prompt = input.text("prompt");
    let image_urls = input.text_list("imageUrls");
    let prompt = match prompt {
        Some(prompt) if !image_urls.is_empty() => prompt,
        _ => {
            return Err(
                "Missing required parameters: generationId, prompt, and imageUrls are required".to_string(),
            )
        }
    };
    if image_urls.len() > 10 {
        return Err("Maximum 10 images allowed".to_string());
    }
    let num_images = input.i64_or("numImages", 1);
    if !(1..=4).contains(&num_images) {
        return Err("Number of images must be between 1 and 4".to_string());
    }

    Ok(json!({
        "prompt": prompt,
        "image_urls": image_urls,
        "num_images": num_images,
    }))
}

fn minimax_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let image_url = input.required_text("imageUrl", "Image URL is required")?;
    let prompt = input.required_text("prompt", "Motion prompt is required")?;

    Ok(json!({
        "image_url": image_url,
        "prompt": prompt,
        "duration": input.string_or("duration", "6"),
        "prompt_optimizer": input.bool_or("promptOptimizer", true),
    }))
}

fn cassette_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let prompt = input.required_text("prompt", "Music prompt is required")?;
    let duration = input.i64_or("duration", 30);
    if !(10..=180).contains(&duration) {
        return Err("Duration must be between 10 and 180 seconds".to_string());
    }
    Ok(json!({ "prompt": prompt, "duration": duration }))
}

// Like the text-to-audio tool, keys arrive in snake_case
fn mmaudio_video_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let video_url = input.required_text("video_url", "Video URL is required")?;
    let prompt = input.required_text("prompt", "Audio prompt is required")?;
    let duration = input.f64_or("duration", 8.0);
    if !(1.0..=30.0).contains(&duration) {
        return Err("Duration must be between 1 and 30 seconds".to_string());
    }

    let mut params = object(json!({
        "video_url": video_url,
        "prompt": prompt,
        "duration": duration,
        "cfg_strength": input.f64_or("cfg_strength", 4.5).clamp(1.0, 10.0),
        "num_steps": input.i64_or("num_steps", 25).clamp(10, 100),
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negative_prompt"));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn wan_img2video_lora_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let (image_url, prompt) = match (input.text("imageUrl"), input.text("prompt")) {
        (Some(image_url), Some(prompt)) => (image_url, prompt),
        _ => {
            return Err(
                "Missing required parameters: generationId, imageUrl, and prompt are required".to_string(),
            )
        }
    };

    let mut loras = input
        .raw("loras")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if let Some(path) = input.text("loraUrl") {
        loras.push(json!({ "path": path, "scale": input.f64_or("loraScale", 1.0) }));
    }

    let mut params = object(json!({
        "image_url": image_url,
        "prompt": prompt,
        "num_frames": input.i64_or("numFrames", 81),
        "frames_per_second": input.i64_or("framesPerSecond", 16),
        "aspect_ratio": input.str_or("aspectRatio", "16:9"),
        "num_inference_steps": input.i64_or("numInferenceSteps", 27),
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
        "enable_prompt_expansion": input.bool_or("enablePromptExpansion", false),
        "acceleration": input.str_or("acceleration", "none"),
        "guidance_scale": input.f64_or("guidanceScale", 3.5),
        "guidance_scale_2": input.f64_or("guidanceScale2", 4.0),
        "shift": input.f64_or("shift", 5.0),
        "interpolator_model": input.str_or("interpolatorModel", "film"),
        "num_interpolated_frames": input.i64_or("numInterpolatedFrames", 1),
        "adjust_fps_for_interpolation": input.bool_or("adjustFpsForInterpolation", true),
        "resolution": input.str_or("resolution", "1080P"),
        "prompt_extend": input.bool_or("promptExtend", true),
        "loras": loras,
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negativePrompt"));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

fn wan_video2video_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let (video_url, prompt) = match (input.text("videoUrl"), input.text("prompt")) {
        (Some(video_url), Some(prompt)) => (video_url, prompt),
        _ => {
            return Err(
                "Missing required parameters: generationId, videoUrl, and prompt are required".to_string(),
            )
        }
    };

    let mut params = object(json!({
        "video_url": video_url,
        "prompt": prompt,
        "strength": input.f64_or("strength", 1.0).clamp(0.0, 1.0),
        "num_frames": input.i64_or("numFrames", 121).clamp(81, 121),
        "frames_per_second": input.i64_or("framesPerSecond", 60).clamp(4, 60),
        "resolution": input.str_or("resolution", "720p"),
        "aspect_ratio": input.str_or("aspectRatio", "auto"),
        "num_inference_steps": input.i64_or("numInferenceSteps", 40).clamp(2, 40),
        "enable_safety_checker": input.bool_or("enableSafetyChecker", true),
        "enable_prompt_expansion": input.bool_or("enablePromptExpansion", true),
        "acceleration": input.str_or("acceleration", "none"),
        "guidance_scale": input.f64_or("guidanceScale", 10.0).clamp(1.0, 10.0),
        "guidance_scale_2": input.f64_or("guidanceScale2", 10.0).clamp(1.0, 10.0),
        "shift": input.f64_or("shift", 10.0).clamp(1.0, 10.0),
        "interpolator_model": input.str_or("interpolatorModel", "film"),
        "num_interpolated_frames": input.i64_or("numInterpolatedFrames", 4),
        "adjust_fps_for_interpolation": input.bool_or("adjustFpsForInterpolation", true),
        "resample_fps": input.bool_or("resampleFps", true),
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negativePrompt"));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

// Speech-to-video also takes snake_case keys
fn wan_s2v_params(input: &ToolInput<'_>) -> Result<Value, String> {
    let (prompt, image_url, audio_url) = match (
        input.text("prompt"),
        input.text("image_url"),
        input.text("audio_url"),
    ) {
        (Some(prompt), Some(image_url), Some(audio_url)) => (prompt, image_url, audio_url),
        _ => {
            return Err(
                "Missing required parameters: generationId, prompt, image_url, and audio_url are required"
                    .to_string(),
            )
        }
    };

    let mut params = object(json!({
        "prompt": prompt,
        "image_url": image_url,
        "audio_url": audio_url,
        "num_frames": input.i64_or("num_frames", 92).clamp(60, 120),
        "frames_per_second": input.i64_or("frames_per_second", 22).clamp(16, 30),
        "resolution": input.str_or("resolution", "480p"),
        "num_inference_steps": input.i64_or("num_inference_steps", 30).clamp(20, 50),
        "enable_safety_checker": input.bool_or("enable_safety_checker", true),
        "guidance_scale": input.f64_or("guidance_scale", 4.4).clamp(1.0, 10.0),
        "shift": input.f64_or("shift", 6.0).clamp(1.0, 10.0),
    }));
    insert_opt(&mut params, "negative_prompt", input.text("negative_prompt"));
    insert_opt(&mut params, "seed", input.positive_seed("seed"));
    Ok(Value::Object(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(function: &str, body: Value) -> Result<Value, String> {
        let tool = find_fal_tool(function).unwrap();
        (tool.build_params)(&ToolInput(&body))
    }

    #[test]
    fn every_tool_is_reachable_by_function_name() {
        for tool in FAL_TOOLS {
            assert!(find_fal_tool(tool.function).is_some());
        }
        assert!(find_fal_tool("fal-unknown").is_none());
    }

    #[test]
    fn ltxv_applies_defaults() {
        let params = build("fal-ltxv", json!({"imageUrl": "https://x/a.png", "prompt": " waves "})).unwrap();
        assert_eq!(params["prompt"], "waves");
        assert_eq!(params["num_frames"], 121);
        assert_eq!(params["resolution"], "720p");
        assert_eq!(params["constant_rate_factor"], 29);
        assert!(params.get("loras").is_none());
        assert!(params.get("negative_prompt").is_none());
    }

    #[test]
    fn ltxv_requires_image_and_prompt() {
        assert_eq!(
            build("fal-ltxv", json!({"prompt": "x"})).unwrap_err(),
            "Missing required parameters"
        );
        assert!(build("fal-ltxv", json!({"imageUrl": "u", "prompt": "  "})).is_err());
    }

    #[test]
    fn hidream_clamps_and_sizes() {
        let params = build(
            "fal-hidream-i1",
            json!({"prompt": "cat", "numInferenceSteps": 200, "numImages": 0, "seed": -1}),
        )
        .unwrap();
        assert_eq!(params["num_inference_steps"], 50);
        assert_eq!(params["num_images"], 1);
        assert_eq!(params["image_size"]["width"], 1024);
        assert!(params.get("seed").is_none());
    }

    #[test]
    fn seed_included_only_when_positive() {
        let params = build(
            "fal-wan-pro",
            json!({"imageUrl": "u", "prompt": "p", "seed": 42}),
        )
        .unwrap();
        assert_eq!(params["seed"], 42);
    }

    #[test]
    fn seedance_duration_is_a_string() {
        let params = build(
            "fal-seedance-pro",
            json!({"imageUrl": "u", "prompt": "p", "duration": 10}),
        )
        .unwrap();
        assert_eq!(params["duration"], "10");
    }

    #[test]
    fn mmaudio_rejects_out_of_range_duration() {
        assert_eq!(
            build("fal-mmaudio-v2", json!({"prompt": "rain", "duration": 45})).unwrap_err(),
            "Duration must be between 1 and 30 seconds"
        );
        let params = build("fal-mmaudio-v2", json!({"prompt": "rain", "num_steps": 500})).unwrap();
        assert_eq!(params["num_steps"], 100);
        assert_eq!(params["seed"], 34710);
    }

    #[test]
    fn upscaler_scale_must_be_two_or_four() {
        assert!(build("fal-video-upscaler", json!({"videoUrl": "v", "scale": 3})).is_err());
        let params = build("fal-video-upscaler", json!({"videoUrl": "v"})).unwrap();
        assert_eq!(params["scale"], 2);
    }

    #[test]
    fn flux_kontext_needs_an_image_and_clamps_steps() {
        assert_eq!(
            build("fal-flux-kontext", json!({"prompt": "p"})).unwrap_err(),
            "Image URL is required"
        );
        let params = build(
            "fal-flux-kontext",
            json!({"imageUrl": "u", "prompt": "p", "steps": 3, "guidanceScale": 40}),
        )
        .unwrap();
        assert_eq!(params["num_inference_steps"], 10);
        assert_eq!(params["guidance_scale"], 20.0);
        assert_eq!(params["resolution_mode"], "1:1");
    }

    #[test]
    fn kontext_lora_adds_lora_and_quality_only_when_asked() {
        let params = build("fal-flux-kontext-lora", json!({"prompt": "p"})).unwrap();
        assert_eq!(params["image_size"], "square_hd");
        assert_eq!(params["output_quality"], 95);
        assert!(params.get("lora_url").is_none());

        let params = build(
            "fal-flux-kontext-lora",
            json!({"prompt": "p", "loraUrl": "https://x/l.safetensors", "loraScale": 5, "outputFormat": "png"}),
        )
        .unwrap();
        assert_eq!(params["lora_scale"], 2.0);
        assert!(params.get("output_quality").is_none());
    }

    #[test]
    fn multi_image_tools_bound_the_image_count() {
        let eleven: Vec<String> = (0..11).map(|i| format!("https://x/{}.png", i)).collect();
        assert_eq!(
            build("fal-flux-kontext-max-multi", json!({"prompt": "p", "imageUrls": []})).unwrap_err(),
            "At least one image URL is required"
        );
        assert_eq!(
            build("fal-flux-kontext-max-multi", json!({"prompt": "p", "imageUrls": eleven})).unwrap_err(),
            "Maximum 10 images allowed"
        );
        assert_eq!(
            build("fal-gemini-flash-image-edit", json!({"prompt": "p", "imageUrls": ["u"], "numImages": 6}))
                .unwrap_err(),
            "Number of images must be between 1 and 4"
        );

        let params = build(
            "fal-flux-kontext-max-multi",
            json!({"prompt": "p", "imageUrls": ["a", "b"], "safetyTolerance": 4}),
        )
        .unwrap();
        assert_eq!(params["image_urls"], json!(["a", "b"]));
        assert_eq!(params["safety_tolerance"], "4");
    }

    #[test]
    fn redux_sizes_are_clamped() {
        let params = build(
            "fal-flux-redux",
            json!({"guideImageUrl": "u", "imageSize": {"width": 100, "height": 4096}}),
        )
        .unwrap();
        assert_eq!(params["image_size"], json!({"width": 256, "height": 2048}));
        assert_eq!(params["prompt"], "");
        assert!(build("fal-flux-redux", json!({})).is_err());
    }

    #[test]
    fn music_and_video_audio_check_duration() {
        assert_eq!(
            build("fal-cassetteai-music", json!({"prompt": "lofi", "duration": 5})).unwrap_err(),
            "Duration must be between 10 and 180 seconds"
        );
        assert_eq!(
            build("fal-mmaudio-video2", json!({"prompt": "rain"})).unwrap_err(),
            "Video URL is required"
        );
        let params = build("fal-mmaudio-video2", json!({"video_url": "v", "prompt": "rain"})).unwrap();
        assert_eq!(params["duration"], 8.0);
        assert_eq!(params["num_steps"], 25);
    }

    #[test]
    fn minimax_quotes_duration() {
        let params = build(
            "fal-minimax-hailuo",
            json!({"imageUrl": "u", "prompt": "p", "duration": 10}),
        )
        .unwrap();
        assert_eq!(params["duration"], "10");
        assert_eq!(params["prompt_optimizer"], true);
    }

    #[test]
    fn wan_img2video_lora_folds_a_single_lora_into_the_list() {
        let params = build(
            "fal-wan-v22-img2video-lora",
            json!({"imageUrl": "u", "prompt": "p", "loraUrl": "https://x/l.safetensors", "loraScale": 0.8}),
        )
        .unwrap();
        assert_eq!(params["loras"], json!([{"path": "https://x/l.safetensors", "scale": 0.8}]));
        assert_eq!(params["guidance_scale_2"], 4.0);
        assert_eq!(params["resolution"], "1080P");
    }

    #[test]
    fn wan_video_tools_clamp_their_knobs() {
        let params = build(
            "fal-wan-v22-video2video",
            json!({"videoUrl": "v", "prompt": "p", "numFrames": 10, "framesPerSecond": 120}),
        )
        .unwrap();
        assert_eq!(params["num_frames"], 81);
        assert_eq!(params["frames_per_second"], 60);

        assert!(build("fal-wan22-s2v", json!({"prompt": "p", "image_url": "i"})).is_err());
        let params = build(
            "fal-wan22-s2v",
            json!({"prompt": "p", "image_url": "i", "audio_url": "a", "num_frames": 500}),
        )
        .unwrap();
        assert_eq!(params["num_frames"], 120);
        assert_eq!(params["guidance_scale"], 4.4);
    }
}
