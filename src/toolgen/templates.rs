//! Code-text outputs of the tool generator. Nothing here is executed or written to disk.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;

use super::identifiers::ToolIdentifiers;
use super::params::{ParamType, ToolParameter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolConfig {
    pub name: String,
    pub description: String,
    pub category: String,
    pub fal_endpoint: String,
    pub base_token_cost: i32,
    pub estimated_time: String,
    pub tool_icon: String,
    pub parameters: Vec<ToolParameter>,
    pub enable_safety_scanning: bool,
    pub enable_file_upload: bool,
    pub token_cost_formula: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: "image".to_string(),
            fal_endpoint: String::new(),
            base_token_cost: 10,
            estimated_time: "30-60 seconds".to_string(),
            tool_icon: "Wand2".to_string(),
            parameters: Vec::new(),
            enable_safety_scanning: true,
            enable_file_upload: false,
            token_cost_formula: "baseTokenCost".to_string(),
        }
    }
}

impl ToolConfig {
    fn visible(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.show_in_ui)
    }

    fn category_icon(&self) -> &'static str {
        match self.category.as_str() {
            "video" => "Video",
            "audio" => "Music",
            _ => "Image as ImageIcon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUpdates {
    pub fal_tools_addition: String,
    pub storage_helpers_addition: String,
}

fn js_default(param: &ToolParameter) -> String {
    match (param.kind, &param.default) {
        (ParamType::String, Some(Value::String(s))) => format!("'{}'", s.replace('\'', "\\'")),
        (ParamType::String, _) => "''".to_string(),
        (ParamType::Number | ParamType::Integer, Some(v @ Value::Number(_))) => v.to_string(),
        (ParamType::Number | ParamType::Integer, _) => "0".to_string(),
        (ParamType::Boolean, Some(Value::Bool(b))) => b.to_string(),
        (ParamType::Boolean, _) => "false".to_string(),
        (_, Some(v)) => v.to_string(),
        (_, None) => "undefined".to_string(),
    }
}

fn required_checks(config: &ToolConfig) -> String {
    let mut out = String::new();
    for param in config.visible().filter(|p| p.required) {
        let label = param.label.to_lowercase();
        if param.kind == ParamType::String {
            let _ = writeln!(
                out,
                "    if (!config.{}.trim()) {{\n      alert('Please enter {}');\n      return;\n    }}",
                param.name, label
            );
        } else {
            let _ = writeln!(
                out,
                "    if (!config.{}) {{\n      alert('Please provide {}');\n      return;\n    }}",
                param.name, label
            );
        }
    }
    out
}

fn safety_scan_block(config: &ToolConfig, ids: &ToolIdentifiers) -> String {
    if !config.enable_safety_scanning {
        return String::new();
    }
    let image = if config.enable_file_upload {
        "config.imageUrl || null"
    } else {
        "null"
    };
    format!(
        r#"    if (!bypassSafetyCheck) {{
      try {{
        const analysisResult = await performSafetyAnalysis({image}, config.prompt || null, '{tool_type}');
        logSafetyAnalysis(analysisResult, 'pre_generation_check');
        if (shouldShowWarning(analysisResult)) {{
          setSafetyWarningData(getSafetyWarningMessage(analysisResult));
          setShowSafetyWarning(true);
          return;
        }}
      }} catch (safetyError) {{
        console.warn('Safety analysis failed, proceeding with generation:', safetyError);
      }}
    }}
    setBypassSafetyCheck(false);
"#,
        image = image,
        tool_type = ids.tool_type
    )
}

fn token_cost_function(config: &ToolConfig) -> String {
    if config.token_cost_formula == "baseTokenCost" {
        format!(
            "  const calculateTokenCost = () => {{\n    return {};\n  }};",
            config.base_token_cost
        )
    } else {
        format!(
            "  const calculateTokenCost = () => {{\n    let cost = {};\n    // Add parameter-based cost calculations here\n    return cost;\n  }};",
            config.base_token_cost
        )
    }
}

/// React page for the tool
pub fn react_component(config: &ToolConfig, ids: &ToolIdentifiers) -> String {
    let mut out = String::new();

    out.push_str("import React, { useState, useEffect } from 'react';\n");
    out.push_str("import { useNavigate } from 'react-router-dom';\n");
    out.push_str("import { supabase } from '../../lib/supabaseClient';\n");
    out.push_str("import { useAuth } from '../../hooks/useAuth';\n");
    let _ = writeln!(
        out,
        "import {{ createAIGeneration, updateTokenCount{} }} from '../../utils/storageHelpers';",
        if config.enable_file_upload { ", uploadFile" } else { "" }
    );
    out.push_str("import { isNSFWError, parseNSFWError } from '../../utils/errorHandlers';\n");
    if config.enable_safety_scanning {
        out.push_str("import { performSafetyAnalysis, shouldShowWarning, getSafetyWarningMessage, logSafetyAnalysis } from '../../utils/safescan';\n");
        out.push_str("import SafetyWarningModal from '../../components/SafetyWarningModal';\n");
    }
    out.push_str("import NSFWAlert from '../../components/NSFWAlert';\n");
    let _ = writeln!(
        out,
        "import {{ ArrowLeft, Zap, {}, Upload, Download, Trash2, RefreshCw, Settings, Copy, X, {} }} from 'lucide-react';\n",
        config.category_icon(),
        config.tool_icon
    );

    let _ = writeln!(out, "const {} = () => {{", ids.component_name);
    out.push_str("  const { user } = useAuth();\n  const navigate = useNavigate();\n  const [profile, setProfile] = useState(null);\n\n");

    out.push_str("  const [config, setConfig] = useState({\n");
    let fields: Vec<String> = config
        .visible()
        .map(|p| format!("    {}: {}", p.name, js_default(p)))
        .collect();
    out.push_str(&fields.join(",\n"));
    out.push_str("\n  });\n\n");

    out.push_str("  const [generations, setGenerations] = useState([]);\n  const [activeGenerations, setActiveGenerations] = useState([]);\n  const [generating, setGenerating] = useState(false);\n  const [showNSFWAlert, setShowNSFWAlert] = useState(false);\n  const [nsfwError, setNsfwError] = useState(null);\n");
    if config.enable_safety_scanning {
        out.push_str("  const [showSafetyWarning, setShowSafetyWarning] = useState(false);\n  const [safetyWarningData, setSafetyWarningData] = useState(null);\n  const [bypassSafetyCheck, setBypassSafetyCheck] = useState(false);\n");
    }
    out.push('\n');

    out.push_str(&token_cost_function(config));
    out.push_str("\n\n  const handleGenerate = async () => {\n");
    out.push_str(&required_checks(config));
    out.push_str(&safety_scan_block(config, ids));
    let _ = write!(
        out,
        r#"    const tokenCost = calculateTokenCost();
    const totalTokens = (profile?.tokens || 0) + (profile?.purchased_tokens || 0);
    if (totalTokens < tokenCost) {{
      alert('Insufficient tokens. Please upgrade your plan.');
      return;
    }}

    setGenerating(true);
    try {{
      const generation = await createAIGeneration(
        '{tool_type}',
        config.prompt?.substring(0, 50) + '...' || '{name} Generation',
        config,
        tokenCost
      );
      setGenerations(current => [generation, ...current]);
      setActiveGenerations(current => [generation, ...current]);
      await updateTokenCount(user.id, tokenCost);

      const response = await fetch(`${{import.meta.env.VITE_SUPABASE_URL}}/functions/v1/{function}`, {{
        method: 'POST',
        headers: {{
          'Authorization': `Bearer ${{(await supabase.auth.getSession()).data.session.access_token}}`,
          'Content-Type': 'application/json'
        }},
        body: JSON.stringify({{ generationId: generation.id, ...config }})
      }});

      if (!response.ok) {{
        const errorData = await response.json();
        throw new Error(errorData.error || 'Generation failed');
      }}
    }} catch (error) {{
      if (isNSFWError(error.message)) {{
        setNsfwError(parseNSFWError(error.message));
        setShowNSFWAlert(true);
      }} else {{
        alert(`{name} generation failed: ${{error.message}}`);
      }}
    }} finally {{
      setGenerating(false);
    }}
  }};

  return (
    <div className="min-h-screen bg-gradient-to-br from-purple-900 via-blue-900 to-indigo-900">
      {{/* Generated UI based on parameters */}}
    </div>
  );
}};

export default {component};
"#,
        tool_type = ids.tool_type,
        name = config.name,
        function = ids.edge_function_name,
        component = ids.component_name,
    );
    out
}

/// Deno edge function that queues the tool on FAL
pub fn edge_function(config: &ToolConfig, ids: &ToolIdentifiers) -> String {
    let destructured: Vec<String> = config
        .visible()
        .map(|p| {
            if p.required {
                format!("      {}", p.name)
            } else {
                let default = p.default.clone().unwrap_or(Value::Null);
                format!("      {} = {}", p.name, default)
            }
        })
        .collect();

    let mut validations = String::new();
    for p in config.visible().filter(|p| p.required) {
        let trim = if p.kind == ParamType::String { "?.trim()" } else { "" };
        let _ = write!(
            validations,
            "\n    if (!{}{}) {{\n      throw new Error('{} is required');\n    }}",
            p.name, trim, p.label
        );
    }

    let fal_params: Vec<String> = config.visible().map(|p| format!("      {}", p.name)).collect();

    format!(
        r#"import {{ serve }} from "https://deno.land/std@0.168.0/http/server.ts";
import {{ createClient }} from 'https://esm.sh/@supabase/supabase-js@2';

const corsHeaders = {{
  'Access-Control-Allow-Origin': '*',
  'Access-Control-Allow-Headers': 'authorization, x-client-info, apikey, content-type',
  'Access-Control-Allow-Methods': 'POST, OPTIONS',
}};

function getWebhookUrl(): string {{
  const supabaseUrl = Deno.env.get('SUPABASE_URL') || '';
  const projectRef = supabaseUrl.split('.')[0].replace('https://', '');
  return `https://${{projectRef}}.supabase.co/functions/v1/fal-webhook`;
}}

serve(async (req) => {{
  if (req.method === 'OPTIONS') {{
    return new Response('ok', {{ headers: corsHeaders }});
  }}

  let generationId: string | undefined;
  const supabase = createClient(
    Deno.env.get('SUPABASE_URL') ?? '',
    Deno.env.get('SUPABASE_SERVICE_ROLE_KEY') ?? ''
  );

  try {{
    const token = (req.headers.get('Authorization') ?? '').replace('Bearer ', '');
    const {{ data: {{ user }} }} = await supabase.auth.getUser(token);
    if (!user) {{
      throw new Error('Unauthorized');
    }}

    const {{
      generationId: reqGenerationId,
{destructured}
    }} = await req.json();
    generationId = reqGenerationId;

    if (!generationId) {{
      throw new Error('Generation ID is required');
    }}{validations}

    await supabase
      .from('ai_generations')
      .update({{ status: 'processing' }})
      .eq('id', generationId)
      .eq('user_id', user.id);

    const falApiKey = Deno.env.get('FAL_API_KEY');
    if (!falApiKey) {{
      throw new Error('FAL_API_KEY not configured');
    }}

    const falParams = {{
{fal_params}
    }};

    const webhookUrl = getWebhookUrl();
    const queueUrl = `{endpoint}?fal_webhook=${{encodeURIComponent(webhookUrl)}}`;
    const falResponse = await fetch(queueUrl, {{
      method: 'POST',
      headers: {{ 'Authorization': `Key ${{falApiKey}}`, 'Content-Type': 'application/json' }},
      body: JSON.stringify(falParams),
    }});

    if (!falResponse.ok) {{
      const errorText = await falResponse.text();
      throw new Error(`FAL.ai error: ${{falResponse.status}} - ${{errorText}}`);
    }}

    const queueResult = await falResponse.json();
    const requestId = queueResult.request_id;
    if (!requestId) {{
      throw new Error('No request_id received from FAL.ai');
    }}

    await supabase
      .from('ai_generations')
      .update({{
        metadata: {{
          fal_request_id: requestId,
          gateway_request_id: queueResult.gateway_request_id,
          webhook_url: webhookUrl,
          processing_started: new Date().toISOString(),
          status: 'queued_at_fal',
          model: '{model}',
          tool_type: '{tool_type}',
          webhook_enabled: true,
          queue_submission_time: new Date().toISOString()
        }}
      }})
      .eq('id', generationId);

    return new Response(JSON.stringify({{
      success: true,
      status: 'queued',
      generation_id: generationId,
      message: '{name} generation queued successfully',
      fal_request_id: requestId,
      estimated_time: '{estimated_time}'
    }}), {{ headers: {{ ...corsHeaders, 'Content-Type': 'application/json' }} }});
  }} catch (error) {{
    console.error('Error in {function}:', error);
    if (generationId) {{
      await supabase
        .from('ai_generations')
        .update({{ status: 'failed', completed_at: new Date().toISOString(), error_message: error.message }})
        .eq('id', generationId);
    }}
    return new Response(
      JSON.stringify({{ success: false, error: error.message, generation_id: generationId }}),
      {{ headers: {{ ...corsHeaders, 'Content-Type': 'application/json' }}, status: 500 }}
    );
  }}
}});
"#,
        destructured = destructured.join(",\n"),
        validations = validations,
        fal_params = fal_params.join(",\n"),
        endpoint = config.fal_endpoint,
        model = config.name.to_lowercase(),
        tool_type = ids.tool_type,
        name = config.name,
        estimated_time = config.estimated_time,
        function = ids.edge_function_name,
    )
}

/// Catalogue entries for the two client-side tool tables. `entry_id` is the card id.
pub fn data_updates(config: &ToolConfig, ids: &ToolIdentifiers, entry_id: i64) -> DataUpdates {
    DataUpdates {
        fal_tools_addition: format!(
            r#"{{
    id: {id},
    name: "{name}",
    description: "{description}",
    image: toCdnUrl("https://images.pexels.com/photos/3785079/pexels-photo-3785079.jpeg?auto=compress&cs=tinysrgb&w=400&h=300&dpr=1"),
    tokensRequired: "{cost}+",
    category: "{category}",
    toolType: "{tool_type}",
    route: "{route}"
  }}"#,
            id = entry_id,
            name = config.name,
            description = config.description,
            cost = config.base_token_cost,
            category = config.category,
            tool_type = ids.tool_type,
            route = ids.route_path,
        ),
        storage_helpers_addition: format!(
            "{tool_type}: {{\n    name: '{name}',\n    description: '{description}',\n    tokensRequired: {cost},\n    category: '{category}'\n  }}",
            tool_type = ids.tool_type,
            name = config.name,
            description = config.description,
            cost = config.base_token_cost,
            category = config.category,
        ),
    }
}

/// Protected route element for the router
pub fn route_update(ids: &ToolIdentifiers) -> String {
    format!(
        "<Route \n  path=\"{}\" \n  element={{\n    <ProtectedRoute>\n      <{} />\n    </ProtectedRoute>\n  }} \n/>",
        ids.route_path, ids.component_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolgen::identifiers::derive_identifiers;
    use crate::toolgen::params::ToolParameter;
    use serde_json::json;

    fn config() -> ToolConfig {
        ToolConfig {
            name: "Qwen Image".into(),
            description: "Text to image".into(),
            fal_endpoint: "https://queue.fal.run/fal-ai/qwen-image".into(),
            parameters: vec![
                ToolParameter::new("prompt".into(), ParamType::String, "Prompt. Required".into(), true, None, None, None, None),
                ToolParameter::new("num_images".into(), ParamType::Integer, "Count".into(), false, Some(json!(1)), Some(1.0), Some(4.0), None),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn react_component_wires_tool_identity() {
        let config = config();
        let ids = derive_identifiers(&config.name).unwrap();
        let code = react_component(&config, &ids);
        assert!(code.contains("const QwenImage = () => {"));
        assert!(code.contains("functions/v1/fal-qwen-image"));
        assert!(code.contains("if (!config.prompt.trim())"));
        assert!(code.contains("num_images: 1"));
        assert!(code.contains("performSafetyAnalysis"));
        assert!(code.ends_with("export default QwenImage;\n"));
    }

    #[test]
    fn edge_function_validates_and_defaults() {
        let config = config();
        let ids = derive_identifiers(&config.name).unwrap();
        let code = edge_function(&config, &ids);
        assert!(code.contains("      num_images = 1"));
        assert!(code.contains("throw new Error('Prompt is required');"));
        assert!(code.contains("https://queue.fal.run/fal-ai/qwen-image?fal_webhook="));
        assert!(code.contains("tool_type: 'fal_qwen_image'"));
    }

    #[test]
    fn data_and_route_snippets() {
        let config = config();
        let ids = derive_identifiers(&config.name).unwrap();
        let updates = data_updates(&config, &ids, 42);
        assert!(updates.fal_tools_addition.contains("id: 42,"));
        assert!(updates.fal_tools_addition.contains("route: \"/qwen-image\""));
        assert!(updates.storage_helpers_addition.starts_with("fal_qwen_image: {"));
        assert!(route_update(&ids).contains("<QwenImage />"));
    }
}
