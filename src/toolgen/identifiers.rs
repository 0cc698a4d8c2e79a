use serde::Serialize;

/// Names a new FAL tool is known by across the codebase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolIdentifiers {
    pub component_name: String,
    pub edge_function_name: String,
    pub tool_type: String,
    pub route_path: String,
}

/// Tool name with punctuation removed and whitespace collapsed
pub fn clean_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

/// `None` when nothing usable is left of the name
pub fn derive_identifiers(name: &str) -> Option<ToolIdentifiers> {
    let clean = clean_name(name);
    if clean.is_empty() {
        return None;
    }
    let words: Vec<&str> = clean.split(' ').collect();
    let lower = clean.to_lowercase();
    let kebab = lower.replace(' ', "-");
    let snake = lower.replace(' ', "_");

    Some(ToolIdentifiers {
        component_name: words.iter().map(|w| capitalize(w)).collect(),
        edge_function_name: format!("fal-{}", kebab),
        tool_type: format!("fal_{}", snake),
        route_path: format!("/{}", kebab),
    })
}
