use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAccess {
    Public,
    Protected,
    Admin,
}

/// Client route table. Patterns use `:param` segments.
pub static CLIENT_ROUTES: &[(&str, RouteAccess)] = &[
    ("/", RouteAccess::Public),
    ("/login", RouteAccess::Public),
    ("/signup", RouteAccess::Public),
    ("/about", RouteAccess::Public),
    ("/contact", RouteAccess::Public),
    ("/privacy", RouteAccess::Public),
    ("/terms", RouteAccess::Public),
    ("/faq", RouteAccess::Public),
    ("/careers", RouteAccess::Public),
    ("/pricing", RouteAccess::Public),
    ("/dashboard", RouteAccess::Protected),
    ("/settings", RouteAccess::Protected),
    ("/gallery", RouteAccess::Protected),
    ("/flux-generator", RouteAccess::Protected),
    ("/flux-redux", RouteAccess::Protected),
    ("/flux-kontext", RouteAccess::Protected),
    ("/minimax-hailuo", RouteAccess::Protected),
    ("/wan-pro", RouteAccess::Protected),
    ("/wan22-pro", RouteAccess::Protected),
    ("/kling-pro", RouteAccess::Protected),
    ("/flux-kontext-lora", RouteAccess::Protected),
    ("/veo2-video", RouteAccess::Protected),
    ("/ltxv-video", RouteAccess::Protected),
    ("/fal-video-upscaler", RouteAccess::Protected),
    ("/bria-bg-remove", RouteAccess::Protected),
    ("/veo3-fast", RouteAccess::Protected),
    ("/veo3-standard", RouteAccess::Protected),
    ("/ai-scene-gen", RouteAccess::Protected),
    ("/hidream-i1", RouteAccess::Protected),
    ("/seedance-pro", RouteAccess::Protected),
    ("/wan-v22-a14b", RouteAccess::Protected),
    ("/wan-v22-text2video-lora", RouteAccess::Protected),
    ("/wan-v22-img2video-lora", RouteAccess::Protected),
    ("/wan-v22-video2video", RouteAccess::Protected),
    ("/cassetteai-music", RouteAccess::Protected),
    ("/mmaudio-v2", RouteAccess::Protected),
    ("/mmaudio-video2", RouteAccess::Protected),
    ("/omnihuman", RouteAccess::Protected),
    ("/flux-kontext-max-multi", RouteAccess::Protected),
    ("/gemini-flash-image-edit", RouteAccess::Protected),
    ("/wan-22-s2v", RouteAccess::Protected),
    ("/admin", RouteAccess::Admin),
    ("/admin/lora-manager", RouteAccess::Admin),
    ("/admin/user/:userId", RouteAccess::Admin),
    ("/admin/tool-generator", RouteAccess::Admin),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub pattern: &'static str,
    pub access: RouteAccess,
}

fn matches(pattern: &str, path: &str) -> bool {
    let mut p = pattern.split('/');
    let mut s = path.split('/');
    loop {
        match (p.next(), s.next()) {
            (None, None) => return true,
            (Some(seg), Some(actual)) if seg.starts_with(':') => {
                if actual.is_empty() {
                    return false;
                }
            }
            (Some(seg), Some(actual)) if seg == actual => {}
            _ => return false,
        }
    }
}

/// Match a path (query and fragment ignored, trailing slash tolerated). Unknown paths fall
/// back to `/`, mirroring the catch-all redirect.
pub fn resolve(path: &str) -> (ResolvedRoute, bool) {
    let path = path.split(['?', '#']).next().unwrap_or("/");
    let trimmed = if path.len() > 1 { path.trim_end_matches('/') } else { path };

    for (pattern, access) in CLIENT_ROUTES {
        if matches(pattern, trimmed) {
            return (ResolvedRoute { pattern, access: *access }, true);
        }
    }
    (
        ResolvedRoute {
            pattern: "/",
            access: RouteAccess::Public,
        },
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_static_and_param_routes() {
        assert_eq!(resolve("/dashboard").0.access, RouteAccess::Protected);
        assert_eq!(resolve("/pricing/").0.access, RouteAccess::Public);
        let (route, known) = resolve("/admin/user/abc-123?tab=generations");
        assert!(known);
        assert_eq!(route.pattern, "/admin/user/:userId");
        assert_eq!(route.access, RouteAccess::Admin);
    }

    #[test]
    fn unknown_paths_fall_back_to_home() {
        let (route, known) = resolve("/nope");
        assert!(!known);
        assert_eq!(route.pattern, "/");
        assert!(!resolve("/admin/user/").1);
    }

    #[test]
    fn every_catalogue_route_is_protected() {
        for tool in crate::generation::catalogue::AI_TOOLS {
            if let Some(route) = tool.route {
                assert_eq!(resolve(route).0.access, RouteAccess::Protected, "{}", route);
            }
        }
    }
}
