// handlers/mod.rs - Three handler tiers, mirroring the route layers in `app`:
// Public (no auth) → Protected (Supabase JWT) → Elevated (JWT + admin policy)

pub mod elevated; // Tier 3: admin allowlist or profile flag (/api/admin/*, admin functions)
pub mod protected; // Tier 2: JWT authentication required (/api/*, /functions/v1/*)
pub mod public; // Tier 1: no authentication required (/, /health, /api/tools, /api/routes/guard)
