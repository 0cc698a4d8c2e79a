// handlers/elevated/mod.rs - Elevated handlers (admin access required)
//
// Routes here run behind `jwt_auth_middleware` and then `admin_middleware`. Admin means a
// configured user id or email, or the profile's `is_admin` flag; see `AdminPolicy`.
// The `/functions/v1/*` admin routes keep the edge-function response shapes.

pub mod admin_generations;
pub mod admin_users;
pub mod documentation;
pub mod loras;
pub mod toolgen;

pub use admin_generations::{
    admin_get_recent_generations, admin_get_user_generations, admin_get_users, admin_permanent_delete,
    admin_toggle_showcase,
};
pub use admin_users::ban_user;
pub use documentation::parse_fal_documentation;
pub use loras::{lora_create, lora_delete, lora_list_all, lora_operations, lora_update};
pub use toolgen::{toolgen_generate, toolgen_parse};
