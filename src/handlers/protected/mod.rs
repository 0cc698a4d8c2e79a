// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here sits behind `jwt_auth_middleware`, which injects the caller as an
// `AuthUser` extension. Stores are always queried with that user's id.

pub mod assets;
pub mod functions;
pub mod generations;
pub mod loras;

pub use assets::{asset_favorite, asset_list};
pub use functions::function_post;
pub use generations::{generation_delete, generation_post, generation_stream};
pub use loras::lora_list;
