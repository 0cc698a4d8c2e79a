// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service metadata, the tool catalogue and the client route guard. The guard reads a
// bearer token when one is sent but never requires it.

pub mod guard;
pub mod system;

pub use guard::route_guard;
pub use system::{health, root, tools};
