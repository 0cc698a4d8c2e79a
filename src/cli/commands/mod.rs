pub mod assets;
pub mod routes;
pub mod token;
pub mod toolgen;
pub mod tools;
pub mod watch;
