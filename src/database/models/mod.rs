pub mod generation;
pub mod preset_lora;
pub mod profile;

pub use generation::{Generation, GenerationStatus, GenerationUpdate, NewGeneration};
pub use preset_lora::{PresetLora, PresetLoraInput};
pub use profile::{BanStatus, Profile};
