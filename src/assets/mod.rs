//! Asset library: completed generation outputs plus the uploads recovered from their inputs.

pub mod library;
pub mod uploads;

pub use library::{
    generation_items, list_assets, toggle_favorite, AssetItem, AssetPage, AssetQuery, AssetTab,
    FavoriteToggle, SelectionPayload, TypeFilter, UploadFavorites,
};
pub use uploads::{extract_uploads, upload_id, AssetKind, Upload};
