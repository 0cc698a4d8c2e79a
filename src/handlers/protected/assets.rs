use axum::extract::{Extension, Path, Query, State};

use crate::assets::{list_assets, toggle_favorite, AssetPage, AssetQuery, FavoriteToggle};
use crate::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/assets - one page of the caller's library
pub async fn asset_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AssetQuery>,
) -> ApiResult<AssetPage> {
    let page = list_assets(
        state.generations.as_ref(),
        &state.upload_favorites,
        user.user_id,
        &query,
        state.config.assets.items_per_page,
    )
    .await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/assets/:id/favorite - flip the favorite flag of an upload or generation
pub async fn asset_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(asset_id): Path<String>,
) -> ApiResult<FavoriteToggle> {
    let toggled = toggle_favorite(
        state.generations.as_ref(),
        &state.upload_favorites,
        user.user_id,
        &asset_id,
    )
    .await?;
    Ok(ApiResponse::success(toggled))
}
