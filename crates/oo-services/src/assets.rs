//! Asset register

use chrono::NaiveDate;
use oo_contracts::{require_evaluator, validate_attributes, UserContext};
use oo_core::{Id, OoError, OoResult};
use oo_models::{Asset, AssetStatus, NewAsset};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::ServiceContext;

/// Status update payload
#[derive(Debug, Clone, Deserialize)]
pub struct AssetStatusChange {
    pub status: AssetStatus,
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub struct AssetService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> AssetService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(evaluator_id = self.user.id(), request_id = input.request_item_id))]
    pub async fn create(&self, input: NewAsset) -> OoResult<Asset> {
        require_evaluator(self.user, "register assets")?;
        validate_attributes(&input)?;

        if self
            .ctx
            .stores
            .request_items
            .find(input.request_item_id)
            .await?
            .is_none()
        {
            return Err(OoError::invalid("request_item_id", "does not exist"));
        }

        let asset = Asset::create(input, Asset::code_from(Uuid::new_v4()), self.ctx.now());
        let saved = self.ctx.stores.assets.insert(&asset).await?;
        info!(asset_code = %saved.asset_code, "Asset created");
        Ok(saved)
    }

    /// Newest first
    pub async fn list(&self) -> OoResult<Vec<Asset>> {
        Ok(self.ctx.stores.assets.list().await?)
    }

    /// Receiving an asset also closes its request as `received`
    #[instrument(skip_all, fields(evaluator_id = self.user.id(), asset_id = id))]
    pub async fn update_status(&self, id: Id, change: AssetStatusChange) -> OoResult<Asset> {
        require_evaluator(self.user, "update assets")?;
        let asset = self
            .ctx
            .stores
            .assets
            .find(id)
            .await?
            .ok_or_else(|| OoError::not_found("Asset", id))?;

        let now = self.ctx.now();
        let received_date = match (change.status, change.received_date) {
            (AssetStatus::Received, None) => Some(self.ctx.region.local_date(now)),
            (_, date) => date,
        };
        let updated = asset.with_status(change.status, received_date, change.notes, now);
        let saved = self.ctx.stores.assets.update(&updated).await?;

        if saved.status == AssetStatus::Received {
            if let Some(request) = self.ctx.stores.request_items.find(saved.request_item_id).await? {
                self.ctx
                    .stores
                    .request_items
                    .update(&request.mark_received(now))
                    .await?;
            }
        }

        info!(status = %saved.status, "Asset updated");
        Ok(saved)
    }
}
