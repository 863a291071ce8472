//! Item requests
//!
//! Any user may ask for an item; GA staff approve or reject. An approval
//! registers the future asset right away in `not_received`.

use std::collections::HashMap;

use oo_contracts::{require_evaluator, validate_attributes, UserContext};
use oo_core::{Id, OoError, OoResult};
use oo_models::{Asset, NewAsset, NewRequestItem, RequestItem, User};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::ServiceContext;

/// Decision payload for approve and reject
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveRequest {
    pub ga_note: Option<String>,
    /// Asset category; the item name when absent
    pub category: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestWithRequester {
    pub request: RequestItem,
    pub requester: Option<User>,
}

pub struct RequestItemService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> RequestItemService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id()))]
    pub async fn create(&self, input: NewRequestItem) -> OoResult<RequestItem> {
        validate_attributes(&input)?;
        let item = RequestItem::create(self.user.id(), input, self.ctx.now());
        let saved = self.ctx.stores.request_items.insert(&item).await?;
        info!(request_id = ?saved.id, "Request created");
        Ok(saved)
    }

    /// Evaluators see every request, everyone else their own
    pub async fn list(&self) -> OoResult<Vec<RequestWithRequester>> {
        let requester = (!self.user.is_evaluator()).then(|| self.user.id());
        let items = self.ctx.stores.request_items.list(requester).await?;

        let mut ids: Vec<Id> = items.iter().map(|i| i.user_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let users: HashMap<Id, User> = self
            .ctx
            .stores
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .filter_map(|u| u.id.map(|id| (id, u)))
            .collect();

        Ok(items
            .into_iter()
            .map(|request| RequestWithRequester {
                requester: users.get(&request.user_id).cloned(),
                request,
            })
            .collect())
    }

    /// Approves a pending request and registers its asset
    #[instrument(skip_all, fields(evaluator_id = self.user.id(), request_id = id))]
    pub async fn approve(&self, id: Id, decision: ApproveRequest) -> OoResult<(RequestItem, Asset)> {
        require_evaluator(self.user, "approve requests")?;
        let item = self.find(id).await?;
        let now = self.ctx.now();

        let approved = item.approve(decision.ga_note, now)?;
        let category = decision
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| approved.item_name.chars().take(100).collect());
        let input = NewAsset {
            request_item_id: id,
            procurement_id: None,
            category,
            location: decision.location,
            notes: None,
        };
        validate_attributes(&input)?;

        let saved = self.ctx.stores.request_items.update(&approved).await?;
        let asset = Asset::create(input, Asset::code_from(Uuid::new_v4()), now);
        let asset = self.ctx.stores.assets.insert(&asset).await?;

        info!(asset_code = %asset.asset_code, "Request approved");
        Ok((saved, asset))
    }

    #[instrument(skip_all, fields(evaluator_id = self.user.id(), request_id = id))]
    pub async fn reject(&self, id: Id, ga_note: Option<String>) -> OoResult<RequestItem> {
        require_evaluator(self.user, "reject requests")?;
        let item = self.find(id).await?;

        let rejected = item.reject(ga_note, self.ctx.now())?;
        let saved = self.ctx.stores.request_items.update(&rejected).await?;
        info!("Request rejected");
        Ok(saved)
    }

    async fn find(&self, id: Id) -> OoResult<RequestItem> {
        self.ctx
            .stores
            .request_items
            .find(id)
            .await?
            .ok_or_else(|| OoError::not_found("RequestItem", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{harness, GA, OWNER, STRANGER};
    use oo_models::{AssetStatus, RequestStatus};

    fn chairs() -> NewRequestItem {
        NewRequestItem {
            item_name: "Office chair".into(),
            quantity: 2,
            reason: Some("Broken".into()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_visibility() {
        let h = harness().await;
        RequestItemService::new(&h.ctx, &OWNER).create(chairs()).await.unwrap();
        RequestItemService::new(&h.ctx, &STRANGER).create(chairs()).await.unwrap();

        let own = RequestItemService::new(&h.ctx, &OWNER).list().await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].request.status, RequestStatus::Pending);

        let all = RequestItemService::new(&h.ctx, &GA).list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.requester.is_some()));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let h = harness().await;
        let mut input = chairs();
        input.quantity = 0;
        let err = RequestItemService::new(&h.ctx, &OWNER).create(input).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_approval_creates_pending_asset() {
        let h = harness().await;
        let item = RequestItemService::new(&h.ctx, &OWNER).create(chairs()).await.unwrap();
        let id = item.id.unwrap();

        let (approved, asset) = RequestItemService::new(&h.ctx, &GA)
            .approve(
                id,
                ApproveRequest {
                    ga_note: Some("Ordered".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.ga_note.as_deref(), Some("Ordered"));
        assert_eq!(asset.status, AssetStatus::NotReceived);
        assert_eq!(asset.category, "Office chair");
        assert_eq!(asset.request_item_id, id);
        assert!(asset.asset_code.starts_with("AST-"));
        assert_eq!(asset.asset_code.len(), 12);

        let err = RequestItemService::new(&h.ctx, &GA)
            .reject(id, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_transition");
    }

    #[tokio::test]
    async fn test_users_cannot_decide() {
        let h = harness().await;
        let item = RequestItemService::new(&h.ctx, &OWNER).create(chairs()).await.unwrap();

        let err = RequestItemService::new(&h.ctx, &OWNER)
            .approve(item.id.unwrap(), ApproveRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let rejected = RequestItemService::new(&h.ctx, &GA)
            .reject(item.id.unwrap(), Some("No budget".into()))
            .await
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
    }
}
