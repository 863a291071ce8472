//! Procurement records

use oo_contracts::{require_evaluator, validate_attributes, UserContext};
use oo_core::{OoError, OoResult};
use oo_models::{NewProcurement, Procurement};
use tracing::{info, instrument};

use crate::context::ServiceContext;

pub struct ProcurementService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> ProcurementService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    /// Records a purchase and marks the request as purchased
    #[instrument(skip_all, fields(evaluator_id = self.user.id(), request_id = input.request_item_id))]
    pub async fn create(&self, input: NewProcurement) -> OoResult<Procurement> {
        require_evaluator(self.user, "record procurements")?;
        validate_attributes(&input)?;

        let request = self
            .ctx
            .stores
            .request_items
            .find(input.request_item_id)
            .await?
            .ok_or_else(|| OoError::invalid("request_item_id", "does not exist"))?;

        let now = self.ctx.now();
        let procurement = Procurement::create(self.user.id(), input, now);
        let saved = self.ctx.stores.procurements.insert(&procurement).await?;

        let purchased = request.mark_purchased(now);
        if purchased.status != request.status {
            self.ctx.stores.request_items.update(&purchased).await?;
        }

        info!(procurement_id = ?saved.id, amount = saved.amount, "Procurement recorded");
        Ok(saved)
    }

    /// Newest first
    pub async fn list(&self) -> OoResult<Vec<Procurement>> {
        Ok(self.ctx.stores.procurements.list().await?)
    }
}
