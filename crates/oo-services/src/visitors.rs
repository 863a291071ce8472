//! Visitor registration and presence
//!
//! Registration stores an ID card scan and a face photo under a per-visitor
//! folder of the day. Registering the same name twice on one day replaces
//! the earlier registration together with its files.

use async_trait::async_trait;
use chrono::NaiveDate;
use oo_contracts::{AttributesContract, Contract, UserContext, VisitorImages};
use oo_core::error::ValidationErrors;
use oo_core::pagination::{Page, PaginationParams};
use oo_core::{Id, OoError, OoResult};
use oo_db::VisitorQuery;
use oo_evidence::{safe_name, visitor_folder, EvidenceUpload, VisitorImage};
use oo_models::visitor::title_case;
use oo_models::{NewVisitor, Visitor, VisitorStatus};
use tracing::{info, instrument, warn};

use crate::context::ServiceContext;

/// Reads ID cards and compares faces. Implementations may call external
/// services; failures are logged and treated as "nothing recognized".
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Text found on the ID card image
    async fn extract_id_text(&self, id_card: &EvidenceUpload) -> OoResult<Option<String>>;

    /// Whether the face photo matches the ID card
    async fn verify_face(&self, id_card: &EvidenceUpload, face: &EvidenceUpload) -> OoResult<bool>;
}

/// Recognizes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIdentityVerifier;

#[async_trait]
impl IdentityVerifier for NoopIdentityVerifier {
    async fn extract_id_text(&self, _id_card: &EvidenceUpload) -> OoResult<Option<String>> {
        Ok(None)
    }

    async fn verify_face(&self, _id_card: &EvidenceUpload, _face: &EvidenceUpload) -> OoResult<bool> {
        Ok(false)
    }
}

/// Registration form: text fields plus both images
#[derive(Debug, Clone)]
pub struct VisitorRegistration {
    pub visitor: NewVisitor,
    pub ktp_image: Option<EvidenceUpload>,
    pub face_image: Option<EvidenceUpload>,
}

pub struct VisitorService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> VisitorService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip_all, fields(user_id = self.user.id()))]
    pub async fn register(&self, registration: VisitorRegistration) -> OoResult<Visitor> {
        let mut errors = ValidationErrors::new();
        if let Err(field_errors) = AttributesContract.validate(&registration.visitor) {
            errors.merge(field_errors);
        }
        let images = VisitorImages {
            ktp_image: registration.ktp_image.as_ref(),
            face_image: registration.face_image.as_ref(),
        };
        if let Err(image_errors) = self.ctx.visitor_contract.validate(&images) {
            errors.merge(image_errors);
        }
        errors.into_result()?;

        let (ktp, face) = match (registration.ktp_image, registration.face_image) {
            (Some(ktp), Some(face)) => (ktp, face),
            _ => return Err(OoError::invalid("ktp_image", "is required")),
        };
        let input = registration.visitor;
        let name = title_case(&input.name);

        let now = self.ctx.now();
        let local = self.ctx.region.local(now);
        let folder = visitor_folder(&name, &local);

        self.replace_same_day(&name, &folder, self.ctx.region.local_date(now))
            .await?;

        let storage = self.ctx.evidence.storage();
        for image in [VisitorImage::IdCard, VisitorImage::Face] {
            storage
                .make_directory(&format!("{}/{}", folder, image.subdirectory()))
                .await?;
        }

        let ktp_path = VisitorImage::IdCard.path(&folder, &name, &local, &ktp.extension());
        let face_path = VisitorImage::Face.path(&folder, &name, &local, &face.extension());
        self.ctx.evidence.store_at(&ktp_path, &ktp).await?;
        if let Err(err) = self.ctx.evidence.store_at(&face_path, &face).await {
            self.ctx.evidence.discard(&[ktp_path]).await;
            return Err(err);
        }

        let ktp_ocr = self
            .ctx
            .identity
            .extract_id_text(&ktp)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "ID card text extraction failed");
                None
            });
        let face_verified = self
            .ctx
            .identity
            .verify_face(&ktp, &face)
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "Face verification failed");
                false
            });

        let visitor = Visitor {
            id: None,
            name,
            meet_with: input.meet_with,
            purpose: input.purpose,
            origin: input.origin,
            visit_time: now,
            check_in: Some(now),
            check_out: None,
            ktp_image_path: ktp_path.clone(),
            ktp_ocr,
            face_image_path: face_path.clone(),
            face_verified,
            status: VisitorStatus::CheckedIn,
            created_at: Some(now),
            updated_at: Some(now),
        };

        match self.ctx.stores.visitors.insert(&visitor).await {
            Ok(saved) => {
                info!(visitor_id = ?saved.id, folder = %folder, "Visitor registered");
                Ok(saved)
            }
            Err(err) => {
                self.ctx.evidence.discard(&[ktp_path, face_path]).await;
                Err(err.into())
            }
        }
    }

    /// Removes earlier registrations of `name` on `date`: their rows and
    /// every `{safe_name}-NN` folder of that day
    async fn replace_same_day(&self, name: &str, folder: &str, date: NaiveDate) -> OoResult<()> {
        let storage = self.ctx.evidence.storage();
        if let Some((day_directory, _)) = folder.rsplit_once('/') {
            let prefix = format!("{}-", safe_name(name));
            for directory in storage.directories(day_directory).await? {
                let leaf = directory.rsplit('/').next().unwrap_or_default();
                let numbered = leaf
                    .strip_prefix(&prefix)
                    .map_or(false, |n| n.len() == 2 && n.bytes().all(|b| b.is_ascii_digit()));
                if numbered {
                    storage.delete_directory(&directory).await?;
                }
            }
        }

        let (start, end) = self.ctx.region.day_bounds(date);
        let removed = self
            .ctx
            .stores
            .visitors
            .delete_named_between(name, start, end)
            .await?;
        if !removed.is_empty() {
            info!(count = removed.len(), "Replaced earlier registration");
        }
        Ok(())
    }

    /// Newest first, optionally limited to one regional day and a search term
    pub async fn list(
        &self,
        date: Option<NaiveDate>,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> OoResult<Page<Visitor>> {
        let query = VisitorQuery {
            window: date.map(|d| self.ctx.region.day_bounds(d)),
            search,
        };
        Ok(self
            .ctx
            .stores
            .visitors
            .list(&query, pagination.normalized())
            .await?)
    }

    pub async fn show(&self, id: Id) -> OoResult<Visitor> {
        self.ctx
            .stores
            .visitors
            .find(id)
            .await?
            .ok_or_else(|| OoError::not_found("Visitor", id))
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), visitor_id = id))]
    pub async fn check_in(&self, id: Id) -> OoResult<Visitor> {
        let visitor = self.show(id).await?;
        let saved = self
            .ctx
            .stores
            .visitors
            .update(&visitor.check_in(self.ctx.now()))
            .await?;
        info!("Visitor checked in");
        Ok(saved)
    }

    #[instrument(skip_all, fields(user_id = self.user.id(), visitor_id = id))]
    pub async fn check_out(&self, id: Id) -> OoResult<Visitor> {
        let visitor = self.show(id).await?;
        let next = visitor.check_out(self.ctx.now())?;
        let saved = self.ctx.stores.visitors.update(&next).await?;
        info!("Visitor checked out");
        Ok(saved)
    }
}
