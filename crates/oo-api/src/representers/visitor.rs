//! Visitor representer

use chrono::{DateTime, Utc};
use oo_core::Id;
use oo_models::{Visitor, VisitorStatus};
use serde::Serialize;

use crate::extractors::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct VisitorResource {
    pub id: Option<Id>,
    pub name: String,
    pub meet_with: String,
    pub purpose: String,
    pub origin: Option<String>,
    pub visit_time: DateTime<Utc>,
    pub formatted_visit_time: String,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: VisitorStatus,
    pub ktp_image_path: String,
    pub ktp_image_url: String,
    pub ktp_ocr: Option<String>,
    pub face_image_path: String,
    pub face_image_url: String,
    pub face_verified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct VisitorRepresenter;

impl VisitorRepresenter {
    pub fn represent(state: &AppState, visitor: Visitor) -> VisitorResource {
        let ctx = &state.services;
        let storage = ctx.evidence.storage();
        VisitorResource {
            id: visitor.id,
            formatted_visit_time: state.display.datetime(&ctx.region, visitor.visit_time),
            ktp_image_url: storage.url(&visitor.ktp_image_path),
            face_image_url: storage.url(&visitor.face_image_path),
            name: visitor.name,
            meet_with: visitor.meet_with,
            purpose: visitor.purpose,
            origin: visitor.origin,
            visit_time: visitor.visit_time,
            check_in: visitor.check_in,
            check_out: visitor.check_out,
            status: visitor.status,
            ktp_image_path: visitor.ktp_image_path,
            ktp_ocr: visitor.ktp_ocr,
            face_image_path: visitor.face_image_path,
            face_verified: visitor.face_verified,
            created_at: visitor.created_at,
            updated_at: visitor.updated_at,
        }
    }
}
