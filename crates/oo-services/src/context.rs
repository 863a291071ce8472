//! Shared dependencies of every service

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use oo_contracts::{EvidenceBatchContract, FileRules, VisitorImagesContract};
use oo_core::config::AppConfig;
use oo_core::time::{Clock, RegionalTime};
use oo_core::types::Locale;
use oo_core::OoResult;
use oo_db::Stores;
use oo_evidence::{EvidenceManager, Storage};

use crate::visitors::{IdentityVerifier, NoopIdentityVerifier};

/// Everything a service needs besides the acting user
pub struct ServiceContext {
    pub stores: Stores,
    pub evidence: EvidenceManager,
    pub clock: Arc<dyn Clock>,
    pub region: RegionalTime,
    pub locale: Locale,
    pub evidence_contract: EvidenceBatchContract,
    pub visitor_contract: VisitorImagesContract,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl ServiceContext {
    pub fn from_config(
        config: &AppConfig,
        stores: Stores,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> OoResult<Self> {
        let evidence_rules = FileRules::new(
            config.evidence.max_file_size,
            &config.evidence.allowed_extensions,
        );
        let visitor_rules = FileRules::new(
            config.visitors.max_image_size,
            &config.visitors.allowed_extensions,
        );

        Ok(Self {
            stores,
            evidence: EvidenceManager::new(storage),
            clock,
            region: config.regional_time()?,
            locale: config.locale()?,
            evidence_contract: EvidenceBatchContract::new(config.evidence.max_files, evidence_rules),
            visitor_contract: VisitorImagesContract::new(visitor_rules),
            identity: Arc::new(NoopIdentityVerifier),
        })
    }

    pub fn with_identity_verifier(mut self, identity: Arc<dyn IdentityVerifier>) -> Self {
        self.identity = identity;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current instant in the regional timezone
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.region.local(self.clock.now())
    }
}
