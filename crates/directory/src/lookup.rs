//! Directory lookup seam.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{error::Result, profile::CompanyProfile};

/// Source of company profiles, keyed by directory id.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// `Ok(None)` when the id has no row; `Err(InvalidRecord)` when the row
    /// exists but fails validation.
    async fn lookup(&self, company_id: &str) -> Result<Option<CompanyProfile>>;
}

/// Fixed in-memory directory for tests.
#[derive(Default)]
pub struct MemoryDirectory {
    profiles: HashMap<String, CompanyProfile>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_profile(mut self, profile: CompanyProfile) -> Self {
        self.profiles.insert(profile.id.clone(), profile);
        self
    }
}

#[async_trait]
impl ProfileDirectory for MemoryDirectory {
    async fn lookup(&self, company_id: &str) -> Result<Option<CompanyProfile>> {
        Ok(self.profiles.get(company_id).cloned())
    }
}
