//! In-memory reference store
//!
//! Tables live behind a single `tokio::sync::RwLock`, so every mutation is
//! a critical section: the popularity increment is an atomic
//! read-modify-write, and entity + rating removal happens in one unit.

use crate::entity::{Analysis, MetadataUpdate, NewAnalysis, Rating};
use crate::error::{Result, StoreError};
use crate::policy::AccessPolicy;
use crate::store::{AnalysisStore, Page};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    next_id: u64,
    analyses: BTreeMap<u64, Analysis>,
    ratings: Vec<Rating>,
}

/// In-memory [`AnalysisStore`] implementation
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject payloads that are not valid JSON text before persistence
fn validate_payload(data: &str) -> Result<()> {
    serde_json::from_str::<serde_json::Value>(data)?;
    Ok(())
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn create(&self, new: NewAnalysis) -> Result<Analysis> {
        validate_payload(&new.data)?;

        let mut tables = self.tables.write().await;
        tables.next_id += 1;
        let analysis = Analysis {
            id: tables.next_id,
            title: new.title,
            abstract_text: new.abstract_text,
            owner: new.owner,
            data: new.data,
            popular_count: 0,
            point_of_contact: None,
            metadata_author: None,
            category: None,
            keywords: Vec::new(),
            created: Utc::now(),
            policy: AccessPolicy::default_for_new(),
        };
        tables.analyses.insert(analysis.id, analysis.clone());
        Ok(analysis)
    }

    async fn get(&self, id: u64) -> Result<Analysis> {
        let tables = self.tables.read().await;
        tables
            .analyses
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, page: Page) -> Result<Vec<Analysis>> {
        let tables = self.tables.read().await;
        let mut all: Vec<Analysis> = tables.analyses.values().cloned().collect();
        // Newest first; ids are monotonic so they break creation-time ties
        all.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(all.into_iter().skip(page.offset).take(page.limit).collect())
    }

    async fn update_data(&self, id: u64, data: String) -> Result<Analysis> {
        validate_payload(&data)?;

        let mut tables = self.tables.write().await;
        let analysis = tables
            .analyses
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        analysis.data = data;
        Ok(analysis.clone())
    }

    async fn update_metadata(&self, id: u64, meta: MetadataUpdate) -> Result<Analysis> {
        let mut tables = self.tables.write().await;
        let analysis = tables
            .analyses
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        analysis.title = meta.title;
        analysis.abstract_text = meta.abstract_text;
        analysis.category = meta.category;
        analysis.keywords = meta.keywords;
        analysis.point_of_contact = meta.point_of_contact;
        analysis.metadata_author = meta.metadata_author;
        Ok(analysis.clone())
    }

    async fn record_view(&self, id: u64) -> Result<Analysis> {
        let mut tables = self.tables.write().await;
        let analysis = tables
            .analyses
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        analysis.popular_count += 1;
        Ok(analysis.clone())
    }

    async fn remove(&self, id: u64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.analyses.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        // Same critical section as the entity removal: no dangling rating
        // is ever observable.
        tables.ratings.retain(|r| r.analysis_id != id);
        Ok(())
    }

    async fn add_rating(&self, id: u64, principal: &str, score: u8) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.analyses.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        tables.ratings.push(Rating {
            analysis_id: id,
            principal: principal.to_string(),
            score,
        });
        Ok(())
    }

    async fn rating_count(&self, id: u64) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .iter()
            .filter(|r| r.analysis_id == id)
            .count())
    }

    async fn set_policy(&self, id: u64, policy: AccessPolicy) -> Result<()> {
        let mut tables = self.tables.write().await;
        let analysis = tables
            .analyses
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        analysis.policy = policy;
        Ok(())
    }
}
