//! In-memory collaborators.
//!
//! [`InMemoryCompanyStore`] answers company lookups from a concurrent map,
//! optionally seeded from a JSON file. [`InMemoryResultStore`] keeps every
//! record handed to the result sink.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use meridian_traits::{
    AnalysisRecord, CompanyId, CompanyLookup, CompanySnapshot, RecordId, ResultSink,
    ScenarioRecord, TraitError, ValuationRecord,
};

/// In-memory company lookup.
pub struct InMemoryCompanyStore {
    companies: DashMap<CompanyId, CompanySnapshot>,
}

impl InMemoryCompanyStore {
    /// Create a new empty company store.
    pub fn new() -> Self {
        Self {
            companies: DashMap::new(),
        }
    }

    /// Load companies from a JSON array of snapshots.
    pub fn from_json(content: &str) -> Result<Self, TraitError> {
        let companies: Vec<CompanySnapshot> = serde_json::from_str(content)?;
        let store = Self::new();
        for company in companies {
            store.upsert(company);
        }
        Ok(store)
    }

    /// Load companies from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, TraitError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Insert or update a company.
    pub fn upsert(&self, company: CompanySnapshot) -> CompanySnapshot {
        self.companies.insert(company.id.clone(), company.clone());
        company
    }

    /// Get total count of companies.
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

impl Default for InMemoryCompanyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompanyLookup for InMemoryCompanyStore {
    async fn get_company(&self, id: &CompanyId) -> Result<Option<CompanySnapshot>, TraitError> {
        Ok(self.companies.get(id).map(|r| r.value().clone()))
    }
}

/// In-memory result sink.
pub struct InMemoryResultStore {
    valuations: DashMap<RecordId, ValuationRecord>,
    scenarios: DashMap<RecordId, ScenarioRecord>,
    analyses: DashMap<RecordId, AnalysisRecord>,
}

impl InMemoryResultStore {
    /// Create a new empty result store.
    pub fn new() -> Self {
        Self {
            valuations: DashMap::new(),
            scenarios: DashMap::new(),
            analyses: DashMap::new(),
        }
    }

    /// Valuation records for a company, oldest first.
    pub fn valuations_for(&self, company_id: &CompanyId) -> Vec<ValuationRecord> {
        let mut records: Vec<ValuationRecord> = self
            .valuations
            .iter()
            .filter(|r| &r.value().company_id == company_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Scenario records for a company, oldest first.
    pub fn scenarios_for(&self, company_id: &CompanyId) -> Vec<ScenarioRecord> {
        let mut records: Vec<ScenarioRecord> = self
            .scenarios
            .iter()
            .filter(|r| &r.value().company_id == company_id)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Every analysis record, oldest first.
    pub fn analyses(&self) -> Vec<AnalysisRecord> {
        let mut records: Vec<AnalysisRecord> =
            self.analyses.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Total number of stored records.
    pub fn len(&self) -> usize {
        self.valuations.len() + self.scenarios.len() + self.analyses.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultSink for InMemoryResultStore {
    async fn save_valuation(&self, record: ValuationRecord) -> Result<(), TraitError> {
        insert_new(&self.valuations, record.id, record)
    }

    async fn save_scenario(&self, record: ScenarioRecord) -> Result<(), TraitError> {
        insert_new(&self.scenarios, record.id, record)
    }

    async fn save_analysis(&self, record: AnalysisRecord) -> Result<(), TraitError> {
        insert_new(&self.analyses, record.id, record)
    }
}

/// Stored records are immutable: a second write under the same id is refused.
fn insert_new<T>(map: &DashMap<RecordId, T>, id: RecordId, record: T) -> Result<(), TraitError> {
    match map.entry(id) {
        Entry::Occupied(_) => Err(TraitError::AlreadyExists(format!("record {id}"))),
        Entry::Vacant(slot) => {
            slot.insert(record);
            Ok(())
        }
    }
}
