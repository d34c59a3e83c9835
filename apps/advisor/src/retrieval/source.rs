//! Module source: where candidate modules come from.
//!
//! `AppState` holds an `Arc<dyn ModuleSource>`. The default
//! `CatalogModuleSource` answers from an in-memory catalog that is either
//! built in or loaded from a JSON file at startup.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::planning::models::{CandidateModule, ModuleType, Season};
use crate::retrieval::models::{CatalogModule, OccupationModuleMatch, OccupationSupport};

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ModuleSource: Send + Sync {
    /// Modules supporting each occupation. Occupations are answered in the
    /// order given; within one occupation, modules covering more skills
    /// come first.
    async fn modules_for_occupations(
        &self,
        occupations: &[String],
    ) -> Result<Vec<OccupationModuleMatch>, AppError>;

    /// Every main-plan module of the programme.
    async fn catalog(&self) -> Result<Vec<CatalogModule>, AppError>;

    /// Thesis modules in the order they must be taken.
    async fn thesis_sequence(&self) -> Result<Vec<CandidateModule>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// CatalogModuleSource
// ────────────────────────────────────────────────────────────────────────────

/// On-disk catalog layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub modules: Vec<CatalogModule>,
    pub thesis_sequence: Vec<CandidateModule>,
}

pub struct CatalogModuleSource {
    catalog: CatalogFile,
}

impl CatalogModuleSource {
    pub fn new(catalog: CatalogFile) -> Self {
        Self { catalog }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read module catalog at {}", path.display()))?;
        let catalog: CatalogFile = serde_json::from_str(&raw)
            .with_context(|| format!("Module catalog at {} is not valid JSON", path.display()))?;
        info!(
            "Loaded {} catalog modules and {} thesis modules from {}",
            catalog.modules.len(),
            catalog.thesis_sequence.len(),
            path.display()
        );
        Ok(Self::new(catalog))
    }

    /// Small built-in catalog used when no `CATALOG_PATH` is configured.
    pub fn builtin() -> Self {
        Self::new(builtin_catalog())
    }
}

#[async_trait]
impl ModuleSource for CatalogModuleSource {
    async fn modules_for_occupations(
        &self,
        occupations: &[String],
    ) -> Result<Vec<OccupationModuleMatch>, AppError> {
        let mut matches = Vec::new();
        for occupation in occupations {
            let mut found: Vec<OccupationModuleMatch> = self
                .catalog
                .modules
                .iter()
                .filter_map(|m| {
                    m.supported_occupations
                        .iter()
                        .find(|s| s.occupation.eq_ignore_ascii_case(occupation))
                        .map(|s| OccupationModuleMatch {
                            occupation: occupation.clone(),
                            module: m.module.clone(),
                            supported_skills: s.supported_skills.clone(),
                        })
                })
                .collect();
            found.sort_by(|a, b| b.supported_skills.len().cmp(&a.supported_skills.len()));
            matches.extend(found);
        }
        Ok(matches)
    }

    async fn catalog(&self) -> Result<Vec<CatalogModule>, AppError> {
        Ok(self.catalog.modules.clone())
    }

    async fn thesis_sequence(&self) -> Result<Vec<CandidateModule>, AppError> {
        Ok(self.catalog.thesis_sequence.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in catalog
// ────────────────────────────────────────────────────────────────────────────

fn candidate(title: &str, module_type: ModuleType, season: Season, credits: u32) -> CandidateModule {
    CandidateModule {
        title: title.to_string(),
        module_type,
        season,
        credits,
        description: String::new(),
        relevance_score: None,
    }
}

fn catalog_entry(title: &str, module_type: ModuleType, season: Season) -> CatalogModule {
    CatalogModule {
        module: candidate(title, module_type, season, 6),
        lecturers: vec![],
        teaching_days: vec![],
        assessment_type: None,
        oral_assessment: false,
        project_work: false,
        supported_occupations: vec![],
    }
}

impl CatalogModule {
    fn supports(mut self, occupation: &str, skills: &[&str]) -> Self {
        self.supported_occupations.push(OccupationSupport {
            occupation: occupation.to_string(),
            supported_skills: skills.iter().map(|s| s.to_string()).collect(),
        });
        self
    }
}

fn builtin_catalog() -> CatalogFile {
    use ModuleType::{Elective, Mandatory};
    use Season::{Autumn, Spring};

    let modules = vec![
        catalog_entry("Alignment of Business and IT", Mandatory, Autumn)
            .supports("ICT business analyst", &["align IT with business strategy"]),
        catalog_entry("Business Intelligence", Mandatory, Spring)
            .supports("data analyst", &["build dashboards", "model data warehouses"])
            .supports("ICT business analyst", &["analyse business requirements"]),
        catalog_entry("Business Process Management", Mandatory, Autumn)
            .supports("ICT business analyst", &["model business processes"]),
        catalog_entry("Strategic Business Innovation", Mandatory, Spring)
            .supports("ICT project manager", &["manage innovation portfolios"]),
        catalog_entry("Data Mining", Elective, Autumn).supports(
            "data analyst",
            &["apply statistical analysis", "use data mining methods", "clean data"],
        ),
        catalog_entry("Cloud Computing", Elective, Spring)
            .supports("software developer", &["deploy cloud services", "automate infrastructure"]),
        catalog_entry("Software Engineering", Elective, Autumn)
            .supports("software developer", &["design software architecture"]),
        catalog_entry("IT Project Management", Elective, Spring)
            .supports("ICT project manager", &["plan projects", "manage stakeholders"]),
        catalog_entry("Enterprise Architecture", Elective, Autumn)
            .supports("ICT business analyst", &["model enterprise architecture"]),
        catalog_entry("Digital Marketing", Elective, Autumn)
            .supports("online marketer", &["run online campaigns", "analyse web traffic"]),
        catalog_entry("Information Security", Elective, Spring)
            .supports("ICT security manager", &["assess security risks"]),
        catalog_entry("Machine Learning", Elective, Spring)
            .supports("data scientist", &["train predictive models", "evaluate models"]),
    ];

    let thesis_sequence = vec![
        candidate("Research Methods in Information Systems", Mandatory, Spring, 6),
        candidate("Master Thesis Proposal", Mandatory, Autumn, 6),
        candidate("Master Thesis", Mandatory, Spring, 18),
    ];

    CatalogFile {
        modules,
        thesis_sequence,
    }
}
