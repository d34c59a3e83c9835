use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::occupations::{RankingOptions, RankingWeights};
use crate::planning::models::{PlannerSettings, Season, DEFAULT_MANDATORY_MODULES};
use crate::retrieval::models::BalancedWeights;

/// Application configuration loaded from environment variables.
/// Every variable is optional; unset ones fall back to the programme defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON module catalog. Unset means the built-in catalog is served.
    pub catalog_path: Option<PathBuf>,
    pub ranking: RankingOptions,
    pub planner: PlannerSettings,
    pub first_season: Season,
    pub balanced: BalancedWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            catalog_path: None,
            ranking: RankingOptions::default(),
            planner: PlannerSettings::default(),
            first_season: Season::Spring,
            balanced: BalancedWeights::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let weights = RankingWeights {
            duration: parse_or(&lookup, "RANKING_WEIGHT_DURATION", defaults.ranking.weights.duration)?,
            recency: parse_or(&lookup, "RANKING_WEIGHT_RECENCY", defaults.ranking.weights.recency)?,
            employment_type: parse_or(
                &lookup,
                "RANKING_WEIGHT_EMPLOYMENT",
                defaults.ranking.weights.employment_type,
            )?,
        };
        let ranking = RankingOptions {
            weights,
            max_experience_years: parse_or(
                &lookup,
                "MAX_EXPERIENCE_YEARS",
                defaults.ranking.max_experience_years,
            )?,
        };
        ranking
            .validate()
            .context("Ranking configuration is invalid")?;

        let mandatory_titles = match lookup("MANDATORY_MODULES") {
            Some(raw) => raw
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_MANDATORY_MODULES.iter().map(|t| t.to_string()).collect(),
        };
        let planner = PlannerSettings {
            graduation_credits: parse_or(&lookup, "GRADUATION_CREDITS", defaults.planner.graduation_credits)?,
            main_plan_credits: parse_or(&lookup, "MAIN_PLAN_CREDITS", defaults.planner.main_plan_credits)?,
            module_credits: parse_or(&lookup, "MODULE_CREDITS", defaults.planner.module_credits)?,
            min_semesters: parse_or(&lookup, "MIN_SEMESTERS", defaults.planner.min_semesters)?,
            max_semesters: parse_or(&lookup, "MAX_SEMESTERS", defaults.planner.max_semesters)?,
            mandatory_titles,
        };
        if planner.module_credits == 0 || planner.main_plan_credits % planner.module_credits != 0 {
            return Err(anyhow!(
                "MAIN_PLAN_CREDITS ({}) must be a multiple of MODULE_CREDITS ({})",
                planner.main_plan_credits,
                planner.module_credits
            ));
        }
        if planner.min_semesters == 0 {
            return Err(anyhow!("MIN_SEMESTERS must be at least 1"));
        }
        if planner.min_semesters > planner.max_semesters {
            return Err(anyhow!(
                "MIN_SEMESTERS ({}) must not exceed MAX_SEMESTERS ({})",
                planner.min_semesters,
                planner.max_semesters
            ));
        }

        let first_season = match lookup("FIRST_SEMESTER_SEASON") {
            Some(raw) => Season::parse(&raw)
                .with_context(|| format!("FIRST_SEMESTER_SEASON must be spring or autumn (got '{raw}')"))?,
            None => defaults.first_season,
        };

        let balanced = BalancedWeights {
            goal_match_weight: parse_or(
                &lookup,
                "BALANCED_GOAL_MATCH_WEIGHT",
                defaults.balanced.goal_match_weight,
            )?,
            preference_divisor: parse_or(
                &lookup,
                "BALANCED_PREFERENCE_DIVISOR",
                defaults.balanced.preference_divisor,
            )?,
        };
        if balanced.preference_divisor <= 0.0 {
            return Err(anyhow!("BALANCED_PREFERENCE_DIVISOR must be positive"));
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", defaults.port)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            catalog_path: lookup("CATALOG_PATH").map(PathBuf::from),
            ranking,
            planner,
            first_season,
            balanced,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
