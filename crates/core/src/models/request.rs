use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::errors::CoreError;

use super::crisis::{default_catalogue, CrisisEvent};
use super::position::{normalize_ticker, Position, PositionInput};
use super::price::{DailyPriceRecord, LatestQuote};

/// A validated position together with the provider symbol it resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPosition {
    pub position: Position,
    pub symbol: String,
}

/// Immutable input of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    positions: Vec<ResolvedPosition>,
    drop_threshold_pct: f64,
    crises: Vec<CrisisEvent>,
}

impl AnalysisRequest {
    /// Validate every input and resolve tickers.
    ///
    /// Fails on the first missing field, non-positive amount or duplicate id;
    /// nothing is partially accepted.
    pub fn build(
        inputs: &[PositionInput],
        exchange_suffix: Option<&str>,
        drop_threshold_pct: f64,
    ) -> Result<Self, CoreError> {
        if inputs.is_empty() {
            return Err(CoreError::ValidationError("No positions entered".into()));
        }
        validate_threshold(drop_threshold_pct)?;

        let mut seen = HashSet::new();
        let mut positions = Vec::with_capacity(inputs.len());
        for input in inputs {
            if !seen.insert(input.id) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate position id {}",
                    input.id
                )));
            }
            let position = input.validate()?;
            let symbol = normalize_ticker(&position.ticker, exchange_suffix);
            positions.push(ResolvedPosition { position, symbol });
        }

        Ok(Self {
            positions,
            drop_threshold_pct,
            crises: default_catalogue(),
        })
    }

    /// Replace the crisis catalogue (the default is [`default_catalogue`]).
    pub fn with_crises(mut self, crises: Vec<CrisisEvent>) -> Self {
        self.crises = crises;
        self
    }

    pub fn positions(&self) -> &[ResolvedPosition] {
        &self.positions
    }

    pub fn drop_threshold_pct(&self) -> f64 {
        self.drop_threshold_pct
    }

    pub fn crises(&self) -> &[CrisisEvent] {
        &self.crises
    }

    /// Distinct provider symbols, in first-seen order.
    pub fn symbols(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.positions
            .iter()
            .filter(|p| seen.insert(p.symbol.as_str()))
            .map(|p| p.symbol.clone())
            .collect()
    }
}

/// Threshold must be a positive percentage no larger than 100.
pub fn validate_threshold(drop_threshold_pct: f64) -> Result<(), CoreError> {
    if !drop_threshold_pct.is_finite() || drop_threshold_pct <= 0.0 || drop_threshold_pct > 100.0 {
        return Err(CoreError::ValidationError(format!(
            "Drop threshold must be in (0, 100], got {drop_threshold_pct}"
        )));
    }
    Ok(())
}

/// Market data already fetched for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Symbol → daily history, ascending by date
    pub histories: HashMap<String, Vec<DailyPriceRecord>>,
    /// Symbol → live quote; missing entries fall back to the history
    pub quotes: HashMap<String, LatestQuote>,
    /// USD per EUR; `None` when the rate could not be fetched
    pub usd_per_eur: Option<f64>,
}

impl MarketSnapshot {
    pub fn history(&self, symbol: &str) -> &[DailyPriceRecord] {
        self.histories.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The FX rate if it is usable (finite and positive).
    pub fn fx_rate(&self) -> Option<f64> {
        self.usd_per_eur.filter(|r| r.is_finite() && *r > 0.0)
    }
}
