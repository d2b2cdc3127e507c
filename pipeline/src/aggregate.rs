//! Stage bucketing and totals.

use serde::Serialize;

use crate::model::{Deal, Stage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageBucket {
    pub stage: Stage,
    pub deals: Vec<Deal>,
    pub total: f64,
}

/// Deals grouped per stage, in stage order.
///
/// Every stage has a bucket, empty or not. Deals whose stage reference
/// matches no stage are kept aside in `unassigned`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineSnapshot {
    pub buckets: Vec<StageBucket>,
    pub unassigned: Vec<Deal>,
}

impl PipelineSnapshot {
    pub fn bucket(&self, stage_id: &str) -> Option<&StageBucket> {
        self.buckets.iter().find(|b| b.stage.id == stage_id)
    }

    /// Sum of every bucket total.
    pub fn total(&self) -> f64 {
        self.buckets.iter().fold(0.0, |acc, b| acc + b.total)
    }

    pub fn deal_count(&self) -> usize {
        self.buckets.iter().map(|b| b.deals.len()).sum()
    }

    /// Bucket holding `deal_id`, if any.
    pub fn stage_of(&self, deal_id: i64) -> Option<&Stage> {
        self.buckets
            .iter()
            .find(|b| b.deals.iter().any(|d| d.id == deal_id))
            .map(|b| &b.stage)
    }
}

/// Sum of deal values; a missing value counts as 0.
pub fn stage_total(deals: &[Deal]) -> f64 {
    deals.iter().filter_map(|d| d.value).fold(0.0, |acc, v| acc + v)
}

/// Group `deals` under `stages`.
///
/// A deal lands in the first stage whose id equals its reference, else the
/// first stage whose name does. Input deal order is kept within a bucket.
/// A repeated stage id keeps only its first occurrence.
pub fn group_by_stage(deals: &[Deal], stages: &[Stage]) -> PipelineSnapshot {
    let mut buckets: Vec<StageBucket> = Vec::with_capacity(stages.len());
    for stage in stages {
        if buckets.iter().any(|b| b.stage.id == stage.id) {
            tracing::warn!(stage_id = %stage.id, "duplicate stage id ignored");
            continue;
        }
        buckets.push(StageBucket {
            stage: stage.clone(),
            deals: Vec::new(),
            total: 0.0,
        });
    }

    let mut unassigned = Vec::new();
    for deal in deals {
        let slot = deal.stage.as_ref().and_then(|stage_ref| {
            buckets
                .iter()
                .position(|b| stage_ref.matches_id(&b.stage))
                .or_else(|| buckets.iter().position(|b| stage_ref.matches_name(&b.stage)))
        });
        match slot {
            Some(index) => buckets[index].deals.push(deal.clone()),
            None => {
                tracing::debug!(deal_id = deal.id, stage = ?deal.stage, "deal matches no stage");
                unassigned.push(deal.clone());
            }
        }
    }

    for bucket in &mut buckets {
        bucket.total = stage_total(&bucket.deals);
    }

    PipelineSnapshot {
        buckets,
        unassigned,
    }
}
