//! Loading the board and moving deals between stages.

use std::collections::BTreeMap;

use crm_record_client::Record;
use crm_repository::{ListOptions, Repository, RepositoryError, Result};
use crm_schema::crm::{CONTACT, DEAL, STAGE};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::aggregate::{PipelineSnapshot, group_by_stage};
use crate::model::{ContactSummary, Deal, Stage};

/// Field on a deal holding its stage reference.
pub const STAGE_FIELD: &str = "stage_c";

/// A consistent view of stages, deals and contacts taken from one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineBoard {
    pub snapshot: PipelineSnapshot,
    pub contacts: BTreeMap<i64, ContactSummary>,
}

impl PipelineBoard {
    pub fn new(stages: &[Stage], deals: &[Deal], contacts: Vec<ContactSummary>) -> Self {
        Self {
            snapshot: group_by_stage(deals, stages),
            contacts: contacts.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn contact_for(&self, deal: &Deal) -> Option<&ContactSummary> {
        deal.contact_id.and_then(|id| self.contacts.get(&id))
    }

    pub fn total(&self) -> f64 {
        self.snapshot.total()
    }
}

/// Pipeline operations over a [`Repository`].
///
/// No deal state is cached between calls: every move is followed by a full
/// reload by the caller, or by [`Pipeline::move_and_reload`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    repo: Repository,
}

impl Pipeline {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Active stages in board order.
    pub async fn stages(&self) -> Result<Vec<Stage>> {
        let records = self.repo.list_all(STAGE, &ListOptions::new()).await?;
        Ok(records.iter().map(Stage::from_record).collect())
    }

    pub async fn deals(&self) -> Result<Vec<Deal>> {
        let records = self.repo.list_all(DEAL, &ListOptions::new()).await?;
        Ok(records.iter().map(Deal::from_record).collect())
    }

    async fn contacts(&self) -> Result<Vec<ContactSummary>> {
        let records = self.repo.list_all(CONTACT, &ListOptions::new()).await?;
        Ok(records.iter().map(ContactSummary::from_record).collect())
    }

    /// Stages and deals grouped, without contacts.
    pub async fn snapshot(&self) -> Result<PipelineSnapshot> {
        let (stages, deals) = tokio::try_join!(self.stages(), self.deals())?;
        Ok(group_by_stage(&deals, &stages))
    }

    /// Load stages, deals and contacts together.
    ///
    /// All three must succeed; a single failure fails the whole load and no
    /// partial board is produced.
    pub async fn load_board(&self) -> Result<PipelineBoard> {
        let (stages, deals, contacts) =
            tokio::try_join!(self.stages(), self.deals(), self.contacts())?;
        let board = PipelineBoard::new(&stages, &deals, contacts);
        tracing::info!(
            stages = board.snapshot.buckets.len(),
            deals = board.snapshot.deal_count(),
            unassigned = board.snapshot.unassigned.len(),
            "pipeline board loaded"
        );
        Ok(board)
    }

    /// Point deal `deal_id` at `target_stage_id`.
    ///
    /// A blank target is a validation error and sends nothing. Otherwise the
    /// target is not checked against known stages; the backend rejects
    /// unknown ones. Errors are returned exactly as the repository raised
    /// them.
    pub async fn move_deal(&self, deal_id: i64, target_stage_id: &str) -> Result<Record> {
        let target_stage_id = target_stage_id.trim();
        if target_stage_id.is_empty() {
            return Err(RepositoryError::validation(format!(
                "deal #{deal_id} needs a target stage"
            )));
        }
        let mut fields = Map::new();
        fields.insert(STAGE_FIELD.to_string(), Value::from(target_stage_id));
        let record = self.repo.update(DEAL, deal_id, &fields).await?;
        tracing::info!(deal_id, stage = target_stage_id, "deal moved");
        Ok(record)
    }

    /// Move a deal, then replace `board` with a fresh load.
    ///
    /// `board` is only replaced after both steps succeed.
    pub async fn move_and_reload(
        &self,
        board: &mut PipelineBoard,
        deal_id: i64,
        target_stage_id: &str,
    ) -> Result<()> {
        self.move_deal(deal_id, target_stage_id).await?;
        *board = self.load_board().await?;
        Ok(())
    }
}
