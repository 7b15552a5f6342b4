//! Workflow sequencing
//!
//! [`WorkflowState`] is the persisted record of one API's progress through
//! the phases. Every transition goes through this type, which enforces:
//!
//! - phases are entered in scheduled order and never skipped
//! - a phase cannot be left while its checklist has open items
//! - document phases cannot be left before their artifact is recorded
//! - each appendix is merged at most once
//!
//! Appendix phases are scheduled from [`ComplexityFlags`] in the fixed order
//! auth, pagination, incremental, retry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use dltforge_utils::error::WorkflowError;
use dltforge_utils::types::{APPENDIX_ORDER, WorkflowPhase};

/// Current on-disk state format.
pub const STATE_SCHEMA_VERSION: u32 = 1;

/// Complexity flags discovered during research.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityFlags {
    #[serde(default)]
    pub has_custom_auth: bool,
    #[serde(default)]
    pub has_mixed_pagination: bool,
    #[serde(default)]
    pub has_compound_cursor: bool,
    #[serde(default)]
    pub has_custom_retry_logic: bool,
}

impl ComplexityFlags {
    /// Whether the flag behind an appendix phase is set.
    #[must_use]
    pub const fn schedules(&self, phase: WorkflowPhase) -> bool {
        match phase {
            WorkflowPhase::AppendixAuth => self.has_custom_auth,
            WorkflowPhase::AppendixPagination => self.has_mixed_pagination,
            WorkflowPhase::AppendixIncremental => self.has_compound_cursor,
            WorkflowPhase::AppendixRetry => self.has_custom_retry_logic,
            _ => false,
        }
    }

    /// Appendix phases selected by these flags, in scheduling order.
    #[must_use]
    pub fn scheduled_appendices(&self) -> Vec<WorkflowPhase> {
        APPENDIX_ORDER
            .into_iter()
            .filter(|phase| self.schedules(*phase))
            .collect()
    }
}

/// Where the workflow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WorkflowStage {
    Phase(WorkflowPhase),
    Complete,
}

impl WorkflowStage {
    #[must_use]
    pub const fn phase(&self) -> Option<WorkflowPhase> {
        match self {
            Self::Phase(phase) => Some(*phase),
            Self::Complete => None,
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phase(phase) => f.write_str(phase.as_str()),
            Self::Complete => f.write_str("COMPLETE"),
        }
    }
}

impl From<WorkflowStage> for String {
    fn from(stage: WorkflowStage) -> Self {
        stage.to_string()
    }
}

impl TryFrom<String> for WorkflowStage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("complete") {
            return Ok(Self::Complete);
        }
        value
            .parse::<WorkflowPhase>()
            .map(Self::Phase)
            .map_err(|_| format!("unknown workflow stage '{value}'"))
    }
}

/// One checklist entry. `done` only ever moves from false to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChecklistItem {
    pub phase: WorkflowPhase,
    pub description: String,
    pub done: bool,
}

/// A document written or updated by a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub path: String,
    pub blake3: String,
    pub recorded_at: DateTime<Utc>,
}

/// Persisted workflow state for one API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    schema_version: u32,
    api_name: String,
    flags: ComplexityFlags,
    stage: WorkflowStage,
    visited: BTreeSet<WorkflowPhase>,
    completed: BTreeSet<WorkflowPhase>,
    #[serde(default)]
    checklist: BTreeMap<WorkflowPhase, Vec<TaskChecklistItem>>,
    #[serde(default)]
    artifacts: BTreeMap<WorkflowPhase, ArtifactRecord>,
    #[serde(default)]
    merged_appendices: BTreeSet<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Serializable snapshot for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStatus {
    pub api_name: String,
    pub stage: WorkflowStage,
    pub flags: ComplexityFlags,
    pub scheduled: Vec<WorkflowPhase>,
    pub completed: Vec<WorkflowPhase>,
    pub pending_tasks: BTreeMap<WorkflowPhase, Vec<String>>,
    pub merged_appendices: Vec<String>,
    pub artifacts: BTreeMap<WorkflowPhase, ArtifactRecord>,
}

impl WorkflowState {
    /// Fresh state in the RESEARCH phase with no flags set.
    #[must_use]
    pub fn new(api_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            api_name: api_name.into(),
            flags: ComplexityFlags::default(),
            stage: WorkflowStage::Phase(WorkflowPhase::Research),
            visited: BTreeSet::from([WorkflowPhase::Research]),
            completed: BTreeSet::new(),
            checklist: BTreeMap::new(),
            artifacts: BTreeMap::new(),
            merged_appendices: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    #[must_use]
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    #[must_use]
    pub fn flags(&self) -> ComplexityFlags {
        self.flags
    }

    #[must_use]
    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    #[must_use]
    pub fn current_phase(&self) -> Option<WorkflowPhase> {
        self.stage.phase()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stage == WorkflowStage::Complete
    }

    #[must_use]
    pub fn visited(&self) -> &BTreeSet<WorkflowPhase> {
        &self.visited
    }

    #[must_use]
    pub fn completed(&self) -> &BTreeSet<WorkflowPhase> {
        &self.completed
    }

    #[must_use]
    pub fn artifact(&self, phase: WorkflowPhase) -> Option<&ArtifactRecord> {
        self.artifacts.get(&phase)
    }

    #[must_use]
    pub fn merged_appendices(&self) -> &BTreeSet<String> {
        &self.merged_appendices
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the complexity flags.
    ///
    /// Only allowed while in RESEARCH or PLAN; once an appendix phase has
    /// been entered the schedule is fixed.
    pub fn set_flags(&mut self, flags: ComplexityFlags) -> Result<(), WorkflowError> {
        match self.stage {
            WorkflowStage::Phase(WorkflowPhase::Research | WorkflowPhase::Plan) => {}
            stage => {
                return Err(WorkflowError::FlagsLocked {
                    phase: stage.to_string(),
                });
            }
        }
        if self.flags != flags {
            tracing::info!(
                api_name = %self.api_name,
                appendices = ?flags.scheduled_appendices(),
                "Complexity flags updated"
            );
            self.flags = flags;
            self.touch();
        }
        Ok(())
    }

    /// Every phase this workflow will pass through, in order.
    #[must_use]
    pub fn scheduled_phases(&self) -> Vec<WorkflowPhase> {
        let mut phases = vec![WorkflowPhase::Research, WorkflowPhase::Plan];
        phases.extend(self.flags.scheduled_appendices());
        phases.extend([WorkflowPhase::Implement, WorkflowPhase::Test]);
        phases
    }

    #[must_use]
    pub fn is_scheduled(&self, phase: WorkflowPhase) -> bool {
        !phase.is_appendix() || self.flags.schedules(phase)
    }

    /// Scheduled phase following `phase`, if any.
    #[must_use]
    pub fn next_phase(&self, phase: WorkflowPhase) -> Option<WorkflowPhase> {
        self.scheduled_phases().into_iter().find(|p| *p > phase)
    }

    /// Checklist of `phase`, in insertion order.
    #[must_use]
    pub fn tasks(&self, phase: WorkflowPhase) -> &[TaskChecklistItem] {
        self.checklist.get(&phase).map_or(&[], Vec::as_slice)
    }

    /// Open checklist items of `phase`.
    #[must_use]
    pub fn pending_tasks(&self, phase: WorkflowPhase) -> Vec<&TaskChecklistItem> {
        self.tasks(phase).iter().filter(|task| !task.done).collect()
    }

    /// Append a checklist item and return its 1-based number.
    ///
    /// Items can be added to the current phase or to a scheduled phase that
    /// has not been completed yet.
    pub fn add_task(
        &mut self,
        phase: WorkflowPhase,
        description: &str,
    ) -> Result<usize, WorkflowError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(WorkflowError::EmptyTask);
        }
        if self.is_complete() {
            return Err(WorkflowError::AlreadyComplete);
        }
        if !self.is_scheduled(phase) {
            return Err(WorkflowError::PhaseNotScheduled { phase });
        }
        if self.completed.contains(&phase) {
            return Err(WorkflowError::PhaseAlreadyCompleted { phase });
        }

        let tasks = self.checklist.entry(phase).or_default();
        tasks.push(TaskChecklistItem {
            phase,
            description: description.to_string(),
            done: false,
        });
        let number = tasks.len();
        tracing::debug!(api_name = %self.api_name, phase = %phase, number, "Task added");
        self.touch();
        Ok(number)
    }

    /// Mark task `number` (1-based) of `phase` as done.
    pub fn complete_task(&mut self, phase: WorkflowPhase, number: usize) -> Result<(), WorkflowError> {
        let task = number
            .checked_sub(1)
            .and_then(|index| self.checklist.get_mut(&phase)?.get_mut(index))
            .ok_or(WorkflowError::TaskNotFound {
                phase,
                index: number,
            })?;
        if !task.done {
            task.done = true;
            tracing::debug!(api_name = %self.api_name, phase = %phase, number, "Task done");
            self.touch();
        }
        Ok(())
    }

    fn require_current(&self, phase: WorkflowPhase) -> Result<(), WorkflowError> {
        if self.stage == WorkflowStage::Phase(phase) {
            Ok(())
        } else {
            Err(WorkflowError::NotInPhase {
                expected: phase,
                actual: self.stage.to_string(),
            })
        }
    }

    /// Record the document written by the current phase.
    ///
    /// A new PLAN artifact is a freshly written main spec without any
    /// appendix, so previous merges and appendix records are forgotten and
    /// every scheduled appendix has to be merged again.
    pub fn record_artifact(
        &mut self,
        phase: WorkflowPhase,
        path: impl Into<String>,
        blake3: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        self.require_current(phase)?;
        let record = ArtifactRecord {
            path: path.into(),
            blake3: blake3.into(),
            recorded_at: Utc::now(),
        };
        tracing::info!(
            api_name = %self.api_name,
            phase = %phase,
            path = %record.path,
            "Artifact recorded"
        );
        self.artifacts.insert(phase, record);
        if phase == WorkflowPhase::Plan {
            self.forget_merges();
        }
        self.touch();
        Ok(())
    }

    fn forget_merges(&mut self) {
        if self.merged_appendices.is_empty() {
            return;
        }
        tracing::info!(
            api_name = %self.api_name,
            appendices = ?self.merged_appendices,
            "Main spec rewritten; appendices must be merged again"
        );
        self.merged_appendices.clear();
        self.artifacts.retain(|phase, _| !phase.is_appendix());
    }

    /// Check that `appendix_id` may be merged during `phase`.
    pub fn check_merge(&self, phase: WorkflowPhase, appendix_id: &str) -> Result<(), WorkflowError> {
        self.require_current(phase)?;
        if self.merged_appendices.contains(appendix_id) {
            return Err(WorkflowError::AppendixAlreadyMerged {
                appendix: appendix_id.to_string(),
            });
        }
        Ok(())
    }

    /// Record that `appendix_id` was merged into the document at `path`.
    pub fn record_merge(
        &mut self,
        phase: WorkflowPhase,
        appendix_id: &str,
        path: impl Into<String>,
        blake3: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        self.check_merge(phase, appendix_id)?;
        self.merged_appendices.insert(appendix_id.to_string());
        self.record_artifact(phase, path, blake3)
    }

    /// A phase counts as satisfied once completed with no open items.
    fn is_satisfied(&self, phase: WorkflowPhase) -> bool {
        self.completed.contains(&phase) && self.pending_tasks(phase).is_empty()
    }

    /// Scheduled prerequisites of `phase` that are not yet satisfied.
    #[must_use]
    pub fn missing_prerequisites(&self, phase: WorkflowPhase) -> Vec<WorkflowPhase> {
        phase
            .prerequisites()
            .iter()
            .copied()
            .filter(|dep| self.is_scheduled(*dep) && !self.is_satisfied(*dep))
            .collect()
    }

    fn ensure_can_leave(&self, phase: WorkflowPhase) -> Result<(), WorkflowError> {
        let pending: Vec<String> = self
            .pending_tasks(phase)
            .into_iter()
            .map(|task| task.description.clone())
            .collect();
        if !pending.is_empty() {
            return Err(WorkflowError::IncompleteTasks { phase, pending });
        }
        if phase.produces_document() && !self.artifacts.contains_key(&phase) {
            return Err(WorkflowError::MissingArtifact { phase });
        }
        Ok(())
    }

    /// Complete the current phase and move to the next scheduled one.
    ///
    /// Leaving TEST completes the workflow.
    pub fn advance(&mut self) -> Result<WorkflowStage, WorkflowError> {
        let WorkflowStage::Phase(current) = self.stage else {
            return Err(WorkflowError::AlreadyComplete);
        };
        self.ensure_can_leave(current)?;

        let next = self.next_phase(current);
        if let Some(next) = next {
            let missing: Vec<WorkflowPhase> = self
                .missing_prerequisites(next)
                .into_iter()
                .filter(|dep| *dep != current)
                .collect();
            if !missing.is_empty() {
                return Err(WorkflowError::PrerequisiteIncomplete {
                    phase: next,
                    missing,
                });
            }
        }

        self.completed.insert(current);
        self.stage = match next {
            Some(next) => {
                self.visited.insert(next);
                WorkflowStage::Phase(next)
            }
            None => WorkflowStage::Complete,
        };
        tracing::info!(
            api_name = %self.api_name,
            from = %current,
            to = %self.stage,
            "Workflow advanced"
        );
        self.touch();
        Ok(self.stage)
    }

    /// Move to `phase`.
    ///
    /// Forward moves are only allowed to the next scheduled phase and go
    /// through [`advance`](Self::advance). Backward moves return to any
    /// visited phase and reopen it together with every later phase, so
    /// that new checklist items can be added.
    pub fn enter(&mut self, phase: WorkflowPhase) -> Result<WorkflowStage, WorkflowError> {
        if !self.is_scheduled(phase) {
            return Err(WorkflowError::PhaseNotScheduled { phase });
        }

        let current = self.current_phase();
        if current == Some(phase) {
            return Ok(self.stage);
        }

        let is_backward = current.is_none_or(|current| phase < current);
        if is_backward {
            if !self.visited.contains(&phase) {
                return Err(WorkflowError::PrerequisiteIncomplete {
                    phase,
                    missing: self.missing_prerequisites(phase),
                });
            }
            self.completed.retain(|done| *done < phase);
            self.stage = WorkflowStage::Phase(phase);
            tracing::info!(api_name = %self.api_name, phase = %phase, "Returned to phase");
            self.touch();
            return Ok(self.stage);
        }

        if current.and_then(|current| self.next_phase(current)) == Some(phase) {
            return self.advance();
        }

        let skipped: Vec<WorkflowPhase> = self
            .scheduled_phases()
            .into_iter()
            .filter(|p| *p < phase && !self.is_satisfied(*p))
            .collect();
        Err(WorkflowError::PrerequisiteIncomplete {
            phase,
            missing: skipped,
        })
    }

    /// Snapshot for status output.
    #[must_use]
    pub fn status(&self) -> WorkflowStatus {
        let pending_tasks = self
            .checklist
            .keys()
            .filter_map(|phase| {
                let pending: Vec<String> = self
                    .pending_tasks(*phase)
                    .into_iter()
                    .map(|task| task.description.clone())
                    .collect();
                (!pending.is_empty()).then_some((*phase, pending))
            })
            .collect();

        WorkflowStatus {
            api_name: self.api_name.clone(),
            stage: self.stage,
            flags: self.flags,
            scheduled: self.scheduled_phases(),
            completed: self.completed.iter().copied().collect(),
            pending_tasks,
            merged_appendices: self.merged_appendices.iter().cloned().collect(),
            artifacts: self.artifacts.clone(),
        }
    }
}
