// Workflow Controller
//
// Three-step wizard: Input -> Optimize -> Generate. `WorkflowMachine` is the
// pure transition function; `WorkflowController` performs the remote calls
// and feeds their results back as events.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::download::download_asset;
use super::history::HistoryStore;
use super::media::{EntitlementHost, MediaBackend, MediaError, MediaResult};
use crate::models::{
    generating_status, AssetRef, HistoryItem, HistoryLog, MediaType, PromptConfig, Step,
    WorkflowState, STATUS_GENERATE_CANCELLED, STATUS_GENERATE_FAILED, STATUS_KEY_REQUIRED,
    STATUS_OPTIMIZE_FAILED, STATUS_OPTIMIZING,
};

// ============================================================================
// Events and outcomes
// ============================================================================

/// Why a generation attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The active key lacks video entitlement
    KeyRequired,
    Cancelled,
    Generic,
}

impl FailureKind {
    pub fn status(&self) -> &'static str {
        match self {
            FailureKind::KeyRequired => STATUS_KEY_REQUIRED,
            FailureKind::Cancelled => STATUS_GENERATE_CANCELLED,
            FailureKind::Generic => STATUS_GENERATE_FAILED,
        }
    }

    fn from_error(err: &MediaError) -> Self {
        if err.is_cancelled() {
            FailureKind::Cancelled
        } else if err.is_entitlement_missing() {
            FailureKind::KeyRequired
        } else {
            FailureKind::Generic
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    ConfigEdited(PromptConfig),
    OptimizeStarted,
    OptimizeSucceeded(String),
    OptimizeFailed,
    GenerateStarted,
    GenerateSucceeded(AssetRef),
    GenerateFailed(FailureKind),
    Back,
    Reset,
}

/// Why a request was refused without contacting the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BlankConcept,
    /// Another operation is in progress
    Busy,
    /// The action is not available from the current step
    WrongStep(Step),
}

impl Rejection {
    pub fn message(&self) -> String {
        match self {
            Rejection::BlankConcept => "Enter a concept first.".to_string(),
            Rejection::Busy => "Still working on the previous request.".to_string(),
            Rejection::WrongStep(step) => format!("Not available at step {}.", step),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Rejected(Rejection),
    Advanced(Step),
    Failed(FailureKind),
}

// ============================================================================
// Machine
// ============================================================================

/// Step pointer plus session state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowMachine {
    step: Step,
    state: WorkflowState,
}

impl WorkflowMachine {
    pub fn new(config: PromptConfig) -> Self {
        Self {
            step: Step::Input,
            state: WorkflowState::new(config),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn apply(mut self, event: WorkflowEvent) -> Self {
        match event {
            WorkflowEvent::ConfigEdited(config) => {
                self.state.config = config;
            }
            WorkflowEvent::OptimizeStarted => {
                self.state.is_loading = true;
                self.state.status = STATUS_OPTIMIZING.to_string();
            }
            WorkflowEvent::OptimizeSucceeded(prompt) => {
                self.state.optimized_prompt = prompt;
                self.state.is_loading = false;
                self.state.status.clear();
                self.step = Step::Optimize;
            }
            WorkflowEvent::OptimizeFailed => {
                self.state.is_loading = false;
                self.state.status = STATUS_OPTIMIZE_FAILED.to_string();
            }
            WorkflowEvent::GenerateStarted => {
                self.state.is_loading = true;
                self.state.status = generating_status(self.state.config.media_type);
            }
            WorkflowEvent::GenerateSucceeded(asset) => {
                self.state.generated = Some(asset);
                self.state.is_loading = false;
                self.state.status.clear();
                self.step = Step::Generate;
            }
            WorkflowEvent::GenerateFailed(kind) => {
                self.state.is_loading = false;
                self.state.status = kind.status().to_string();
            }
            WorkflowEvent::Back => {
                if self.step == Step::Optimize {
                    self.step = Step::Input;
                }
            }
            WorkflowEvent::Reset => {
                self.step = Step::Input;
                self.state = WorkflowState::new(self.state.config);
            }
        }
        self
    }

    fn admit_optimize(&self) -> Result<(), Rejection> {
        if self.state.is_loading {
            return Err(Rejection::Busy);
        }
        if self.step != Step::Input {
            return Err(Rejection::WrongStep(self.step));
        }
        if !self.state.config.has_concept() {
            return Err(Rejection::BlankConcept);
        }
        Ok(())
    }

    fn admit_generate(&self) -> Result<(), Rejection> {
        if self.state.is_loading {
            return Err(Rejection::Busy);
        }
        if self.step != Step::Optimize {
            return Err(Rejection::WrongStep(self.step));
        }
        Ok(())
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct WorkflowController<B: MediaBackend> {
    machine: WorkflowMachine,
    backend: B,
    history: HistoryStore,
    log: HistoryLog,
    host: Arc<dyn EntitlementHost>,
    /// Token for the next or running generation; replaced once fired
    cancel: CancellationToken,
    last_error: Option<String>,
}

impl<B: MediaBackend> WorkflowController<B> {
    /// Start a session; the persisted history is loaded once here
    pub fn new(backend: B, history: HistoryStore, host: Arc<dyn EntitlementHost>) -> Self {
        let log = history.load();
        Self {
            machine: WorkflowMachine::default(),
            backend,
            history,
            log,
            host,
            cancel: CancellationToken::new(),
            last_error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.machine.step()
    }

    pub fn state(&self) -> &WorkflowState {
        self.machine.state()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Message of the most recent backend failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Handle that aborts the next or running generation
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn dispatch(&mut self, event: WorkflowEvent) {
        let machine = std::mem::take(&mut self.machine);
        self.machine = machine.apply(event);
    }

    pub fn edit_config(&mut self, edit: impl FnOnce(&mut PromptConfig)) {
        let mut config = self.machine.state().config.clone();
        edit(&mut config);
        self.dispatch(WorkflowEvent::ConfigEdited(config));
    }

    /// Rewrite the concept into an optimized prompt and record it in history
    pub async fn optimize(&mut self) -> TransitionOutcome {
        if let Err(rejection) = self.machine.admit_optimize() {
            log::debug!("Optimize rejected: {:?}", rejection);
            return TransitionOutcome::Rejected(rejection);
        }

        self.dispatch(WorkflowEvent::OptimizeStarted);
        let config = self.machine.state().config.clone();

        match self.backend.optimize_prompt(&config).await {
            Ok(prompt) => {
                self.last_error = None;
                let item = HistoryItem::new(prompt.clone(), config.media_type);
                self.log = self.history.append(item, &self.log);
                self.dispatch(WorkflowEvent::OptimizeSucceeded(prompt));
                log::info!("Prompt optimized with {}", self.backend.name());
                TransitionOutcome::Advanced(Step::Optimize)
            }
            Err(e) => {
                log::error!("Prompt optimization failed: {}", e);
                self.last_error = Some(e.to_user_message());
                self.dispatch(WorkflowEvent::OptimizeFailed);
                TransitionOutcome::Failed(FailureKind::Generic)
            }
        }
    }

    /// Generate the configured media kind from the optimized prompt
    pub async fn generate(&mut self) -> TransitionOutcome {
        if let Err(rejection) = self.machine.admit_generate() {
            log::debug!("Generate rejected: {:?}", rejection);
            return TransitionOutcome::Rejected(rejection);
        }

        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        let cancel = self.cancel.clone();

        self.dispatch(WorkflowEvent::GenerateStarted);
        let state = self.machine.state();
        let prompt = state.optimized_prompt.clone();
        let media_type = state.config.media_type;
        let aspect_ratio = state.config.aspect_ratio;
        // The video backend prompts for a key itself before submitting.
        let prompted_before_submit =
            media_type == MediaType::Video && !self.host.has_video_entitlement();

        let backend = &self.backend;
        let request = async {
            match media_type {
                MediaType::Image => backend.generate_image(&prompt, aspect_ratio).await,
                MediaType::Video => backend.generate_video(&prompt, aspect_ratio, &cancel).await,
            }
        };
        let result: MediaResult<AssetRef> = tokio::select! {
            _ = cancel.cancelled() => Err(MediaError::Cancelled),
            result = request => result,
        };

        // A result that lands after cancellation is discarded.
        let result = match result {
            Ok(_) if cancel.is_cancelled() => Err(MediaError::Cancelled),
            other => other,
        };
        if cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }

        match result {
            Ok(asset) => {
                self.last_error = None;
                log::info!("{} generated: {}", media_type.display_name(), asset.describe());
                self.dispatch(WorkflowEvent::GenerateSucceeded(asset));
                TransitionOutcome::Advanced(Step::Generate)
            }
            Err(e) => {
                let kind = FailureKind::from_error(&e);
                match kind {
                    FailureKind::Cancelled => log::info!("Generation cancelled"),
                    FailureKind::KeyRequired => {
                        log::warn!("Active key lacks video entitlement: {}", e);
                        if !prompted_before_submit {
                            self.host.request_key_selection();
                        }
                    }
                    FailureKind::Generic => log::error!("Generation failed: {}", e),
                }
                self.last_error = Some(e.to_user_message());
                self.dispatch(WorkflowEvent::GenerateFailed(kind));
                TransitionOutcome::Failed(kind)
            }
        }
    }

    pub fn back(&mut self) -> TransitionOutcome {
        if self.machine.step() != Step::Optimize {
            return TransitionOutcome::Rejected(Rejection::WrongStep(self.machine.step()));
        }
        self.dispatch(WorkflowEvent::Back);
        TransitionOutcome::Advanced(Step::Input)
    }

    /// Return to the first step; any outstanding generation is cancelled
    pub fn reset(&mut self) -> TransitionOutcome {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.last_error = None;
        self.dispatch(WorkflowEvent::Reset);
        TransitionOutcome::Advanced(Step::Input)
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn history(&self) -> &HistoryLog {
        &self.log
    }

    /// Remove a history entry; returns whether it existed
    pub fn delete_history(&mut self, id: &str) -> bool {
        let existed = self.log.find(id).is_some();
        self.log = self.history.remove(id, &self.log);
        existed
    }

    pub fn clear_history(&mut self) {
        self.log = self.history.clear();
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Text for the copy affordance: the optimized prompt, once there is one
    pub fn copy_text(&self) -> Option<&str> {
        let prompt = self.machine.state().optimized_prompt.as_str();
        if prompt.is_empty() {
            None
        } else {
            Some(prompt)
        }
    }

    /// Save the generated asset into `dir`
    pub fn download(&self, dir: &Path) -> Result<PathBuf, String> {
        let state = self.machine.state();
        let asset = state
            .generated
            .as_ref()
            .ok_or_else(|| "Nothing has been generated yet".to_string())?;
        download_asset(
            asset,
            state.config.media_type,
            dir,
            Utc::now().timestamp_millis(),
        )
    }
}
