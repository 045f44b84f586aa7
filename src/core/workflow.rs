//! The content creation state machine.
//!
//! A [`WorkflowEngine`] owns one [`WorkflowState`] and moves it along
//! `Describe → Outline → PlatformSelect → Optimize → Publish`. Generation
//! steps always complete: when every remote tier fails the local fallback
//! fills in and the failure is recorded on the state instead of blocking.
//!
//! All methods take `&self`. Generation runs without holding the state lock,
//! so the state stays readable while a request is in flight. Only one
//! generation may be in flight at a time; a second one is rejected with
//! [`WorkflowError::TransitionInProgress`]. Transitions that move the
//! workflow elsewhere (`reset`, `go_back`, `select_platform`) bump a request
//! token, and a generation whose token no longer matches is discarded on
//! arrival.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use super::content::ContentType;
use super::instructions::{InstructionKind, InstructionStore};
use super::platform::Platform;
use super::store::{get_or_warn, ConfigStore, DEFAULT_PLATFORM_KEY};
use crate::ai::{GenerationChain, GenerationErrorKind, GenerationOutcome, GenerationRequest, GenerationTier};

/// Workflow steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Describe,
    Outline,
    PlatformSelect,
    Optimize,
    Publish,
}

impl Step {
    pub const ALL: [Self; 5] =
        [Self::Describe, Self::Outline, Self::PlatformSelect, Self::Optimize, Self::Publish];

    /// Zero-based position in the workflow.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Describe => write!(f, "describe"),
            Self::Outline => write!(f, "outline"),
            Self::PlatformSelect => write!(f, "platform-select"),
            Self::Optimize => write!(f, "optimize"),
            Self::Publish => write!(f, "publish"),
        }
    }
}

/// A generation operation the engine can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Outline,
    Optimize,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline => write!(f, "outline"),
            Self::Optimize => write!(f, "optimize"),
        }
    }
}

/// The most recent generation failure, kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub operation: Operation,
    pub kind: GenerationErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for LastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} generation failed ({}): {}", self.operation, self.kind, self.message)
    }
}

/// Everything accumulated for one piece of content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub step: Step,
    pub description: String,
    pub content_type: Option<ContentType>,
    /// Set exactly when the step is Optimize or Publish.
    pub platform: Option<Platform>,
    /// Non-empty exactly when the step is Outline or later.
    pub outline: String,
    pub draft: String,
    pub last_error: Option<LastError>,
    /// Tier that produced the outline.
    pub outline_tier: Option<GenerationTier>,
    /// Tier that produced the current draft.
    pub draft_tier: Option<GenerationTier>,
}

impl WorkflowState {
    fn has_input(&self) -> bool {
        !self.description.trim().is_empty() || self.content_type.is_some()
    }
}

/// User input that violates a precondition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Enter a description or choose a content type")]
    EmptyInput,

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("No platform selected")]
    NoPlatform,

    #[error("No default platform is configured")]
    NoDefaultPlatform,
}

/// Why a workflow transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A {0} generation is already in progress")]
    TransitionInProgress(Operation),

    #[error("Expected step '{expected}', but the workflow is at '{actual}'")]
    InvalidStep { expected: Step, actual: Step },

    #[error("The {0} result was discarded because the workflow changed")]
    Superseded(Operation),
}

#[derive(Debug, Default)]
struct Inner {
    state: WorkflowState,
    token: u64,
    in_flight: Option<(Operation, u64)>,
}

impl Inner {
    fn bump(&mut self) {
        self.token = self.token.wrapping_add(1);
        self.in_flight = None;
    }

    fn ensure_idle(&self) -> Result<(), WorkflowError> {
        match self.in_flight {
            Some((op, _)) => Err(WorkflowError::TransitionInProgress(op)),
            None => Ok(()),
        }
    }

    fn ensure_step(&self, expected: Step) -> Result<(), WorkflowError> {
        if self.state.step == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidStep { expected, actual: self.state.step })
        }
    }
}

/// Clears the in-flight marker if the generating future is dropped early.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    token: u64,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn start(inner: &'a Mutex<Inner>, guard: &mut Inner, op: Operation) -> Self {
        guard.in_flight = Some((op, guard.token));
        Self { inner, token: guard.token, done: false }
    }

    /// Relock and release the marker. Returns `None` when superseded.
    fn finish(mut self) -> Option<MutexGuard<'a, Inner>> {
        self.done = true;
        let mutex: &'a Mutex<Inner> = self.inner;
        let mut inner = mutex.lock();
        if inner.token != self.token {
            return None;
        }
        inner.in_flight = None;
        Some(inner)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut inner = self.inner.lock();
        if matches!(inner.in_flight, Some((_, token)) if token == self.token) {
            inner.in_flight = None;
        }
    }
}

/// Drives one workflow through its steps.
pub struct WorkflowEngine {
    chain: Arc<GenerationChain>,
    instructions: InstructionStore,
    store: Arc<dyn ConfigStore>,
    configured_platform: Option<Platform>,
    inner: Mutex<Inner>,
}

impl WorkflowEngine {
    /// Create an engine reading instruction overrides and preferences from `store`.
    pub fn new(chain: Arc<GenerationChain>, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            chain,
            instructions: InstructionStore::new(store.clone()),
            store,
            configured_platform: None,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Platform used by [`select_default_platform`](Self::select_default_platform)
    /// when the store has no preference.
    pub fn with_default_platform(mut self, platform: Option<Platform>) -> Self {
        self.configured_platform = platform;
        self
    }

    pub fn instructions(&self) -> &InstructionStore {
        &self.instructions
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WorkflowState {
        self.inner.lock().state.clone()
    }

    pub fn step(&self) -> Step {
        self.inner.lock().state.step
    }

    pub fn last_error(&self) -> Option<LastError> {
        self.inner.lock().state.last_error.clone()
    }

    /// The generation currently in flight, if any.
    pub fn in_flight(&self) -> Option<Operation> {
        self.inner.lock().in_flight.map(|(op, _)| op)
    }

    pub fn is_generating(&self, op: Operation) -> bool {
        self.in_flight() == Some(op)
    }

    /// Store the description and content type. The step does not change.
    pub fn submit_description(
        &self,
        description: &str,
        content_type: Option<ContentType>,
    ) -> Result<(), WorkflowError> {
        if description.trim().is_empty() && content_type.is_none() {
            return Err(ValidationError::EmptyInput.into());
        }

        let mut inner = self.inner.lock();
        inner.ensure_idle()?;
        inner.ensure_step(Step::Describe)?;

        inner.state.description = description.trim().to_string();
        inner.state.content_type = content_type;
        inner.state.last_error = None;
        Ok(())
    }

    /// Pick a preset: its content type and its description together.
    pub fn select_preset(&self, content_type: ContentType) -> Result<(), WorkflowError> {
        self.submit_description(content_type.preset_description(), Some(content_type))
    }

    /// Generate the outline with the resolved outline instruction.
    pub async fn generate_outline(&self) -> Result<GenerationTier, WorkflowError> {
        self.generate_outline_with_instruction(None).await
    }

    /// Generate the outline, preferring `call_override` as the instruction.
    ///
    /// Advances to [`Step::Outline`] whichever tier produced the text.
    pub async fn generate_outline_with_instruction(
        &self,
        call_override: Option<&str>,
    ) -> Result<GenerationTier, WorkflowError> {
        let (request, in_flight) = {
            let mut inner = self.inner.lock();
            inner.ensure_idle()?;
            inner.ensure_step(Step::Describe)?;
            if !inner.state.has_input() {
                return Err(ValidationError::EmptyInput.into());
            }

            let request = GenerationRequest::outline(
                inner.state.description.clone(),
                inner.state.content_type,
                self.instructions.resolve(InstructionKind::Outline, call_override),
            )
            .with_override(call_override);
            let in_flight = InFlight::start(&self.inner, &mut inner, Operation::Outline);
            (request, in_flight)
        };

        tracing::debug!(content_type = ?request.content_type, "Generating outline");
        let outcome = self.chain.generate(&request).await;

        let mut inner = in_flight.finish().ok_or_else(|| {
            tracing::info!(operation = %Operation::Outline, "Discarding superseded result");
            WorkflowError::Superseded(Operation::Outline)
        })?;

        let tier = outcome.tier;
        inner.state.last_error = record_failure(Operation::Outline, &outcome);
        inner.state.outline = outcome.text;
        inner.state.outline_tier = Some(tier);
        inner.state.step = Step::Outline;
        Ok(tier)
    }

    /// Move from the outline to platform selection.
    pub fn continue_to_platforms(&self) -> Result<(), WorkflowError> {
        let mut inner = self.inner.lock();
        inner.ensure_idle()?;
        inner.ensure_step(Step::Outline)?;
        inner.state.step = Step::PlatformSelect;
        inner.state.last_error = None;
        Ok(())
    }

    /// Choose the target platform and move to [`Step::Optimize`].
    ///
    /// Accepted from PlatformSelect onwards, so a platform can be switched
    /// after a draft exists. A previous draft is dropped and any in-flight
    /// optimization is discarded.
    pub fn select_platform(&self, platform: Platform) -> Result<(), WorkflowError> {
        let mut inner = self.inner.lock();
        let step = inner.state.step;
        if step < Step::PlatformSelect {
            return Err(WorkflowError::InvalidStep { expected: Step::PlatformSelect, actual: step });
        }

        inner.bump();
        inner.state.platform = Some(platform);
        inner.state.draft.clear();
        inner.state.draft_tier = None;
        inner.state.step = Step::Optimize;
        inner.state.last_error = None;
        tracing::debug!(%platform, "Platform selected");
        Ok(())
    }

    /// [`select_platform`](Self::select_platform) from an identifier.
    pub fn select_platform_id(&self, id: &str) -> Result<(), WorkflowError> {
        let platform: Platform =
            id.parse().map_err(|_| ValidationError::UnknownPlatform(id.trim().to_string()))?;
        self.select_platform(platform)
    }

    /// The preferred platform: the stored preference, else the configured one.
    pub fn default_platform(&self) -> Option<Platform> {
        let stored = get_or_warn(self.store.as_ref(), DEFAULT_PLATFORM_KEY).and_then(|id| {
            id.parse::<Platform>()
                .map_err(|e| tracing::warn!(error = %e, "Ignoring stored default platform"))
                .ok()
        });
        stored.or(self.configured_platform)
    }

    /// Select the preferred platform.
    pub fn select_default_platform(&self) -> Result<Platform, WorkflowError> {
        let platform = self.default_platform().ok_or(ValidationError::NoDefaultPlatform)?;
        self.select_platform(platform)?;
        Ok(platform)
    }

    /// Adapt the outline to the selected platform.
    pub async fn optimize_for_platform(&self) -> Result<GenerationTier, WorkflowError> {
        self.optimize_for_platform_with_instruction(None).await
    }

    /// Adapt the outline (or the description when there is no outline),
    /// preferring `call_override` as the instruction.
    ///
    /// Advances to [`Step::Publish`] whichever tier produced the text.
    pub async fn optimize_for_platform_with_instruction(
        &self,
        call_override: Option<&str>,
    ) -> Result<GenerationTier, WorkflowError> {
        let (request, in_flight) = {
            let mut inner = self.inner.lock();
            inner.ensure_idle()?;
            inner.ensure_step(Step::Optimize)?;
            let platform = inner.state.platform.ok_or(ValidationError::NoPlatform)?;

            let source = if inner.state.outline.trim().is_empty() {
                inner.state.description.clone()
            } else {
                inner.state.outline.clone()
            };
            let request = GenerationRequest::optimize(
                source,
                platform,
                inner.state.content_type,
                self.instructions.resolve(InstructionKind::Optimize, call_override),
            )
            .with_override(call_override);
            let in_flight = InFlight::start(&self.inner, &mut inner, Operation::Optimize);
            (request, in_flight)
        };

        tracing::debug!(platform = ?request.platform, "Optimizing for platform");
        let outcome = self.chain.generate(&request).await;

        let mut inner = in_flight.finish().ok_or_else(|| {
            tracing::info!(operation = %Operation::Optimize, "Discarding superseded result");
            WorkflowError::Superseded(Operation::Optimize)
        })?;

        let tier = outcome.tier;
        inner.state.last_error = record_failure(Operation::Optimize, &outcome);
        inner.state.draft = outcome.text;
        inner.state.draft_tier = Some(tier);
        inner.state.step = Step::Publish;
        Ok(tier)
    }

    /// Replace the draft. Length is not enforced here.
    pub fn edit_draft(&self, text: impl Into<String>) {
        self.inner.lock().state.draft = text.into();
    }

    /// Step back once. No-op at [`Step::Describe`].
    ///
    /// Leaving Outline drops the outline; leaving Optimize drops the platform
    /// and the draft.
    pub fn go_back(&self) {
        let mut inner = self.inner.lock();
        let Some(prev) = inner.state.step.prev() else {
            return;
        };

        let state = &mut inner.state;
        match state.step {
            Step::Outline => {
                state.outline.clear();
                state.outline_tier = None;
            }
            Step::Optimize => {
                state.platform = None;
                state.draft.clear();
                state.draft_tier = None;
            }
            _ => {}
        }
        state.step = prev;
        state.last_error = None;
        inner.bump();
        tracing::debug!(step = %prev, "Stepped back");
    }

    /// Start over with an empty state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = WorkflowState::default();
        inner.bump();
    }
}

impl fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("chain", &self.chain)
            .field("step", &self.step())
            .finish_non_exhaustive()
    }
}

/// The failure to keep on the state: only when the local fallback had to step in.
fn record_failure(operation: Operation, outcome: &GenerationOutcome) -> Option<LastError> {
    if !outcome.used_fallback() {
        return None;
    }
    outcome.error.as_ref().map(|e| {
        tracing::warn!(%operation, error = %e, "Remote generation failed, used local fallback");
        LastError { operation, kind: e.kind, status: e.status, message: e.message.clone() }
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::ai::{GenerationError, GenerationProvider};
    use crate::core::{FallbackGenerator, MemoryStore};

    fn offline_engine() -> WorkflowEngine {
        WorkflowEngine::new(
            Arc::new(GenerationChain::offline(FallbackGenerator::default())),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Replies immediately except for `gated` requests, which wait for `release`.
    struct Gated {
        gated: InstructionKind,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl GenerationProvider for Gated {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            if request.kind == self.gated {
                self.started.notify_one();
                self.release.notified().await;
            }
            Ok(format!("remote {}", request.kind))
        }

        fn tier(&self) -> GenerationTier {
            GenerationTier::Standard
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    fn gated_engine(gated: InstructionKind) -> (Arc<WorkflowEngine>, Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let provider = Gated { gated, started: started.clone(), release: release.clone() };
        let chain = GenerationChain::default().with_provider(Arc::new(provider));
        let engine = WorkflowEngine::new(Arc::new(chain), Arc::new(MemoryStore::new()));
        (Arc::new(engine), started, release)
    }

    #[test]
    fn test_step_order() {
        assert_eq!(Step::Describe.prev(), None);
        assert_eq!(Step::Publish.next(), None);
        assert_eq!(Step::Outline.next(), Some(Step::PlatformSelect));
        assert_eq!(Step::Publish.prev(), Some(Step::Optimize));
        assert!(Step::Describe < Step::Publish);
    }

    #[test]
    fn test_submit_requires_some_input() {
        let engine = offline_engine();
        assert_eq!(
            engine.submit_description("   ", None),
            Err(WorkflowError::Validation(ValidationError::EmptyInput))
        );
        assert!(engine.submit_description("", Some(ContentType::Info)).is_ok());
        assert!(engine.submit_description("A topic", None).is_ok());
        assert_eq!(engine.step(), Step::Describe);
    }

    #[test]
    fn test_select_preset_fills_description() {
        let engine = offline_engine();
        engine.select_preset(ContentType::News).unwrap();
        let state = engine.state();
        assert_eq!(state.content_type, Some(ContentType::News));
        assert_eq!(state.description, ContentType::News.preset_description());
    }

    #[tokio::test]
    async fn test_generate_outline_without_input_is_rejected() {
        let engine = offline_engine();
        let err = engine.generate_outline().await.unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ValidationError::EmptyInput));
        assert_eq!(engine.step(), Step::Describe);
    }

    #[tokio::test]
    async fn test_offline_run_reaches_publish() {
        let engine = offline_engine();
        engine.submit_description("Our new release", Some(ContentType::Info)).unwrap();

        assert_eq!(engine.generate_outline().await.unwrap(), GenerationTier::Local);
        assert_eq!(engine.step(), Step::Outline);
        assert!(!engine.state().outline.is_empty());

        engine.continue_to_platforms().unwrap();
        assert_eq!(engine.step(), Step::PlatformSelect);
        assert!(engine.state().platform.is_none());

        engine.select_platform(Platform::Instagram).unwrap();
        assert_eq!(engine.step(), Step::Optimize);

        engine.optimize_for_platform().await.unwrap();
        let state = engine.state();
        assert_eq!(state.step, Step::Publish);
        assert!(state.draft.ends_with("#content #create"));
        assert_eq!(state.draft_tier, Some(GenerationTier::Local));
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn test_outline_cannot_be_regenerated_in_place() {
        let engine = offline_engine();
        engine.submit_description("topic", None).unwrap();
        engine.generate_outline().await.unwrap();

        let err = engine.generate_outline().await.unwrap_err();
        assert_eq!(err, WorkflowError::InvalidStep { expected: Step::Describe, actual: Step::Outline });
    }

    #[tokio::test]
    async fn test_select_platform_needs_platform_step() {
        let engine = offline_engine();
        assert!(matches!(
            engine.select_platform(Platform::Blog),
            Err(WorkflowError::InvalidStep { .. })
        ));

        engine.submit_description("topic", None).unwrap();
        engine.generate_outline().await.unwrap();
        assert_eq!(
            engine.select_platform(Platform::Blog),
            Err(WorkflowError::InvalidStep { expected: Step::PlatformSelect, actual: Step::Outline })
        );
        assert_eq!(engine.state().platform, None);

        engine.continue_to_platforms().unwrap();
        engine.select_platform(Platform::Blog).unwrap();
        assert_eq!(engine.step(), Step::Optimize);
        assert_eq!(
            engine.select_platform_id("myspace"),
            Err(WorkflowError::Validation(ValidationError::UnknownPlatform("myspace".into())))
        );
    }

    #[tokio::test]
    async fn test_go_back_four_times_from_publish() {
        let engine = offline_engine();
        engine.submit_description("topic", None).unwrap();
        engine.generate_outline().await.unwrap();
        engine.continue_to_platforms().unwrap();
        engine.select_platform(Platform::Twitter).unwrap();
        engine.optimize_for_platform().await.unwrap();
        assert_eq!(engine.step(), Step::Publish);

        let expected = [Step::Optimize, Step::PlatformSelect, Step::Outline, Step::Describe];
        for step in expected {
            engine.go_back();
            let state = engine.state();
            assert_eq!(state.step, step);
            assert_eq!(state.platform.is_some(), step >= Step::Optimize);
            assert_eq!(!state.outline.is_empty(), step >= Step::Outline);
        }

        engine.go_back();
        assert_eq!(engine.step(), Step::Describe);
        assert_eq!(engine.state().description, "topic");
    }

    #[tokio::test]
    async fn test_edit_draft_is_unbounded() {
        let engine = offline_engine();
        engine.submit_description("topic", None).unwrap();
        engine.generate_outline().await.unwrap();
        engine.continue_to_platforms().unwrap();
        engine.select_platform(Platform::Twitter).unwrap();
        engine.optimize_for_platform().await.unwrap();

        engine.edit_draft("x".repeat(1000));
        assert_eq!(engine.state().draft.len(), 1000);
    }

    #[test]
    fn test_default_platform_preference() {
        let store = Arc::new(MemoryStore::with_values([(DEFAULT_PLATFORM_KEY, "linkedin")]));
        let chain = Arc::new(GenerationChain::default());
        let engine = WorkflowEngine::new(chain.clone(), store).with_default_platform(Some(Platform::Blog));
        assert_eq!(engine.default_platform(), Some(Platform::LinkedIn));

        let engine = WorkflowEngine::new(chain.clone(), Arc::new(MemoryStore::new()))
            .with_default_platform(Some(Platform::Blog));
        assert_eq!(engine.default_platform(), Some(Platform::Blog));

        let store = Arc::new(MemoryStore::with_values([(DEFAULT_PLATFORM_KEY, "myspace")]));
        let engine = WorkflowEngine::new(chain, store);
        assert_eq!(engine.default_platform(), None);
        assert_eq!(
            engine.select_default_platform(),
            Err(WorkflowError::Validation(ValidationError::NoDefaultPlatform))
        );
    }

    #[tokio::test]
    async fn test_second_outline_request_is_rejected_while_first_runs() {
        let (engine, started, release) = gated_engine(InstructionKind::Outline);
        engine.submit_description("topic", None).unwrap();

        let first = tokio::spawn({
            let engine = engine.clone();
            async move { engine.generate_outline().await }
        });
        started.notified().await;
        assert!(engine.is_generating(Operation::Outline));
        assert_eq!(engine.step(), Step::Describe);

        let second = engine.generate_outline().await;
        assert_eq!(second, Err(WorkflowError::TransitionInProgress(Operation::Outline)));

        release.notify_one();
        assert_eq!(first.await.unwrap(), Ok(GenerationTier::Standard));

        let state = engine.state();
        assert_eq!(state.step, Step::Outline);
        assert_eq!(state.outline, "remote outline");
        assert!(!engine.is_generating(Operation::Outline));
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_outline() {
        let (engine, started, release) = gated_engine(InstructionKind::Outline);
        engine.submit_description("topic", None).unwrap();

        let pending = tokio::spawn({
            let engine = engine.clone();
            async move { engine.generate_outline().await }
        });
        started.notified().await;

        engine.reset();
        assert_eq!(engine.in_flight(), None);
        release.notify_one();

        assert_eq!(pending.await.unwrap(), Err(WorkflowError::Superseded(Operation::Outline)));
        assert_eq!(engine.state(), WorkflowState::default());
    }

    #[tokio::test]
    async fn test_platform_change_discards_in_flight_draft() {
        let (engine, started, release) = gated_engine(InstructionKind::Optimize);
        engine.submit_description("topic", None).unwrap();
        engine.generate_outline().await.unwrap();
        engine.continue_to_platforms().unwrap();
        engine.select_platform(Platform::Twitter).unwrap();

        let pending = tokio::spawn({
            let engine = engine.clone();
            async move { engine.optimize_for_platform().await }
        });
        started.notified().await;

        engine.select_platform(Platform::Blog).unwrap();
        release.notify_one();

        assert_eq!(pending.await.unwrap(), Err(WorkflowError::Superseded(Operation::Optimize)));
        let state = engine.state();
        assert_eq!(state.step, Step::Optimize);
        assert_eq!(state.platform, Some(Platform::Blog));
        assert!(state.draft.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_generation_releases_in_flight() {
        let (engine, started, _release) = gated_engine(InstructionKind::Outline);
        engine.submit_description("topic", None).unwrap();

        let pending = tokio::spawn({
            let engine = engine.clone();
            async move { engine.generate_outline().await }
        });
        started.notified().await;
        assert!(engine.is_generating(Operation::Outline));

        pending.abort();
        let _ = pending.await;
        assert_eq!(engine.in_flight(), None);
        assert_eq!(engine.step(), Step::Describe);
    }
}
