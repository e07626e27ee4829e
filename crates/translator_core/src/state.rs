use serde::{Deserialize, Serialize};

use crate::view_model::{Indicator, SessionView};
use crate::{split_batches, ConfigError, StepSettings};

pub type BatchIndex = usize;

/// Model family the remote service must have loaded for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelKind {
    #[default]
    Language,
    Vision,
}

/// How the fragments of a streaming reply are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Fragments are concatenated verbatim.
    Plain,
    /// Fragments carry JSON objects whose `message` fields are concatenated.
    Framed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    /// Batched translation of a text document.
    Translate,
    /// A single prompt answered by the vision model over attached images.
    Vision { attachments: Vec<String> },
}

impl JobKind {
    pub fn model(&self) -> ModelKind {
        match self {
            JobKind::Translate => ModelKind::Language,
            JobKind::Vision { .. } => ModelKind::Vision,
        }
    }

    pub fn framing(&self) -> Framing {
        match self {
            JobKind::Translate => Framing::Plain,
            JobKind::Vision { .. } => Framing::Framed,
        }
    }
}

/// A job as requested by the user, before it has been split into batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub kind: JobKind,
    pub input: String,
}

impl JobSpec {
    pub fn translate(text: impl Into<String>) -> Self {
        Self {
            kind: JobKind::Translate,
            input: text.into(),
        }
    }

    pub fn vision(prompt: impl Into<String>, attachments: Vec<String>) -> Self {
        Self {
            kind: JobKind::Vision { attachments },
            input: prompt.into(),
        }
    }

    pub fn model(&self) -> ModelKind {
        self.kind.model()
    }
}

/// A job in flight: its batches and whatever has been produced for them so far.
///
/// `translated` always has the same length as `batches`; the cursor is the
/// lowest index still unset and is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    kind: JobKind,
    batches: Vec<String>,
    translated: Vec<Option<String>>,
    streaming_text: String,
    translating: bool,
    failure: Option<String>,
}

impl Job {
    pub(crate) fn materialize(spec: JobSpec, settings: &StepSettings) -> Result<Self, ConfigError> {
        let batches = match &spec.kind {
            JobKind::Translate => split_batches(&spec.input, settings.max_batch_size)?,
            JobKind::Vision { .. } => vec![spec.input],
        };
        Ok(Self {
            kind: spec.kind,
            translated: vec![None; batches.len()],
            batches,
            streaming_text: String::new(),
            translating: true,
            failure: None,
        })
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    pub fn framing(&self) -> Framing {
        self.kind.framing()
    }

    pub fn batches(&self) -> &[String] {
        &self.batches
    }

    pub fn translated(&self) -> &[Option<String>] {
        &self.translated
    }

    pub fn streaming_text(&self) -> &str {
        &self.streaming_text
    }

    pub fn is_translating(&self) -> bool {
        self.translating
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn cursor(&self) -> Option<BatchIndex> {
        self.translated.iter().position(Option::is_none)
    }

    pub fn completed_count(&self) -> usize {
        self.translated.iter().filter(|t| t.is_some()).count()
    }

    /// Completed translations followed by the partial reply of the running batch.
    pub fn preview_with(&self, partial: &str) -> String {
        join_non_empty(self.completed().chain(std::iter::once(partial)))
    }

    /// Stores the result for `index` if it is the current cursor. Anything else is stale.
    pub(crate) fn record(&mut self, index: BatchIndex, text: String) -> bool {
        if self.cursor() != Some(index) {
            return false;
        }
        self.translated[index] = Some(text);
        self.refresh_streaming_text();
        true
    }

    pub(crate) fn abort(&mut self, message: String) {
        self.failure = Some(message);
    }

    pub(crate) fn clear_failure(&mut self) -> bool {
        self.failure.take().is_some()
    }

    pub(crate) fn finish(&mut self) {
        self.translating = false;
        self.refresh_streaming_text();
    }

    fn refresh_streaming_text(&mut self) {
        self.streaming_text = join_non_empty(self.completed());
    }

    fn completed(&self) -> impl Iterator<Item = &str> {
        self.translated.iter().flatten().map(String::as_str)
    }
}

fn join_non_empty<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything that must survive between two invocations of the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    settings: StepSettings,
    model_loaded: bool,
    model_loading: bool,
    loaded_model: Option<ModelKind>,
    active_job: Option<Job>,
    pending_job: Option<JobSpec>,
    step_ready: bool,
    last_error: Option<String>,
    notice: Option<String>,
    invocations: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::blank(StepSettings::default())
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: StepSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self::blank(settings))
    }

    fn blank(settings: StepSettings) -> Self {
        Self {
            settings,
            model_loaded: false,
            model_loading: false,
            loaded_model: None,
            active_job: None,
            pending_job: None,
            step_ready: false,
            last_error: None,
            notice: None,
            invocations: 0,
        }
    }

    pub fn settings(&self) -> &StepSettings {
        &self.settings
    }

    pub fn model_loaded(&self) -> bool {
        self.model_loaded
    }

    pub fn model_loading(&self) -> bool {
        self.model_loading
    }

    pub fn loaded_model(&self) -> Option<ModelKind> {
        self.loaded_model
    }

    pub fn active_job(&self) -> Option<&Job> {
        self.active_job.as_ref()
    }

    pub fn pending_job(&self) -> Option<&JobSpec> {
        self.pending_job.as_ref()
    }

    pub fn step_ready(&self) -> bool {
        self.step_ready
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    pub fn is_translating(&self) -> bool {
        self.active_job.as_ref().is_some_and(Job::is_translating)
    }

    pub fn cursor(&self) -> Option<BatchIndex> {
        self.active_job
            .as_ref()
            .filter(|job| job.is_translating())
            .and_then(Job::cursor)
    }

    pub fn view(&self) -> SessionView {
        let job = self.active_job.as_ref();
        let current_batch = self.cursor();
        let indicator = if self.model_loading {
            Some(Indicator::LoadingModel(self.loading_model()))
        } else {
            match (job, current_batch) {
                (Some(job), Some(index)) if job.failure().is_none() => Some(Indicator::Translating {
                    index,
                    total: job.batches().len(),
                }),
                _ => None,
            }
        };

        SessionView {
            model_loaded: self.model_loaded,
            model_loading: self.model_loading,
            translating: self.is_translating(),
            current_batch,
            batch_count: job.map_or(0, |job| job.batches().len()),
            completed_batches: job.map_or(0, Job::completed_count),
            streaming_text: job.map(|job| job.streaming_text().to_string()).unwrap_or_default(),
            indicator,
            last_error: self.last_error.clone(),
            notice: self.notice.clone(),
        }
    }

    /// Model family the next load will ask for.
    pub(crate) fn loading_model(&self) -> ModelKind {
        self.pending_job
            .as_ref()
            .map(JobSpec::model)
            .unwrap_or_default()
    }

    pub(crate) fn has_model_for(&self, model: ModelKind) -> bool {
        self.model_loaded && self.loaded_model == Some(model)
    }

    pub(crate) fn bump_invocation(&mut self) -> u64 {
        self.invocations += 1;
        self.invocations
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    pub(crate) fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    pub(crate) fn set_step_ready(&mut self, ready: bool) {
        self.step_ready = ready;
    }

    pub(crate) fn job_mut(&mut self) -> Option<&mut Job> {
        self.active_job.as_mut()
    }

    /// Starts `spec` right away. The caller has checked that its model is loaded.
    pub(crate) fn start_job(&mut self, spec: JobSpec) -> Result<(), ConfigError> {
        let job = Job::materialize(spec, &self.settings)?;
        self.active_job = Some(job);
        self.step_ready = false;
        Ok(())
    }

    /// Queues `spec` behind a model load. A job still in flight is superseded.
    pub(crate) fn defer_job(&mut self, spec: JobSpec) {
        self.active_job = None;
        self.pending_job = Some(spec);
        self.arm_model_load();
    }

    pub(crate) fn arm_model_load(&mut self) {
        self.model_loading = true;
        self.model_loaded = false;
        self.step_ready = false;
    }

    pub(crate) fn complete_model_load(&mut self, model: ModelKind) -> Option<JobSpec> {
        self.model_loading = false;
        self.model_loaded = true;
        self.loaded_model = Some(model);
        self.pending_job.take()
    }

    pub(crate) fn fail_model_load(&mut self) {
        self.model_loading = false;
        self.model_loaded = false;
        self.loaded_model = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::blank(self.settings);
    }
}
