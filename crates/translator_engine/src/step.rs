use std::collections::VecDeque;

use translator_core::{update, BatchIndex, Effect, JobKind, ModelKind, Msg, Session};
use translator_logging::{translator_debug, translator_info, translator_warn};

use crate::{
    drain_fragments, ChatRequest, EngineSettings, InferenceConnector, LoadModelRequest,
    ScopedConnection, StepError, StepEvent, StepSink,
};

/// What one invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Nothing to do: no job, job finished, or job aborted awaiting retry.
    Idle,
    LoadedModel(ModelKind),
    /// A model load was attempted and failed; the message is also in `last_error`.
    ModelLoadFailed { model: ModelKind, message: String },
    ShowedIntent { index: BatchIndex },
    TranslatedBatch { index: BatchIndex },
    Finished,
    Failed { index: BatchIndex, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub action: StepAction,
    /// The front end should invoke again to keep the job moving.
    pub rerun: bool,
    pub notices: Vec<String>,
}

impl StepReport {
    fn idle() -> Self {
        Self {
            action: StepAction::Idle,
            rerun: false,
            notices: Vec::new(),
        }
    }
}

/// Runs one invocation of the step machine against the inference service.
///
/// Performs at most one remote action (a model load or one batch) and returns
/// the updated session. Connections are opened for the action and closed
/// before returning, so the session is the only state carried to the next call.
pub async fn advance_step(
    session: Session,
    connector: &dyn InferenceConnector,
    settings: &EngineSettings,
    sink: &dyn StepSink,
) -> (Session, StepReport) {
    let mut report = StepReport::idle();
    let (mut session, effects) = update(session, Msg::Invoked);
    let mut queue: VecDeque<Effect> = effects.into();

    while let Some(effect) = queue.pop_front() {
        let follow_up = match effect {
            Effect::LoadModel { model } => {
                sink.emit(StepEvent::ModelLoading { model });
                let result = load_model(connector, settings, model)
                    .await
                    .map_err(|err| err.to_string());
                retag(&session);
                report.action = match &result {
                    Ok(()) => StepAction::LoadedModel(model),
                    Err(message) => StepAction::ModelLoadFailed {
                        model,
                        message: message.clone(),
                    },
                };
                Some(Msg::ModelLoadFinished { model, result })
            }
            Effect::ShowIntent { index } => {
                let total = session.active_job().map_or(0, |job| job.batches().len());
                sink.emit(StepEvent::Intent { index, total });
                report.action = StepAction::ShowedIntent { index };
                None
            }
            Effect::TranslateBatch { index, input, kind } => {
                let result =
                    translate_batch(&session, connector, settings, sink, index, &input, &kind)
                        .await
                        .map_err(|err| err.to_string());
                retag(&session);
                report.action = match &result {
                    Ok(text) => {
                        sink.emit(StepEvent::BatchDone {
                            index,
                            text: text.clone(),
                        });
                        StepAction::TranslatedBatch { index }
                    }
                    Err(message) => StepAction::Failed {
                        index,
                        message: message.clone(),
                    },
                };
                Some(Msg::BatchFinished { index, result })
            }
            Effect::Finished => {
                report.action = StepAction::Finished;
                None
            }
            Effect::Notify(message) => {
                report.notices.push(message);
                None
            }
            Effect::RequestRerun => {
                report.rerun = true;
                None
            }
        };

        if let Some(msg) = follow_up {
            let (next, effects) = update(session, msg);
            session = next;
            queue.extend(effects);
        }
    }

    translator_debug!("Step ended with {:?} (rerun: {})", report.action, report.rerun);
    (session, report)
}

/// The invocation tag is thread-local; an await may resume on another worker.
fn retag(session: &Session) {
    translator_logging::set_invocation(session.invocations());
}

async fn load_model(
    connector: &dyn InferenceConnector,
    settings: &EngineSettings,
    model: ModelKind,
) -> Result<(), StepError> {
    let request = LoadModelRequest::for_model(model, &settings.models);
    translator_info!("Loading model {}", request.chat_model);
    let mut connection = ScopedConnection::open(connector, settings.service.connect_timeout).await?;
    connection.load_model(&request).await?;
    Ok(())
}

async fn translate_batch(
    session: &Session,
    connector: &dyn InferenceConnector,
    settings: &EngineSettings,
    sink: &dyn StepSink,
    index: BatchIndex,
    input: &str,
    kind: &JobKind,
) -> Result<String, StepError> {
    let request = ChatRequest::for_batch(input, kind, &settings.prompts);
    let mut connection = ScopedConnection::open(connector, settings.service.connect_timeout).await?;
    let stream = connection.chat(&request).await?;

    let job = session.active_job();
    let text = drain_fragments(stream, kind.framing(), |decoded| {
        let preview = match job {
            Some(job) => job.preview_with(decoded),
            None => decoded.to_string(),
        };
        sink.emit(StepEvent::Partial { index, preview });
    })
    .await
    .inspect_err(|err| translator_warn!("Batch {} stream failed: {}", index, err))?;

    translator_info!("Batch {} produced {} char(s)", index, text.chars().count());
    Ok(text)
}
