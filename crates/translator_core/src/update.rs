use translator_logging::{translator_debug, translator_info, translator_warn};

use crate::{truncate_content, BatchIndex, Effect, JobKind, JobSpec, ModelKind, Msg, Session};

/// Pure update function: applies a message to the session and returns any effects.
///
/// `Msg::Invoked` yields at most one effect that needs the network
/// (`LoadModel` or `TranslateBatch`); its outcome comes back as
/// `ModelLoadFinished` / `BatchFinished` within the same invocation.
pub fn update(mut session: Session, msg: Msg) -> (Session, Vec<Effect>) {
    let effects = match msg {
        Msg::Submitted(spec) => submit(&mut session, spec),
        Msg::RetryRequested => retry(&mut session),
        Msg::Invoked => invoke(&mut session),
        Msg::ModelLoadFinished { model, result } => {
            model_load_finished(&mut session, model, result)
        }
        Msg::BatchFinished { index, result } => batch_finished(&mut session, index, result),
        Msg::Reset => {
            session.reset();
            Vec::new()
        }
    };

    (session, effects)
}

fn submit(session: &mut Session, mut spec: JobSpec) -> Vec<Effect> {
    session.set_notice(None);
    session.set_last_error(None);

    if spec.input.trim().is_empty() {
        let notice = match spec.kind {
            JobKind::Translate => "No input text to translate.",
            JobKind::Vision { .. } => "No prompt for the image query.",
        }
        .to_string();
        session.set_notice(Some(notice.clone()));
        return vec![Effect::Notify(notice)];
    }

    let mut effects = Vec::with_capacity(2);
    let limit = session.settings().max_content_length;
    let (input, truncated) = truncate_content(&spec.input, limit);
    if truncated {
        let notice = format!("Input truncated to {limit} characters.");
        session.set_notice(Some(notice.clone()));
        effects.push(Effect::Notify(notice));
        spec.input = input;
    }

    let model = spec.model();
    if session.has_model_for(model) && !session.model_loading() {
        if let Err(err) = session.start_job(spec) {
            return fail_with(session, err.to_string());
        }
        translator_info!(
            "Job started with {} batch(es)",
            session.active_job().map_or(0, |job| job.batches().len())
        );
    } else {
        translator_info!("Job deferred until the {:?} model is loaded", model);
        session.defer_job(spec);
    }
    effects.push(Effect::RequestRerun);
    effects
}

fn retry(session: &mut Session) -> Vec<Effect> {
    // A pending job waiting on its model takes precedence over any older job.
    let needs_load = session
        .pending_job()
        .is_some_and(|spec| !session.has_model_for(spec.model()));
    if needs_load {
        if session.model_loading() {
            return Vec::new();
        }
        session.set_last_error(None);
        session.arm_model_load();
        translator_info!("Retrying model load");
        return vec![Effect::RequestRerun];
    }

    if let Some(job) = session.job_mut() {
        if job.clear_failure() {
            session.set_last_error(None);
            session.set_step_ready(false);
            translator_info!("Retrying job at batch {:?}", session.cursor());
            return vec![Effect::RequestRerun];
        }
    }

    Vec::new()
}

fn invoke(session: &mut Session) -> Vec<Effect> {
    let invocation = session.bump_invocation();
    translator_logging::set_invocation(invocation);
    session.set_notice(None);

    if session.model_loading() {
        let model = session.loading_model();
        translator_debug!("Loading {:?} model", model);
        return vec![Effect::LoadModel { model }];
    }

    let step_ready = session.step_ready();
    let model_ready = session
        .active_job()
        .is_some_and(|job| session.has_model_for(job.kind().model()));
    let Some(job) = session.job_mut() else {
        return Vec::new();
    };
    if !job.is_translating() || job.failure().is_some() {
        return Vec::new();
    }
    if !model_ready {
        translator_warn!("Job is waiting for its model; nothing to run");
        return Vec::new();
    }

    match job.cursor() {
        Some(index) if !step_ready => {
            translator_debug!("Showing intent for batch {}", index);
            session.set_step_ready(true);
            vec![Effect::ShowIntent { index }, Effect::RequestRerun]
        }
        Some(index) => {
            translator_debug!("Translating batch {}", index);
            vec![Effect::TranslateBatch {
                index,
                input: job.batches()[index].clone(),
                kind: job.kind().clone(),
            }]
        }
        None => {
            job.finish();
            session.set_step_ready(false);
            translator_info!("Job finished");
            vec![Effect::Finished]
        }
    }
}

fn model_load_finished(
    session: &mut Session,
    model: ModelKind,
    result: Result<(), String>,
) -> Vec<Effect> {
    if let Err(message) = result {
        translator_warn!("Loading {:?} model failed: {}", model, message);
        session.fail_model_load();
        return fail_with(session, format!("Error loading model: {message}"));
    }

    translator_info!("{:?} model loaded", model);
    match session.complete_model_load(model) {
        Some(spec) => match session.start_job(spec) {
            Ok(()) => vec![Effect::RequestRerun],
            Err(err) => fail_with(session, err.to_string()),
        },
        None => Vec::new(),
    }
}

fn batch_finished(
    session: &mut Session,
    index: BatchIndex,
    result: Result<String, String>,
) -> Vec<Effect> {
    let Some(job) = session.job_mut() else {
        translator_warn!("Result for batch {} arrived without an active job", index);
        return Vec::new();
    };

    match result {
        Ok(text) => {
            if !job.record(index, text) {
                translator_warn!("Ignoring stale result for batch {}", index);
                return Vec::new();
            }
            session.set_step_ready(false);
            vec![Effect::RequestRerun]
        }
        Err(message) => {
            translator_warn!("Batch {} aborted: {}", index, message);
            job.abort(message.clone());
            session.set_step_ready(false);
            fail_with(session, message)
        }
    }
}

fn fail_with(session: &mut Session, message: String) -> Vec<Effect> {
    session.set_last_error(Some(message.clone()));
    vec![Effect::Notify(message)]
}
