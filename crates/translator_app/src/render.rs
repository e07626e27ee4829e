use translator_core::{Indicator, ModelKind, SessionView};
use translator_engine::StepAction;

fn model_name(model: ModelKind) -> &'static str {
    match model {
        ModelKind::Language => "language",
        ModelKind::Vision => "vision",
    }
}

pub fn indicator_line(indicator: &Indicator) -> String {
    match indicator {
        Indicator::LoadingModel(model) => format!("Loading {} model...", model_name(*model)),
        Indicator::Translating { index, total } => {
            format!("Translating batch {} of {}...", index + 1, total)
        }
    }
}

pub fn action_line(action: &StepAction) -> String {
    match action {
        StepAction::Idle => "Nothing to do.".to_string(),
        StepAction::LoadedModel(model) => format!("Loaded {} model.", model_name(*model)),
        StepAction::ModelLoadFailed { message, .. } => format!("Model load failed: {message}"),
        StepAction::ShowedIntent { index } => format!("Ready to translate batch {}.", index + 1),
        StepAction::TranslatedBatch { index } => format!("Batch {} done.", index + 1),
        StepAction::Finished => "Translation finished.".to_string(),
        StepAction::Failed { index, message } => {
            format!("Batch {} failed: {message}. Use `translator retry` to resume.", index + 1)
        }
    }
}

pub fn status_lines(view: &SessionView) -> Vec<String> {
    let mut lines = Vec::new();
    let model = if view.model_loading {
        "loading"
    } else if view.model_loaded {
        "loaded"
    } else {
        "not loaded"
    };
    lines.push(format!("Model: {model}"));

    if view.batch_count > 0 {
        let state = if view.translating { "translating" } else { "done" };
        lines.push(format!(
            "Job: {state}, {}/{} batch(es) complete",
            view.completed_batches, view.batch_count
        ));
    } else {
        lines.push("Job: none".to_string());
    }
    if let Some(indicator) = &view.indicator {
        lines.push(indicator_line(indicator));
    }
    if let Some(notice) = &view.notice {
        lines.push(format!("Notice: {notice}"));
    }
    if let Some(error) = &view.last_error {
        lines.push(format!("Error: {error}"));
    }
    if !view.streaming_text.is_empty() {
        lines.push(String::new());
        lines.push(view.streaming_text.clone());
    }
    lines
}
