use std::sync::Once;

use pretty_assertions::assert_eq;
use translator_core::{
    update, Effect, Framing, Indicator, JobKind, JobSpec, ModelKind, Msg, Session, StepSettings,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(translator_logging::initialize_for_tests);
}

fn small_batches() -> Session {
    Session::with_settings(StepSettings {
        max_batch_size: 4,
        max_content_length: 5000,
    })
    .unwrap()
}

/// Submits `text` to a fresh session and completes the model load.
fn loaded_with_job(text: &str) -> Session {
    let (session, effects) = update(small_batches(), Msg::Submitted(JobSpec::translate(text)));
    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert!(session.model_loading());
    assert!(session.pending_job().is_some());

    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            model: ModelKind::Language
        }]
    );

    let (session, effects) = update(
        session,
        Msg::ModelLoadFinished {
            model: ModelKind::Language,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::RequestRerun]);
    session
}

/// Runs the show-intent and act invocations for the current batch.
fn translate_current(session: Session, reply: &str) -> Session {
    let index = session.cursor().expect("a batch is pending");
    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(effects, vec![Effect::ShowIntent { index }, Effect::RequestRerun]);
    assert!(session.step_ready());

    let (session, effects) = update(session, Msg::Invoked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::TranslateBatch { index: i, .. }] if *i == index
    ));

    let (session, effects) = update(
        session,
        Msg::BatchFinished {
            index,
            result: Ok(reply.to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert!(!session.step_ready());
    session
}

#[test]
fn three_batch_job_runs_one_action_per_invocation() {
    init_logging();
    let session = loaded_with_job("aaa\nbbb\nccc\n");
    assert!(!session.model_loading());
    assert!(session.model_loaded());

    let job = session.active_job().unwrap();
    assert_eq!(job.batches(), ["aaa\n", "bbb\n", "ccc\n"]);
    assert_eq!(job.translated().len(), 3);
    assert!(job.translated().iter().all(Option::is_none));

    // First invocation only raises the indicator.
    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(effects, vec![Effect::ShowIntent { index: 0 }, Effect::RequestRerun]);
    assert!(session.step_ready());
    assert_eq!(session.active_job().unwrap().completed_count(), 0);

    // Second invocation asks for the call and records its result.
    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(
        effects,
        vec![Effect::TranslateBatch {
            index: 0,
            input: "aaa\n".to_string(),
            kind: JobKind::Translate,
        }]
    );
    let (session, _) = update(
        session,
        Msg::BatchFinished {
            index: 0,
            result: Ok("AAA".to_string()),
        },
    );
    assert_eq!(session.active_job().unwrap().translated()[0].as_deref(), Some("AAA"));
    assert_eq!(session.active_job().unwrap().streaming_text(), "AAA");

    let session = translate_current(session, "BBB");
    let session = translate_current(session, "CCC");
    assert_eq!(session.cursor(), None);
    assert!(session.is_translating());

    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(effects, vec![Effect::Finished]);
    assert!(!session.is_translating());
    assert_eq!(session.active_job().unwrap().streaming_text(), "AAA\nBBB\nCCC");
    assert_eq!(session.view().streaming_text, "AAA\nBBB\nCCC");

    // Idle afterwards.
    let (session, effects) = update(session, Msg::Invoked);
    assert!(effects.is_empty());
    assert_eq!(session.view().indicator, None);
}

#[test]
fn remote_failure_keeps_cursor_and_earlier_results() {
    init_logging();
    let session = loaded_with_job("aaa\nbbb\nccc\n");
    let session = translate_current(session, "AAA");

    let (session, _) = update(session, Msg::Invoked);
    let (session, effects) = update(session, Msg::Invoked);
    assert!(matches!(effects.as_slice(), [Effect::TranslateBatch { index: 1, .. }]));

    let (session, effects) = update(
        session,
        Msg::BatchFinished {
            index: 1,
            result: Err("connection reset".to_string()),
        },
    );
    assert_eq!(effects, vec![Effect::Notify("connection reset".to_string())]);
    assert_eq!(session.cursor(), Some(1));
    assert_eq!(session.active_job().unwrap().translated()[0].as_deref(), Some("AAA"));
    assert_eq!(session.active_job().unwrap().failure(), Some("connection reset"));
    assert_eq!(session.last_error(), Some("connection reset"));
    assert!(!session.step_ready());

    // Aborted: further invocations do nothing until the user retries.
    let (session, effects) = update(session, Msg::Invoked);
    assert!(effects.is_empty());
    assert_eq!(session.cursor(), Some(1));

    let (session, effects) = update(session, Msg::RetryRequested);
    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert_eq!(session.last_error(), None);

    let session = translate_current(session, "BBB");
    assert_eq!(session.cursor(), Some(2));
    assert_eq!(session.active_job().unwrap().streaming_text(), "AAA\nBBB");
}

#[test]
fn stale_batch_results_are_ignored() {
    init_logging();
    let session = loaded_with_job("aaa\nbbb\n");
    let session = translate_current(session, "AAA");

    let before = session.active_job().cloned();
    let (session, effects) = update(
        session,
        Msg::BatchFinished {
            index: 0,
            result: Ok("again".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(session.active_job().cloned(), before);
}

#[test]
fn job_submitted_while_loading_replaces_the_pending_one() {
    init_logging();
    let (session, _) = update(small_batches(), Msg::Submitted(JobSpec::translate("first\n")));
    let (session, effects) = update(session, Msg::Submitted(JobSpec::translate("second\n")));

    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert!(session.model_loading());
    assert!(!session.model_loaded());
    assert!(session.active_job().is_none());
    assert_eq!(session.pending_job().unwrap().input, "second\n");
    assert_eq!(
        session.view().indicator,
        Some(Indicator::LoadingModel(ModelKind::Language))
    );
}

#[test]
fn submit_with_model_loaded_starts_immediately() {
    init_logging();
    let session = loaded_with_job("aaa\n");
    let (session, effects) = update(session, Msg::Submitted(JobSpec::translate("bbb\nccc\n")));

    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert!(!session.model_loading());
    let job = session.active_job().unwrap();
    assert_eq!(job.batches(), ["bbb\n", "ccc\n"]);
    assert!(job.is_translating());
    assert!(!session.step_ready());
}

#[test]
fn blank_input_is_rejected_with_a_notice() {
    init_logging();
    let (session, effects) = update(Session::new(), Msg::Submitted(JobSpec::translate("  \n\t")));

    assert_eq!(
        effects,
        vec![Effect::Notify("No input text to translate.".to_string())]
    );
    assert_eq!(session.notice(), Some("No input text to translate."));
    assert!(!session.model_loading());
    assert!(session.pending_job().is_none());
}

#[test]
fn oversized_input_is_truncated_before_splitting() {
    init_logging();
    let session = Session::with_settings(StepSettings {
        max_batch_size: 200,
        max_content_length: 10,
    })
    .unwrap();
    let (session, effects) =
        update(session, Msg::Submitted(JobSpec::translate("0123456789abcdef")));

    assert_eq!(
        effects,
        vec![
            Effect::Notify("Input truncated to 10 characters.".to_string()),
            Effect::RequestRerun,
        ]
    );
    assert_eq!(session.pending_job().unwrap().input, "0123456789");
}

#[test]
fn model_load_failure_keeps_the_pending_job_until_retry() {
    init_logging();
    let (session, _) = update(small_batches(), Msg::Submitted(JobSpec::translate("aaa\n")));
    let (session, _) = update(session, Msg::Invoked);
    let (session, effects) = update(
        session,
        Msg::ModelLoadFinished {
            model: ModelKind::Language,
            result: Err("unavailable".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify("Error loading model: unavailable".to_string())]
    );
    assert!(!session.model_loading());
    assert!(!session.model_loaded());
    assert!(session.pending_job().is_some());

    let (session, effects) = update(session, Msg::Invoked);
    assert!(effects.is_empty());

    let (session, effects) = update(session, Msg::RetryRequested);
    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert!(session.model_loading());

    let (_, effects) = update(session, Msg::Invoked);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            model: ModelKind::Language
        }]
    );
}

#[test]
fn vision_job_switches_model_and_uses_one_framed_batch() {
    init_logging();
    let session = loaded_with_job("aaa\n");
    let spec = JobSpec::vision(
        "Summarize the image\nin detail",
        vec!["receipt.png".to_string()],
    );
    let (session, effects) = update(session, Msg::Submitted(spec));
    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert!(session.model_loading());
    assert!(!session.model_loaded());

    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            model: ModelKind::Vision
        }]
    );

    let (session, _) = update(
        session,
        Msg::ModelLoadFinished {
            model: ModelKind::Vision,
            result: Ok(()),
        },
    );
    assert_eq!(session.loaded_model(), Some(ModelKind::Vision));
    let job = session.active_job().unwrap();
    assert_eq!(job.batches(), ["Summarize the image\nin detail"]);
    assert_eq!(job.framing(), Framing::Framed);
}

#[test]
fn indicator_tracks_the_current_batch() {
    init_logging();
    let session = loaded_with_job("aaa\nbbb\n");
    let view = session.view();
    assert_eq!(view.indicator, Some(Indicator::Translating { index: 0, total: 2 }));
    assert_eq!(view.batch_count, 2);
    assert_eq!(view.completed_batches, 0);
    assert!(view.translating);

    let session = translate_current(session, "AAA");
    let view = session.view();
    assert_eq!(view.current_batch, Some(1));
    assert_eq!(view.completed_batches, 1);
}

#[test]
fn preview_includes_the_partial_reply() {
    init_logging();
    let session = loaded_with_job("aaa\nbbb\n");
    let session = translate_current(session, "AAA");
    let job = session.active_job().unwrap();
    assert_eq!(job.preview_with("BB"), "AAA\nBB");
    assert_eq!(job.preview_with(""), "AAA");
}

#[test]
fn reset_keeps_settings_and_drops_everything_else() {
    init_logging();
    let session = loaded_with_job("aaa\n");
    let settings = *session.settings();
    let (session, effects) = update(session, Msg::Reset);

    assert!(effects.is_empty());
    assert_eq!(session, Session::with_settings(settings).unwrap());
}

#[test]
fn failed_model_switch_does_not_run_the_superseded_job() {
    init_logging();
    let session = loaded_with_job("aaa\nbbb\n");
    let spec = JobSpec::vision("Summarize the image", vec!["cat.png".to_string()]);
    let (session, _) = update(session, Msg::Submitted(spec));
    assert!(session.active_job().is_none());

    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            model: ModelKind::Vision
        }]
    );
    let (session, _) = update(
        session,
        Msg::ModelLoadFinished {
            model: ModelKind::Vision,
            result: Err("out of memory".to_string()),
        },
    );
    assert_eq!(session.loaded_model(), None);

    for _ in 0..2 {
        let (next, effects) = update(session.clone(), Msg::Invoked);
        assert!(effects.is_empty(), "no batch may run without a model: {effects:?}");
        assert_eq!(next.cursor(), None);
    }

    let (session, effects) = update(session, Msg::RetryRequested);
    assert_eq!(effects, vec![Effect::RequestRerun]);
    let (_, effects) = update(session, Msg::Invoked);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            model: ModelKind::Vision
        }]
    );
}

#[test]
fn retry_prefers_reloading_the_model_for_a_pending_job() {
    init_logging();
    let session = loaded_with_job("aaa\nbbb\n");
    let (session, _) = update(session, Msg::Invoked);
    let (session, _) = update(session, Msg::Invoked);
    let (session, _) = update(
        session,
        Msg::BatchFinished {
            index: 0,
            result: Err("connection reset".to_string()),
        },
    );
    let spec = JobSpec::vision("Label it", vec!["cat.png".to_string()]);
    let (session, _) = update(session, Msg::Submitted(spec));
    let (session, _) = update(session, Msg::Invoked);
    let (session, _) = update(
        session,
        Msg::ModelLoadFinished {
            model: ModelKind::Vision,
            result: Err("unavailable".to_string()),
        },
    );

    let (session, effects) = update(session, Msg::RetryRequested);
    assert_eq!(effects, vec![Effect::RequestRerun]);
    assert!(session.model_loading());
    let (_, effects) = update(session, Msg::Invoked);
    assert_eq!(
        effects,
        vec![Effect::LoadModel {
            model: ModelKind::Vision
        }]
    );
}

#[test]
fn blank_vision_prompt_gets_its_own_notice() {
    init_logging();
    let spec = JobSpec::vision("   ", vec!["cat.png".to_string()]);
    let (session, effects) = update(Session::new(), Msg::Submitted(spec));

    assert_eq!(
        effects,
        vec![Effect::Notify("No prompt for the image query.".to_string())]
    );
    assert!(session.pending_job().is_none());
}
