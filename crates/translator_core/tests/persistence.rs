use translator_core::{update, Effect, JobSpec, ModelKind, Msg, Session, StepSettings};

fn init_logging() {
    translator_logging::initialize_for_tests();
}

/// Stores and reloads the session the way the front end does between invocations.
fn reload(session: &Session) -> Session {
    let stored = serde_json::to_string(session).expect("serialize session");
    serde_json::from_str(&stored).expect("deserialize session")
}

/// Drives the session through every invocation, reloading it in between when asked.
fn drive_to_completion(mut session: Session, reload_between_steps: bool) -> (Session, Vec<Effect>) {
    let mut log = Vec::new();
    for _ in 0..64 {
        if reload_between_steps {
            session = reload(&session);
        }
        let (next, effects) = update(session, Msg::Invoked);
        session = next;
        let mut follow_up = Vec::new();
        for effect in &effects {
            match effect {
                Effect::LoadModel { model } => {
                    let (next, more) = update(
                        session,
                        Msg::ModelLoadFinished {
                            model: *model,
                            result: Ok(()),
                        },
                    );
                    session = next;
                    follow_up.extend(more);
                }
                Effect::TranslateBatch { index, input, .. } => {
                    let (next, more) = update(
                        session,
                        Msg::BatchFinished {
                            index: *index,
                            result: Ok(input.trim_end().to_uppercase()),
                        },
                    );
                    session = next;
                    follow_up.extend(more);
                }
                _ => {}
            }
        }
        let done = effects.is_empty();
        log.extend(effects);
        log.extend(follow_up);
        if done {
            break;
        }
    }
    (session, log)
}

#[test]
fn reloading_between_invocations_changes_nothing() {
    init_logging();
    let settings = StepSettings {
        max_batch_size: 6,
        max_content_length: 5000,
    };
    let text = "one\ntwo\nthree\nfour\n";
    let (session, _) = update(
        Session::with_settings(settings).unwrap(),
        Msg::Submitted(JobSpec::translate(text)),
    );

    let (in_memory, in_memory_log) = drive_to_completion(session.clone(), false);
    let (reloaded, reloaded_log) = drive_to_completion(session, true);

    assert_eq!(in_memory, reloaded);
    assert_eq!(in_memory_log, reloaded_log);
    assert_eq!(
        reloaded.active_job().unwrap().streaming_text(),
        "ONE\nTWO\nTHREE\nFOUR"
    );
    assert_eq!(reloaded.loaded_model(), Some(ModelKind::Language));
}

#[test]
fn session_resumes_mid_job_after_reload() {
    init_logging();
    let (session, _) = update(
        Session::new(),
        Msg::Submitted(JobSpec::translate("line\n".repeat(100))),
    );
    let (session, _) = update(session, Msg::Invoked);
    let (session, _) = update(
        session,
        Msg::ModelLoadFinished {
            model: ModelKind::Language,
            result: Ok(()),
        },
    );
    let (session, effects) = update(session, Msg::Invoked);
    assert_eq!(effects, vec![Effect::ShowIntent { index: 0 }, Effect::RequestRerun]);

    let restored = reload(&session);
    assert!(restored.step_ready());
    let (_, effects) = update(restored, Msg::Invoked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::TranslateBatch { index: 0, .. }]
    ));
}
