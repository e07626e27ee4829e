use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context};
use translator_core::{update, Effect, Indicator, JobSpec, Msg, Session};
use translator_engine::{
    advance_step, ping_report, EngineSettings, HttpConnector, SessionStore, StepEvent,
    StepReport, StepSink,
};
use translator_logging::{translator_info, translator_warn};

use crate::cli::{Command, VisionPreset};
use crate::config::AppConfig;
use crate::render;

/// Prints step events as they happen; partial replies are printed as they grow.
#[derive(Default)]
struct ConsoleSink {
    shown: Mutex<String>,
}

impl StepSink for ConsoleSink {
    fn emit(&self, event: StepEvent) {
        match event {
            StepEvent::ModelLoading { model } => {
                eprintln!(
                    "{}",
                    render::indicator_line(&Indicator::LoadingModel(model))
                );
            }
            StepEvent::Intent { index, total } => {
                eprintln!(
                    "{}",
                    render::indicator_line(&Indicator::Translating { index, total })
                );
            }
            StepEvent::Partial { preview, .. } => {
                let Ok(mut shown) = self.shown.lock() else {
                    return;
                };
                let mut stdout = io::stdout().lock();
                let _ = match preview.strip_prefix(shown.as_str()) {
                    Some(suffix) => write!(stdout, "{suffix}"),
                    None => write!(stdout, "\n{preview}"),
                };
                let _ = stdout.flush();
                *shown = preview;
            }
            StepEvent::BatchDone { .. } => println!(),
        }
    }
}

pub struct App {
    config: AppConfig,
    store: SessionStore,
    connector: HttpConnector,
    engine: EngineSettings,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let engine = config.engine_settings();
        Self {
            store: SessionStore::new(config.session_file.clone()),
            connector: HttpConnector::new(engine.service.clone()),
            engine,
            config,
        }
    }

    pub async fn execute(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Submit { file, text } => {
                let text = read_source(file, text)?;
                self.submit(JobSpec::translate(text))
            }
            Command::Vision {
                images,
                prompt,
                preset,
            } => {
                let prompt =
                    prompt.unwrap_or_else(|| preset.unwrap_or_default().prompt().to_string());
                let attachments = images
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                self.submit(JobSpec::vision(prompt, attachments))
            }
            Command::Step => {
                let report = self.step(&ConsoleSink::default()).await?;
                println!("{}", render::action_line(&report.action));
                if report.rerun {
                    println!("Run `translator step` again to continue.");
                }
                Ok(())
            }
            Command::Run => self.run().await,
            Command::Retry => {
                let effects = self.apply(Msg::RetryRequested)?;
                if effects.contains(&Effect::RequestRerun) {
                    println!("Job re-armed. Run `translator run` to continue.");
                } else {
                    println!("Nothing to retry.");
                }
                Ok(())
            }
            Command::Status => {
                let session = self.load_session()?;
                for line in render::status_lines(&session.view()) {
                    println!("{line}");
                }
                Ok(())
            }
            Command::Ping => {
                let report = ping_report(&self.connector, &self.engine.service).await;
                println!("{report}");
                Ok(())
            }
            Command::Reset => {
                if self.apply(Msg::Reset).is_err() {
                    self.store.clear()?;
                }
                println!("Session reset.");
                Ok(())
            }
        }
    }

    fn submit(&self, spec: JobSpec) -> anyhow::Result<()> {
        let effects = self.apply(Msg::Submitted(spec))?;
        if effects.contains(&Effect::RequestRerun) {
            println!("Job submitted. Run `translator run` to process it.");
        }
        Ok(())
    }

    /// Repeats single steps, reloading the session each time, until no rerun is requested.
    async fn run(&self) -> anyhow::Result<()> {
        let sink = ConsoleSink::default();
        loop {
            let report = self.step(&sink).await?;
            translator_info!("{}", render::action_line(&report.action));
            if !report.rerun {
                eprintln!("{}", render::action_line(&report.action));
                break;
            }
        }
        let session = self.load_session()?;
        let view = session.view();
        if !view.translating && !view.streaming_text.is_empty() {
            println!("\n{}", view.streaming_text);
        }
        Ok(())
    }

    async fn step(&self, sink: &ConsoleSink) -> anyhow::Result<StepReport> {
        let session = self.load_session()?;
        let (session, report) = advance_step(session, &self.connector, &self.engine, sink).await;
        self.store.save(&session)?;
        for notice in &report.notices {
            eprintln!("{notice}");
        }
        Ok(report)
    }

    /// Loads the session, applies one message and saves the result.
    fn apply(&self, msg: Msg) -> anyhow::Result<Vec<Effect>> {
        let session = self.load_session()?;
        let (session, effects) = update(session, msg);
        self.store.save(&session)?;
        for effect in &effects {
            if let Effect::Notify(message) = effect {
                eprintln!("{message}");
            }
        }
        Ok(effects)
    }

    fn load_session(&self) -> anyhow::Result<Session> {
        match self.store.load() {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Ok(Session::with_settings(self.config.step_settings()?)?),
            Err(err) => {
                translator_warn!("Unreadable session file: {}", err);
                Err(err).with_context(|| {
                    format!(
                        "loading session {}; run `translator reset` or delete the file",
                        self.store.path().display()
                    )
                })
            }
        }
    }
}

fn read_source(file: Option<PathBuf>, text: Option<String>) -> anyhow::Result<String> {
    match (file, text) {
        (Some(path), _) => {
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
        }
        (None, Some(text)) => Ok(text),
        (None, None) => bail!("either --file or --text is required"),
    }
}
