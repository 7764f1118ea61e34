//! DocQuest interactive console.
//!
//! Loads configuration, the case catalog and the history log, then reads
//! commands from stdin. Type `help` for the command list.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use docquest::adapters::{
    default_renderers, AgentSettings, JsonlHistoryStore, LlmEvaluatorAgent, LlmPatientAgent, OpenAIConfig,
    OpenAIProvider,
};
use docquest::application::{
    AskPatientCommand, AskPatientHandler, EvaluateSubmissionHandler, ExportReportCommand,
    ExportReportHandler, GetProgressHandler, ListHistoryHandler, ListHistoryQuery,
    RecordResultHandler, StartSessionCommand, StartSessionHandler, SubmitAnswerCommand,
    SubmitAnswerHandler,
};
use docquest::config::{AppConfig, ConfigError, LoggingConfig, StorageConfig};
use docquest::domain::case::{Case, CaseCatalog, CatalogError};
use docquest::domain::foundation::CaseId;
use docquest::domain::session::{CaseSession, SessionError, SessionState};
use docquest::ports::{AIError, HistoryError, HistoryStore, ReportFormat};

const PATIENT_MAX_TOKENS: u32 = 300;
const EVALUATOR_MAX_TOKENS: u32 = 800;

/// Failures that stop the console before it starts.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Provider(#[from] AIError),

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("docquest: {err}");
            std::process::exit(2);
        }
    };
    init_tracing(&config.logging);

    if let Err(err) = run(config).await {
        tracing::error!(error = %err, "DocQuest stopped");
        eprintln!("docquest: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(logging.env_filter())
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    config.validate().map_err(ConfigError::from)?;

    let catalog = Arc::new(CaseCatalog::load(&config.storage.catalog_path).await?);
    let history: Arc<dyn HistoryStore> =
        Arc::new(JsonlHistoryStore::open(&config.storage.history_path).await?);

    let api_key = config
        .ai
        .api_key
        .clone()
        .ok_or(ConfigError::ValidationFailed(
            docquest::config::ValidationError::MissingRequired("AI__API_KEY"),
        ))?;
    let provider = Arc::new(OpenAIProvider::new(
        OpenAIConfig::from_secret(api_key)
            .with_model(&config.ai.model)
            .with_base_url(&config.ai.base_url)
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?);

    let patient = Arc::new(LlmPatientAgent::new(
        provider.clone(),
        AgentSettings::new(
            config.ai.patient_temperature,
            PATIENT_MAX_TOKENS,
            config.ai.timeout(),
        ),
    ));
    let evaluator = Arc::new(LlmEvaluatorAgent::new(
        provider,
        AgentSettings::new(
            config.ai.evaluator_temperature,
            EVALUATOR_MAX_TOKENS,
            config.ai.timeout(),
        ),
    ));

    tracing::info!(
        cases = catalog.len(),
        history = %config.storage.history_path.display(),
        model = %config.ai.model,
        "DocQuest ready"
    );

    let mut console = Console {
        catalog: catalog.clone(),
        storage: config.storage.clone(),
        start: StartSessionHandler::new(catalog.clone()),
        ask: AskPatientHandler::new(catalog.clone(), patient),
        submit: SubmitAnswerHandler::new(),
        evaluate: EvaluateSubmissionHandler::new(catalog.clone(), evaluator),
        record: RecordResultHandler::new(history.clone()),
        progress: GetProgressHandler::new(history.clone()),
        list_history: ListHistoryHandler::new(history),
        export: ExportReportHandler::new(catalog, default_renderers()),
        active: None,
    };
    console.run().await
}

/// The case currently being attempted.
struct Active {
    session: CaseSession,
    case: Case,
}

struct Console {
    catalog: Arc<CaseCatalog>,
    storage: StorageConfig,
    start: StartSessionHandler,
    ask: AskPatientHandler,
    submit: SubmitAnswerHandler,
    evaluate: EvaluateSubmissionHandler,
    record: RecordResultHandler,
    progress: GetProgressHandler,
    list_history: ListHistoryHandler,
    export: ExportReportHandler,
    active: Option<Active>,
}

/// Outcome of one command that failed without ending the console.
#[derive(Debug, Error)]
enum CommandError {
    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Usage(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    fn usage(message: impl Into<String>) -> Self {
        CommandError::Usage(message.into())
    }
}

impl Console {
    async fn run(&mut self) -> Result<(), StartupError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("DocQuest - clinical case simulation. Type `help` for commands.");

        loop {
            let Some(line) = prompt(&mut lines, "docquest> ").await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
            let rest = rest.trim();

            let outcome = match command {
                "help" => {
                    print_help();
                    Ok(())
                }
                "quit" | "exit" => break,
                "cases" => {
                    self.list_cases();
                    Ok(())
                }
                "today" => self.start_case(StartSessionCommand::TodayChallenge {
                    date: Utc::now().date_naive(),
                }),
                "start" | "reattempt" => match CaseId::new(rest) {
                    Ok(case_id) => self.start_case(StartSessionCommand::Case { case_id }),
                    Err(_) => Err(CommandError::usage("usage: start <case-id>")),
                },
                "ask" => self.ask_patient(rest).await,
                "submit" => self.submit_answer(&mut lines).await,
                "evaluate" => self.evaluate().await,
                "save" => self.save_result().await,
                "progress" => self.show_progress().await,
                "history" => self.show_history(rest).await,
                "export" => self.export_report(rest).await,
                other => Err(CommandError::usage(format!(
                    "unknown command `{other}`; type `help`"
                ))),
            };

            if let Err(err) = outcome {
                report_failure(&err);
            }
        }

        println!("Goodbye.");
        Ok(())
    }

    fn list_cases(&self) {
        for category in self.catalog.categories() {
            println!("{category}");
            for case in self.catalog.cases_in_category(category) {
                println!("  {:<6} {}", case.id(), case.title());
            }
        }
    }

    fn start_case(&mut self, cmd: StartSessionCommand) -> Result<(), CommandError> {
        let result = self.start.handle(cmd)?;
        let case = &result.case;

        println!();
        println!("Case {}: {} ({})", case.id(), case.title(), case.category());
        if !case.description().is_empty() {
            println!("{}", case.description());
        }
        if !case.symptoms().is_empty() {
            println!("Symptoms: {}", case.symptoms().join(", "));
        }
        println!("Patient: \"{}\"", case.presenting_complaint());
        println!("Ask questions with `ask <question>`, then `submit` your answer.");

        self.active = Some(Active {
            session: result.session,
            case: result.case,
        });
        Ok(())
    }

    async fn ask_patient(&mut self, question: &str) -> Result<(), CommandError> {
        let handler = &self.ask;
        let active = in_progress(&mut self.active)?;

        let turn = handler
            .handle(
                &mut active.session,
                AskPatientCommand {
                    question: question.to_string(),
                },
            )
            .await?;
        println!("Patient: {}", turn.text());
        Ok(())
    }

    async fn submit_answer(
        &mut self,
        lines: &mut Lines<BufReader<Stdin>>,
    ) -> Result<(), CommandError> {
        in_progress(&mut self.active)?.session.ensure_can_ask()?;

        let diagnosis = prompt(lines, "Provisional diagnosis: ").await?.unwrap_or_default();
        let investigations = prompt(lines, "Investigations (comma separated): ")
            .await?
            .unwrap_or_default();
        let plan = prompt(lines, "Management plan: ").await?.unwrap_or_default();

        let active = in_progress(&mut self.active)?;
        self.submit.handle(
            &mut active.session,
            SubmitAnswerCommand::from_text(&diagnosis, &investigations, &plan),
        )?;
        println!("Submitted. Run `evaluate` for feedback.");
        Ok(())
    }

    async fn evaluate(&mut self) -> Result<(), CommandError> {
        let evaluate = &self.evaluate;
        let active = in_progress(&mut self.active)?;
        if active.session.state() == SessionState::Scored && !active.session.is_recorded() {
            return self.save_result().await;
        }

        println!("Evaluating...");
        let feedback = evaluate.handle(&mut active.session).await?;

        println!();
        println!("Score: {}", feedback.score());
        for criterion in feedback.criterion_scores() {
            println!("  {:<16} {}", criterion.criterion, criterion.score);
        }
        if feedback.red_flags() {
            println!("Red flag: a potentially unsafe decision was identified.");
        }
        print_list("Strengths", feedback.strengths());
        print_list("Gaps", feedback.gaps());
        print_list("Learning points", feedback.learning_points());
        println!("Reference diagnosis: {}", active.case.reference_diagnosis());

        self.save_result().await
    }

    /// Writes the scored session to history; repeatable after a storage failure.
    async fn save_result(&mut self) -> Result<(), CommandError> {
        let record = &self.record;
        let active = in_progress(&mut self.active)?;

        record.handle(&mut active.session).await?;
        println!(
            "Result saved. `export md|html` writes a report; `reattempt {}` tries again.",
            active.case.id()
        );
        Ok(())
    }

    async fn show_progress(&self) -> Result<(), CommandError> {
        let snapshot = self.progress.handle().await?;
        println!("Attempts:       {}", snapshot.attempts_count);
        println!("Average score:  {}", snapshot.average_display());
        if let Some(best) = snapshot.best_score {
            println!("Best score:     {best}");
        }
        println!("Distinct cases: {}", snapshot.distinct_cases);
        println!("Badge:          {}", snapshot.badge.label());
        Ok(())
    }

    async fn show_history(&self, limit: &str) -> Result<(), CommandError> {
        let query = if limit.is_empty() {
            ListHistoryQuery::default()
        } else {
            let limit = limit
                .parse()
                .map_err(|_| CommandError::usage("usage: history [limit]"))?;
            ListHistoryQuery { limit }
        };

        let entries = self.list_history.handle(query).await?;
        if entries.is_empty() {
            println!("No cases attempted yet.");
        }
        for entry in entries {
            println!(
                "{}  {:<6} {:>7}  {}",
                entry.date(),
                entry.case_id(),
                entry.score().to_string(),
                entry.feedback_summary()
            );
        }
        Ok(())
    }

    async fn export_report(&self, format: &str) -> Result<(), CommandError> {
        let format: ReportFormat = if format.is_empty() {
            ReportFormat::Markdown
        } else {
            format
                .parse()
                .map_err(|_| CommandError::usage("usage: export [md|html]"))?
        };
        let active = self.active.as_ref().ok_or_else(no_case)?;

        let report = self
            .export
            .handle(&active.session, ExportReportCommand { format })?;

        tokio::fs::create_dir_all(&self.storage.reports_dir).await?;
        let path = self.storage.reports_dir.join(&report.filename);
        tokio::fs::write(&path, &report.content).await?;
        println!("Report written to {}", path.display());
        Ok(())
    }
}

fn no_case() -> CommandError {
    CommandError::usage("no case in progress; use `today` or `start <id>`")
}

fn in_progress(active: &mut Option<Active>) -> Result<&mut Active, CommandError> {
    active.as_mut().ok_or_else(no_case)
}

async fn prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> Result<Option<String>, std::io::Error> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

fn report_failure(err: &CommandError) {
    match err {
        CommandError::Session(session_err @ SessionError::Storage(_)) => {
            println!("{session_err}. Run `save` to try again.");
        }
        CommandError::Session(session_err) if session_err.is_retryable() => {
            println!("{session_err}. Please try again.");
        }
        other => println!("{other}"),
    }
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{heading}:");
    for item in items {
        println!("  - {item}");
    }
}

fn print_help() {
    println!(
        "\
cases              list cases by category
today              start today's challenge
start <id>         start a case
reattempt <id>     start a fresh attempt at a case
ask <question>     ask the patient a question
submit             enter diagnosis, investigations and plan
evaluate           score the submission and save the result
save               retry saving a scored result
progress           show attempts, average and badge
history [limit]    list recent attempts, newest first
export [md|html]   write the report for the scored case
quit               leave"
    );
}
