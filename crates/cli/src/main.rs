use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use forms_core::config::{data_dir_from_env_value, reference_date_from_env_value};
use forms_core::status::{detailed_status, overall_status};
use forms_core::{
    CoreConfig, Destination, DocumentId, DocumentStore, FieldValues, FileDocumentStore,
    FormService, FormType, PageId, PageRegistry, Placement, SubmitOutcome,
};
use forms_types::Slug;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forms")]
#[command(about = "Placement application and assessment forms CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered page
    Pages,
    /// Start a new application or assessment
    Start {
        /// Form type: application or assessment
        form: FormType,
    },
    /// Show a page with its stored answers
    Show {
        document: DocumentId,
        section: Slug,
        task: Slug,
        page: Slug,
    },
    /// Submit answers for a page
    Submit {
        document: DocumentId,
        section: Slug,
        task: Slug,
        page: Slug,
        /// Answers as field=value; repeat a field for checkbox answers
        fields: Vec<String>,
    },
    /// Show where a page's back link leads
    Back {
        document: DocumentId,
        section: Slug,
        task: Slug,
        page: Slug,
    },
    /// Show the task list of a document
    Tasks { document: DocumentId },
    /// Print the question and answer transcript of a document
    Transcript { document: DocumentId },
    /// Derive the status of a placement from a JSON file
    Status {
        /// Placement record or summary as JSON
        file: PathBuf,
        /// Date to treat as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("forms=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = Arc::new(CoreConfig::new(
        data_dir_from_env_value(std::env::var("FORMS_DATA_DIR").ok()),
        reference_date_from_env_value(std::env::var("FORMS_REFERENCE_DATE").ok())?,
    )?);
    tracing::debug!(data_dir = %cfg.data_dir().display(), "configuration resolved");

    let registry = Arc::new(PageRegistry::standard().context("building page registry")?);
    let service = FormService::new(registry, FileDocumentStore::new(cfg.clone()));

    match cli.command {
        Some(Commands::Pages) => {
            for outline in service.registry().forms() {
                for page in service.registry().pages_in_order(outline.form)? {
                    println!(
                        "{}  {}  [{}]",
                        page.id(),
                        page.metadata().display_name,
                        page.metadata().fields.join(", ")
                    );
                }
            }
        }
        Some(Commands::Start { form }) => {
            let document = service.start(form)?;
            println!("Started {} {}", form, document.id());
        }
        Some(Commands::Show {
            document,
            section,
            task,
            page,
        }) => {
            let id = page_id(&service, &document, &section, &task, &page)?;
            let view = service.page(&document, &id)?;
            println!("{}", view.title);
            if view.superseded {
                println!("(answers superseded by a change of route)");
            }
            println!("{}", serde_json::to_string_pretty(&view.body)?);
            println!("Back: {}", describe(&view.back));
        }
        Some(Commands::Submit {
            document,
            section,
            task,
            page,
            fields,
        }) => {
            let id = page_id(&service, &document, &section, &task, &page)?;
            let values = collect_fields(&fields)?;
            match service.submit(&document, &id, &values)? {
                SubmitOutcome::Advanced {
                    destination,
                    next_task,
                } => {
                    println!("Saved. Next: {}", describe(&destination));
                    if let Some(next) = next_task {
                        println!("Next task: {next}");
                    }
                }
                SubmitOutcome::Invalid { errors, .. } => {
                    println!("There is a problem:");
                    for (field, message) in &errors {
                        println!("  {field}: {message}");
                    }
                    return Ok(ExitCode::from(2));
                }
            }
        }
        Some(Commands::Back {
            document,
            section,
            task,
            page,
        }) => {
            let id = page_id(&service, &document, &section, &task, &page)?;
            println!("{}", describe(&service.back(&document, &id)?));
        }
        Some(Commands::Tasks { document }) => {
            let list = service.task_list(&document)?;
            let mut section = "";
            for entry in &list.tasks {
                if entry.section != section {
                    section = entry.section;
                    println!("{}", entry.section_title);
                }
                println!("  {:<45} {}", entry.task_title, entry.status.label());
            }
            println!(
                "{} of {} tasks completed",
                list.completed(),
                list.tasks.len()
            );
        }
        Some(Commands::Transcript { document }) => {
            let transcript = service.transcript(&document)?;
            if transcript.is_empty() {
                println!("No answers yet.");
            }
            for task in &transcript.tasks {
                println!("{} / {}", task.section_title, task.task_title);
                for page in &task.pages {
                    for (question, answer) in page.response.iter() {
                        println!("  {question}");
                        println!("    {answer}");
                    }
                }
            }
        }
        Some(Commands::Status { file, today }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let placement = Placement::parse(&text)?;
            let today = today.unwrap_or_else(|| cfg.today());

            let overall = overall_status(&placement);
            let detailed = detailed_status(&placement, today);
            println!("Overall:  {} ({})", overall.label(), serde_json::to_string(&overall)?);
            println!("Detailed: {} ({})", detailed.label(), serde_json::to_string(&detailed)?);
        }
        None => {
            println!("Use 'forms --help' for commands");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Builds a page id using the form of the stored document.
fn page_id<S: DocumentStore>(
    service: &FormService<S>,
    document: &DocumentId,
    section: &Slug,
    task: &Slug,
    page: &Slug,
) -> anyhow::Result<PageId> {
    let form = service.store().load(document)?.form();
    Ok(PageId::new(form, section.as_str(), task.as_str(), page.as_str()))
}

fn describe(destination: &Destination) -> String {
    match destination {
        Destination::Page(id) => id.to_string(),
        Destination::TaskList => "task list".to_string(),
    }
}

/// Turns `field=value` arguments into submitted field values.
///
/// A field given more than once becomes a list, as a checkbox group would submit it.
fn collect_fields(args: &[String]) -> anyhow::Result<FieldValues> {
    let mut values = FieldValues::new();
    for arg in args {
        let (field, value) = arg
            .split_once('=')
            .with_context(|| format!("expected field=value, got '{arg}'"))?;
        let field = field.trim();
        anyhow::ensure!(!field.is_empty(), "missing field name in '{arg}'");

        let value = Value::String(value.to_string());
        match values.get_mut(field) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                values.insert(field.to_string(), value);
            }
        }
    }
    Ok(values)
}
