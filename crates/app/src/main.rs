use std::fmt;

use academy_core::model::{PageId, PageKind, ProgramId, RichTextDraft};
use academy_services::{AcademyServices, AssignOutcome, Clock};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    MissingEmail,
    MissingProgram,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingEmail => {
                write!(f, "no session email (set QUITCODE_SESSION_EMAIL or pass --email)")
            }
            ArgsError::MissingProgram => write!(f, "--program is required"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p quitcode -- seed     [--db <sqlite_url>]");
    eprintln!("  cargo run -p quitcode -- assign   --program <id> --pages <id,id,...> [--db <sqlite_url>] [--email <addr>]");
    eprintln!("  cargo run -p quitcode -- progress --program <id> [--db <sqlite_url>] [--email <addr>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:academy.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUITCODE_DB_URL, QUITCODE_SESSION_EMAIL");
    eprintln!("  QUITCODE_UPLOAD_URL, QUITCODE_UPLOAD_TOKEN (optional, enables image uploads)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Seed,
    Assign,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "seed" => Some(Self::Seed),
            "assign" => Some(Self::Assign),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    email: Option<String>,
    program_id: Option<ProgramId>,
    pages: Vec<PageId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUITCODE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://academy.sqlite3".into(), normalize_sqlite_url);
        let mut email = std::env::var("QUITCODE_SESSION_EMAIL").ok();
        let mut program_id = None;
        let mut pages = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--email" => {
                    email = Some(require_value(args, "--email")?);
                }
                "--program" => {
                    let value = require_value(args, "--program")?;
                    let parsed: u64 = value.parse().map_err(|_| ArgsError::InvalidId {
                        flag: "--program",
                        raw: value.clone(),
                    })?;
                    program_id = Some(ProgramId::new(parsed));
                }
                "--pages" => {
                    let value = require_value(args, "--pages")?;
                    for part in value.split(',').filter(|p| !p.trim().is_empty()) {
                        let parsed: u64 = part.trim().parse().map_err(|_| ArgsError::InvalidId {
                            flag: "--pages",
                            raw: part.to_string(),
                        })?;
                        pages.push(PageId::new(parsed));
                    }
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            email,
            program_id,
            pages,
        })
    }

    fn email(&self) -> Result<&str, ArgsError> {
        self.email.as_deref().ok_or(ArgsError::MissingEmail)
    }

    fn program_id(&self) -> Result<ProgramId, ArgsError> {
        self.program_id.ok_or(ArgsError::MissingProgram)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    argv.remove(0);

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Binary glue only; core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let services = AcademyServices::new_sqlite(&args.db_url, Clock::default_clock()).await?;
    tracing::debug!(db_url = %args.db_url, "storage ready");

    match cmd {
        Command::Seed => seed(&services).await,
        Command::Assign => assign(&services, &args).await,
        Command::Progress => progress(&services, &args).await,
    }
}

/// Create a demo employee, program, and pages so the other commands have
/// something to work with.
async fn seed(services: &AcademyServices) -> Result<(), Box<dyn std::error::Error>> {
    let storage = services.storage();
    let programs = services.programs();

    let employee_id = storage
        .employees
        .insert_employee("Dana Ivers".to_string(), "dana@quitcode.dev".to_string())
        .await?;
    let program_id = programs
        .create_program(
            "Backend Onboarding".to_string(),
            Some("First weeks on the backend team.".to_string()),
        )
        .await?;

    let pages = [
        ("Environment setup", PageKind::Theory),
        ("Service architecture", PageKind::Theory),
        ("First code review", PageKind::Task),
    ];
    for (title, kind) in pages {
        let page_id = programs
            .create_page(
                title.to_string(),
                kind,
                None,
                RichTextDraft::text_only("Content goes here."),
            )
            .await?;
        programs.attach_page(program_id, page_id, true).await?;
        println!("page {page_id}: {title}");
    }

    println!("employee {employee_id}: dana@quitcode.dev");
    println!("program {program_id}: Backend Onboarding");
    Ok(())
}

async fn assign(
    services: &AcademyServices,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = services.session(args.email()?).await?;
    let program_id = args.program_id()?;
    let outcome = services
        .assignments()
        .assign_pages(session.employee_id(), program_id, &args.pages)
        .await?;

    match outcome {
        AssignOutcome::Assigned { assignment_id, pages } => {
            println!("assignment {assignment_id}: {} page(s) assigned", pages.len());
        }
        AssignOutcome::AlreadyAssigned { assignment_id } => {
            println!("assignment {assignment_id}: all requested pages were already assigned");
        }
    }
    Ok(())
}

async fn progress(
    services: &AcademyServices,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = services.session(args.email()?).await?;
    let program_id = args.program_id()?;
    let assignments = services.assignments();

    let Some(assignment) = assignments
        .latest_assignment(session.employee_id(), program_id)
        .await?
    else {
        println!("no assignment for {} in program {program_id}", session.employee().email);
        return Ok(());
    };

    let percent = assignments.progress(assignment.id).await?;
    println!(
        "{} / program {program_id}: {percent}% ({})",
        session.employee().full_name,
        assignment.status.as_str()
    );
    for page in assignments.page_list(assignment.id, program_id).await? {
        println!("  page {}: {}", page.page_id, page.status.as_str());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        // At this layer, printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
