// ==========================================
// School Admin Dashboard - Roster Import CLI
// ==========================================
// Commands:
//   import <file.csv|.xls|.xlsx> [--class <name>] [--db <path>]
//   template [--db <path>] [--out <file>]
// ==========================================

use school_roster_import::config::{ConfigManager, DEFAULT_ERROR_PREVIEW_LIMIT};
use school_roster_import::db::{init_schema, open_sqlite_connection};
use school_roster_import::domain::TracingAuditSink;
use school_roster_import::importer::{ImportScope, RosterImporter, RosterImporterImpl};
use school_roster_import::repository::{
    ClassRepository, ClassRepositoryImpl, StudentImportRepositoryImpl,
};
use school_roster_import::{logging, template};
use rusqlite::Connection;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

/// Default database location.
///
/// SCHOOL_ROSTER_DB_PATH overrides everything (debugging / tests / CI);
/// otherwise the user data directory is used, falling back to the
/// working directory when none exists.
fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("SCHOOL_ROSTER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./school_roster.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("school-admin-dashboard");
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("school_roster.db");
    }

    path.to_string_lossy().to_string()
}

fn print_usage() {
    eprintln!("{} v{}", school_roster_import::APP_NAME, school_roster_import::VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  school-roster-import import <file.csv|.xls|.xlsx> [--class <name>] [--db <path>]");
    eprintln!("  school-roster-import template [--db <path>] [--out <file>]");
    eprintln!();
    eprintln!("  --class <name>   only import rows for this class (page-scoped import)");
    eprintln!("  --db <path>      SQLite database (default: SCHOOL_ROSTER_DB_PATH or user data dir)");
    eprintln!("  --out <file>     write the roster template CSV here instead of stdout");
}

fn open_db(db_path: &str) -> Result<Arc<Mutex<Connection>>, ExitCode> {
    let conn = match open_sqlite_connection(db_path) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("error: cannot open database {}: {}", db_path, e);
            return Err(ExitCode::FAILURE);
        }
    };
    if let Err(e) = init_schema(&conn) {
        eprintln!("error: cannot initialize schema: {}", e);
        return Err(ExitCode::FAILURE);
    }
    Ok(Arc::new(Mutex::new(conn)))
}

async fn run_import(args: &[String]) -> ExitCode {
    let mut file: Option<String> = None;
    let mut class: Option<String> = None;
    let mut db: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--class" => class = iter.next().cloned(),
            "--db" => db = iter.next().cloned(),
            other if file.is_none() => file = Some(other.to_string()),
            other => {
                eprintln!("error: unexpected argument: {}", other);
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(file) = file else {
        print_usage();
        return ExitCode::FAILURE;
    };
    let db_path = db.unwrap_or_else(get_default_db_path);

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(code) => return code,
    };

    let class_repo = match ClassRepositoryImpl::from_connection(conn.clone()) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let student_repo = match StudentImportRepositoryImpl::from_connection(conn.clone()) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let config = match ConfigManager::from_connection(conn) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let importer =
        RosterImporterImpl::new(class_repo, student_repo, config, Arc::new(TracingAuditSink));
    let scope = match class {
        Some(name) => ImportScope::Class(name),
        None => ImportScope::AllClasses,
    };

    match importer.import_file(&file, scope).await {
        Ok(report) => {
            println!("{}", report.summary_message(DEFAULT_ERROR_PREVIEW_LIMIT));
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("error: cannot render report: {}", e),
            }
            match report.status {
                school_roster_import::ImportStatus::Failed => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            }
        }
        Err(e) => {
            eprintln!("import failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_template(args: &[String]) -> ExitCode {
    let mut db: Option<String> = None;
    let mut out: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => db = iter.next().cloned(),
            "--out" => out = iter.next().cloned(),
            other => {
                eprintln!("error: unexpected argument: {}", other);
                return ExitCode::FAILURE;
            }
        }
    }

    let db_path = db.unwrap_or_else(get_default_db_path);
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(code) => return code,
    };

    let class_repo = match ClassRepositoryImpl::from_connection(conn) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let classes = match class_repo.list_classes().await {
        Ok(classes) => classes,
        Err(e) => {
            eprintln!("error: cannot load classes: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let csv = match template::roster_template_csv(&classes) {
        Ok(csv) => csv,
        Err(e) => {
            eprintln!("error: cannot build template: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match out {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, csv) {
                eprintln!("error: cannot write {}: {}", path, e);
                return ExitCode::FAILURE;
            }
            println!("template written to {}", path);
        }
        None => print!("{}", csv),
    }

    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("import") => run_import(&args[1..]).await,
        Some("template") => run_template(&args[1..]).await,
        _ => {
            print_usage();
            ExitCode::FAILURE
        }
    }
}
