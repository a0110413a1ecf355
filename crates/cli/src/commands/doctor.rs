use bookstore_core::config::{AppConfig, LoadOptions};
use bookstore_core::InventoryStore;
use bookstore_store::{CsvInventoryStore, DataDir};
use serde::Serialize;
use serde_json::json;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn new(name: &'static str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self { name, status, details: details.into() }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self::new(name, CheckStatus::Skipped, format!("skipped because {reason}"))
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            json!({
                "overall_status": "fail",
                "summary": "doctor serialization failed",
                "error": error.to_string(),
            })
            .to_string()
        });
    }

    render_human(&report)
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Pass,
                "configuration loaded and validated",
            ));
            let data_dir = check_data_dir(&config);
            let data_dir_ready = data_dir.status == CheckStatus::Pass;
            checks.push(data_dir);
            if data_dir_ready {
                let store = CsvInventoryStore::new(DataDir::new(&config.store.data_dir));
                checks.push(check_inventory_store(&store, &config));
                checks.push(check_backup_store(&store, &config));
            } else {
                for name in ["inventory_store", "backup_store"] {
                    checks.push(DoctorCheck::skipped(name, "the data directory is not usable"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck::new(
                "config_validation",
                CheckStatus::Fail,
                error.to_string(),
            ));
            for name in ["data_dir", "inventory_store", "backup_store"] {
                checks.push(DoctorCheck::skipped(name, "configuration did not load"));
            }
        }
    }

    let all_ready = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_ready { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_ready {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_data_dir(config: &AppConfig) -> DoctorCheck {
    let root = &config.store.data_dir;
    if root.is_dir() {
        DoctorCheck::new(
            "data_dir",
            CheckStatus::Pass,
            format!("`{}` is a directory", root.display()),
        )
    } else if root.exists() {
        DoctorCheck::new(
            "data_dir",
            CheckStatus::Fail,
            format!("`{}` exists but is not a directory", root.display()),
        )
    } else {
        DoctorCheck::new(
            "data_dir",
            CheckStatus::Fail,
            format!("`{}` does not exist; `bookstore shop` creates it", root.display()),
        )
    }
}

fn check_inventory_store(store: &CsvInventoryStore, config: &AppConfig) -> DoctorCheck {
    let name = &config.store.inventory_file;
    if !config.store.inventory_path().exists() {
        return DoctorCheck::new(
            "inventory_store",
            CheckStatus::Pass,
            format!("`{name}` does not exist yet; the catalog starts empty"),
        );
    }

    match store.load(name) {
        Ok(load) => match load.issue {
            None => DoctorCheck::new(
                "inventory_store",
                CheckStatus::Pass,
                format!("`{name}` holds {} book(s)", load.books.len()),
            ),
            Some(issue) => DoctorCheck::new(
                "inventory_store",
                CheckStatus::Fail,
                format!("`{name}` read {} book(s) before a problem: {issue}", load.books.len()),
            ),
        },
        Err(error) => DoctorCheck::new("inventory_store", CheckStatus::Fail, error.to_string()),
    }
}

fn check_backup_store(store: &CsvInventoryStore, config: &AppConfig) -> DoctorCheck {
    if !config.store.backup_path().exists() {
        return DoctorCheck::skipped("backup_store", "no backup file is present");
    }

    let name = &config.store.backup_file;
    match store.load(name) {
        Ok(load) => match load.issue {
            None => DoctorCheck::new(
                "backup_store",
                CheckStatus::Pass,
                format!("`{name}` holds {} book(s)", load.books.len()),
            ),
            Some(issue) => DoctorCheck::new("backup_store", CheckStatus::Fail, issue.to_string()),
        },
        Err(error) => DoctorCheck::new("backup_store", CheckStatus::Fail, error.to_string()),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
