//! Command-line parsing for `cvmatch`.

use std::path::PathBuf;

use cvmatch_core::{ActionRequest, JobDraft, ScreenProfile};
use thiserror::Error;

pub const USAGE: &str = "\
usage: cvmatch [--config PATH] [--verbose] <command> [options]

commands:
  parse [--excel] [--basic] FILE...      parse resumes (JSON, or spreadsheet with --excel)
  match --job ID FILE...                 match resumes against one job
  batch-match --jobs ID,ID FILE...       match resumes against several jobs
  export --job ID FILE...                export match results as a spreadsheet
  create-job --title TITLE [--company C] [--description D]
             [--required-skills S] [--preferred-skills S]
             [--education E] [--experience E] [--file FILE]
  jobs                                   list job descriptions
  job ID                                 show one job description";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("help requested")]
    Help,
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("option `{0}` needs a value")]
    MissingValue(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Parse {
        excel: bool,
        basic: bool,
        files: Vec<PathBuf>,
    },
    Match {
        job_id: String,
        files: Vec<PathBuf>,
    },
    BatchMatch {
        job_ids: Vec<String>,
        files: Vec<PathBuf>,
    },
    Export {
        job_id: String,
        files: Vec<PathBuf>,
    },
    CreateJob {
        draft: JobDraft,
        file: Option<PathBuf>,
    },
    ListJobs,
    GetJob {
        job_id: String,
    },
}

impl Command {
    /// The screen this command would be issued from.
    pub fn profile(&self) -> ScreenProfile {
        match self {
            Command::Parse { basic: true, .. } => ScreenProfile::basic_uploader(),
            Command::Parse { .. } => ScreenProfile::cv_parser(),
            Command::Match { .. } | Command::BatchMatch { .. } | Command::Export { .. } => {
                ScreenProfile::matching()
            }
            Command::CreateJob { .. } | Command::ListJobs | Command::GetJob { .. } => {
                ScreenProfile::job_manager()
            }
        }
    }

    pub fn request(&self) -> ActionRequest {
        match self {
            Command::Parse { excel: true, .. } => ActionRequest::ParseExcel,
            Command::Parse { .. } => ActionRequest::ParseJson,
            Command::Match { job_id, .. } => ActionRequest::Match {
                job_id: job_id.clone(),
            },
            Command::BatchMatch { job_ids, .. } => ActionRequest::BatchMatch {
                job_ids: job_ids.clone(),
            },
            Command::Export { job_id, .. } => ActionRequest::ExportMatches {
                job_id: job_id.clone(),
            },
            Command::CreateJob { draft, .. } => ActionRequest::CreateJob(draft.clone()),
            Command::ListJobs => ActionRequest::ListJobs,
            Command::GetJob { job_id } => ActionRequest::GetJob {
                job_id: job_id.clone(),
            },
        }
    }

    pub fn files(&self) -> Vec<PathBuf> {
        match self {
            Command::Parse { files, .. }
            | Command::Match { files, .. }
            | Command::BatchMatch { files, .. }
            | Command::Export { files, .. } => files.clone(),
            Command::CreateJob { file, .. } => file.iter().cloned().collect(),
            Command::ListJobs | Command::GetJob { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

pub fn parse<I>(args: I) -> Result<Cli, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config = None;
    let mut verbose = false;

    let name = loop {
        let arg = args.next().ok_or(CliError::MissingCommand)?;
        match arg.as_str() {
            "-h" | "--help" => return Err(CliError::Help),
            "-v" | "--verbose" => verbose = true,
            "--config" => config = Some(PathBuf::from(value(&mut args, &arg)?)),
            flag if flag.starts_with('-') => return Err(CliError::UnknownOption(arg)),
            _ => break arg,
        }
    };

    let command = match name.as_str() {
        "parse" | "match" | "batch-match" | "export" => parse_files_command(args, &name)?,
        "create-job" => parse_create_job(args)?,
        "jobs" => {
            if let Some(extra) = args.next() {
                return Err(CliError::Invalid(format!("unexpected argument `{extra}`")));
            }
            Command::ListJobs
        }
        "job" => {
            let job_id = args
                .next()
                .ok_or_else(|| CliError::Invalid("job needs an ID".to_string()))?;
            Command::GetJob { job_id }
        }
        _ => return Err(CliError::UnknownCommand(name)),
    };

    Ok(Cli {
        config,
        verbose,
        command,
    })
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, CliError> {
    args.next()
        .ok_or_else(|| CliError::MissingValue(flag.to_string()))
}

fn parse_files_command(
    mut args: impl Iterator<Item = String>,
    name: &str,
) -> Result<Command, CliError> {
    let mut excel = false;
    let mut basic = false;
    let mut job_id = None;
    let mut job_ids = None;
    let mut files = Vec::new();

    while let Some(arg) = args.next() {
        match (name, arg.as_str()) {
            ("parse", "--excel") => excel = true,
            ("parse", "--basic") => basic = true,
            ("match" | "export", "--job") => job_id = Some(value(&mut args, &arg)?),
            ("batch-match", "--jobs") => {
                let raw = value(&mut args, &arg)?;
                job_ids = Some(raw.split(',').map(|id| id.trim().to_string()).collect());
            }
            (_, flag) if flag.starts_with("--") => return Err(CliError::UnknownOption(arg)),
            _ => files.push(PathBuf::from(arg)),
        }
    }

    let needs = |what: &str| CliError::Invalid(format!("{name} needs {what}"));
    Ok(match name {
        "parse" => Command::Parse {
            excel,
            basic,
            files,
        },
        "match" => Command::Match {
            job_id: job_id.ok_or_else(|| needs("--job ID"))?,
            files,
        },
        "export" => Command::Export {
            job_id: job_id.ok_or_else(|| needs("--job ID"))?,
            files,
        },
        _ => Command::BatchMatch {
            job_ids: job_ids.ok_or_else(|| needs("--jobs ID,ID"))?,
            files,
        },
    })
}

fn parse_create_job(mut args: impl Iterator<Item = String>) -> Result<Command, CliError> {
    let mut draft = JobDraft::default();
    let mut file = None;

    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--title" => {
                draft.title = value(&mut args, &arg)?;
                continue;
            }
            "--file" => {
                file = Some(PathBuf::from(value(&mut args, &arg)?));
                continue;
            }
            "--company" => &mut draft.company,
            "--description" => &mut draft.description,
            "--required-skills" => &mut draft.required_skills,
            "--preferred-skills" => &mut draft.preferred_skills,
            "--education" => &mut draft.education_requirements,
            "--experience" => &mut draft.experience_requirements,
            _ => return Err(CliError::UnknownOption(arg)),
        };
        *slot = Some(value(&mut args, &arg)?);
    }

    Ok(Command::CreateJob { draft, file })
}
