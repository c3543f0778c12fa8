use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "casebox")]
#[command(about = "Support case attachments CLI", long_about = None)]
pub struct Cli {
    /// Config file (overrides CASEBOX_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload files and register them as attachments of a case
    Upload(UploadArgs),

    /// Download one attachment of a case
    Download(DownloadArgs),

    /// List the attachments of a case
    Attachments(CaseArgs),

    /// Read or create cases
    #[command(subcommand)]
    Cases(CasesCommand),
}

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    pub case_id: String,

    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Note stored with every attachment of the batch
    #[arg(long)]
    pub memo: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    pub case_id: String,

    pub attachment_id: String,

    /// Directory to write into instead of the configured one
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CaseArgs {
    pub case_id: String,
}

#[derive(Subcommand, Debug)]
pub enum CasesCommand {
    /// One page of cases
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// A case with its statements and resolutions
    Show(CaseArgs),

    /// File a new case with its first statement
    Create(CreateCaseArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateCaseArgs {
    #[arg(long)]
    pub number: String,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub product_family: String,

    #[arg(long)]
    pub product_name: String,

    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub product_version: Option<String>,

    #[arg(long)]
    pub sub_category: Option<String>,

    #[arg(long)]
    pub symptom: String,

    #[arg(long)]
    pub needs: String,

    /// Environment details as a JSON object
    #[arg(long, default_value = "{}")]
    pub environments: String,
}
