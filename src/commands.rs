use crate::cli::{CasesCommand, Commands, CreateCaseArgs, DownloadArgs, UploadArgs};
use casebox::blob::UploadFile;
use casebox::cases::{NewCase, NewCaseStatement, RegisterCaseRequest};
use casebox::state::AppState;
use serde::Serialize;
use serde_json::json;

type CommandResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub async fn run(command: Commands, state: &AppState) -> CommandResult {
    match command {
        Commands::Upload(args) => upload(args, state).await,
        Commands::Download(args) => download(args, state).await,
        Commands::Attachments(args) => {
            let attachments = state
                .cases
                .list_attachments(&args.case_id, state.token())
                .await?;
            print_json(&attachments)
        }
        Commands::Cases(CasesCommand::List { page }) => {
            let page = state.cases.list_cases(page, state.token()).await?;
            print_json(&page)
        }
        Commands::Cases(CasesCommand::Show(args)) => {
            let case = state.cases.view_case(&args.case_id, state.token()).await?;
            print_json(&case)
        }
        Commands::Cases(CasesCommand::Create(args)) => create_case(args, state).await,
    }
}

async fn upload(args: UploadArgs, state: &AppState) -> CommandResult {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        files.push(UploadFile::from_path(path).await?);
    }

    let attachments = state
        .uploads
        .upload_case_files(&args.case_id, &files, args.memo.as_deref(), state.token())
        .await?;

    tracing::debug!(metrics = ?state.metrics.snapshot(), "Upload finished");
    print_json(&attachments)
}

async fn download(args: DownloadArgs, state: &AppState) -> CommandResult {
    let attachments = state
        .cases
        .list_attachments(&args.case_id, state.token())
        .await?;
    let attachment = attachments
        .iter()
        .find(|a| a.id == args.attachment_id)
        .ok_or_else(|| {
            format!(
                "attachment '{}' not found in case '{}'",
                args.attachment_id, args.case_id
            )
        })?;

    let path = state
        .fetcher
        .download_attachment(attachment, args.dir.as_deref(), state.token())
        .await?;

    print_json(&json!({ "id": attachment.id, "path": path }))
}

async fn create_case(args: CreateCaseArgs, state: &AppState) -> CommandResult {
    let environments: serde_json::Value = serde_json::from_str(&args.environments)?;
    let request = RegisterCaseRequest {
        cases: NewCase {
            number: args.number,
            title: args.title,
            product_family: args.product_family,
            product_name: args.product_name,
            category: args.category,
            product_version: args.product_version,
            sub_category: args.sub_category,
        },
        case_statements: NewCaseStatement {
            symptom: args.symptom,
            needs: args.needs,
            environments,
        },
    };

    let id = state.cases.register_case(&request, state.token()).await?;
    print_json(&json!({ "id": id }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
