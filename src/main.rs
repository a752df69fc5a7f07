use std::process::ExitCode;

use rvce_sports_export::client::SubmissionsClient;
use rvce_sports_export::export::{build_document, DocumentFormat, DocumentVariant};
use rvce_sports_export::letterhead::LetterheadConfig;
use rvce_sports_export::model::{ExportFilter, SubmissionStatus};

struct Args {
    sport: Option<String>,
    status: Option<SubmissionStatus>,
    variant: DocumentVariant,
    format: DocumentFormat,
    out_dir: String,
    list_sports: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        sport: None,
        status: None,
        variant: DocumentVariant::SimpleList,
        format: DocumentFormat::Xlsx,
        out_dir: ".".to_string(),
        list_sports: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = |name: &str| {
            it.next().ok_or_else(|| format!("{} requires a value", name))
        };
        match flag.as_str() {
            "--sport" => args.sport = Some(value("--sport")?),
            "--status" => {
                args.status = Some(match value("--status")?.as_str() {
                    "pending" => SubmissionStatus::Pending,
                    "approved" => SubmissionStatus::Approved,
                    "rejected" => SubmissionStatus::Rejected,
                    other => return Err(format!("unknown status '{}'", other)),
                })
            }
            "--variant" => {
                args.variant = match value("--variant")?.as_str() {
                    "list" => DocumentVariant::SimpleList,
                    "proforma" => DocumentVariant::Proforma,
                    other => return Err(format!("unknown variant '{}'", other)),
                }
            }
            "--format" => {
                args.format = match value("--format")?.as_str() {
                    "xlsx" => DocumentFormat::Xlsx,
                    "pdf" => DocumentFormat::Pdf,
                    other => return Err(format!("unknown format '{}'", other)),
                }
            }
            "--out" => args.out_dir = value("--out")?,
            "--list-sports" => args.list_sports = true,
            "--help" | "-h" => {
                return Err(
                    "usage: rvce-sports-export [--sport NAME] [--status pending|approved|rejected] \
                     [--variant list|proforma] [--format xlsx|pdf] [--out DIR] [--list-sports]"
                        .to_string(),
                )
            }
            other => return Err(format!("unknown flag '{}'", other)),
        }
    }

    Ok(args)
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let filter = ExportFilter {
        sport: args.sport,
        status: args.status,
    };

    let client = SubmissionsClient::from_env()?;

    if args.list_sports {
        for sport in client.fetch_sports().await? {
            println!("{}", sport);
        }
        return Ok(());
    }

    let records = client.fetch_all_submissions(&filter).await?;
    log::info!("fetched {} submissions", records.len());

    let config = LetterheadConfig::default().load_default_logo();
    let document = build_document(&records, &config, &filter, args.variant, args.format)?;

    let path = std::path::Path::new(&args.out_dir).join(&document.filename);
    std::fs::write(&path, &document.bytes)?;
    log::info!("wrote {} ({} bytes)", path.display(), document.bytes.len());

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("export failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
