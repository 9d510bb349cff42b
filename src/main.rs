// フォーム送信をコマンドラインから再現するランナー
// ブラウザと同じインターセプタを通してmultipart POSTを送る

use colored::*;
use form_relay::{
    CapturedSubmit, FormPayload, LogLevel, RelayConfig, RelayError, ReqwestTransport, SubmitInterceptor,
    SubmitOutcome,
};
use log::error;
use std::process::ExitCode;

/// コマンドライン引数
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    action: Option<String>,
    pairs: Vec<String>,
    config_path: Option<String>,
    log_level: Option<LogLevel>,
    help: bool,
}

fn parse_args<I>(args: I) -> Result<CliArgs, RelayError>
where
    I: IntoIterator<Item = String>,
{
    let mut cli_args = CliArgs::default();

    for arg in args {
        if let Some(url) = arg.strip_prefix("--action=") {
            cli_args.action = Some(url.to_string());
        } else if let Some(path) = arg.strip_prefix("--config=") {
            cli_args.config_path = Some(path.to_string());
        } else if let Some(level) = arg.strip_prefix("--log-level=") {
            let level = LogLevel::parse(level)
                .ok_or_else(|| RelayError::Config(format!("unknown log level '{}'", level)))?;
            cli_args.log_level = Some(level);
        } else {
            match arg.as_str() {
                "--quiet" | "-q" => cli_args.log_level = Some(LogLevel::Off),
                "--help" | "-h" => cli_args.help = true,
                _ if arg.starts_with("--") => {
                    return Err(RelayError::Config(format!("unknown option '{}'", arg)));
                }
                _ => cli_args.pairs.push(arg),
            }
        }
    }
    Ok(cli_args)
}

fn show_help() {
    println!("form_relay - submit a form as multipart POST

USAGE:
    form_relay --action=URL [NAME=VALUE ...] [OPTIONS]

OPTIONS:
    --action=URL             Form action (destination URL)
    --config=PATH            JSON config file
    --log-level=LEVEL        Set log level (off/error/warn/info/debug/trace)
    --quiet, -q              Suppress all logs
    --help, -h               Show this help");
}

fn load_config(cli_args: &CliArgs) -> Result<RelayConfig, RelayError> {
    let mut config = match &cli_args.config_path {
        Some(path) => RelayConfig::from_file(path)?,
        None => RelayConfig::default(),
    };
    if let Some(level) = cli_args.log_level {
        config.log_level = level;
    }
    Ok(config)
}

fn build_submit(cli_args: &CliArgs) -> Result<CapturedSubmit, RelayError> {
    let action = cli_args
        .action
        .clone()
        .ok_or_else(|| RelayError::Config("--action=URL is required".to_string()))?;
    let payload = FormPayload::from_pairs(&cli_args.pairs)?;
    Ok(CapturedSubmit { action, payload })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = match parse_args(std::env::args().skip(1)) {
        Ok(cli_args) => cli_args,
        Err(e) => {
            eprintln!("{}", e.to_string().red().bold());
            return ExitCode::FAILURE;
        }
    };
    if cli_args.help {
        show_help();
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&cli_args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_string().red().bold());
            return ExitCode::FAILURE;
        }
    };
    form_relay::init_logger(&config.log_level);

    let submit = match build_submit(&cli_args) {
        Ok(submit) => submit,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let interceptor = SubmitInterceptor::new(ReqwestTransport::new());
    match interceptor.handle(&submit).await {
        Some(SubmitOutcome::Responded(response)) => {
            // ステータスは終了コードに影響しない
            let status = response.status.to_string();
            let status = if response.status < 400 { status.green() } else { status.yellow() };
            println!("{} {}", status.bold(), response.url);
            ExitCode::SUCCESS
        }
        Some(SubmitOutcome::Failed(e)) => {
            eprintln!("{}", e.to_string().red().bold());
            ExitCode::FAILURE
        }
        None => ExitCode::FAILURE,
    }
}
