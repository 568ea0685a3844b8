use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    load_settings, preferences, ExchangeController, ExchangeState, FilePreferenceStore, Flow,
    HttpTransport, Presentation, RawInput, ScreenContext, Submission,
};
use shared::domain::Theme;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod sink;

use sink::{TerminalNavigator, TerminalSink};

#[derive(Parser, Debug)]
#[command(name = "tekbot", about = "Terminal front end for the TekBot API")]
struct Args {
    /// Overrides the configured API base url.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat; one question per line, `/quit` to leave.
    Chat,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    Recover {
        #[arg(long)]
        email: String,
    },
    Reset {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.api_base_url = server_url;
    }
    let settings = settings.validated()?;

    let context = ScreenContext::new(
        Arc::new(TerminalSink::default()),
        Arc::new(TerminalNavigator),
        Arc::new(FilePreferenceStore::new(&settings.preferences_path)),
    );

    let input = match args.command {
        Command::Chat => {
            let transport = HttpTransport::new(&settings.api_base_url)?;
            let controller = ExchangeController::mount(
                Presentation::for_flow(Flow::Chat),
                transport,
                context,
                settings.validation_rules(),
            )?;
            run_chat(&controller).await?;
            controller.unmount();
            return Ok(ExitCode::SUCCESS);
        }
        Command::Theme { action } => {
            let theme = match action {
                ThemeAction::Show => context.apply_saved_theme()?,
                ThemeAction::Toggle => context.toggle_theme()?,
                ThemeAction::Light | ThemeAction::Dark => {
                    let theme = if action == ThemeAction::Dark {
                        Theme::Dark
                    } else {
                        Theme::Light
                    };
                    preferences::save_theme(context.preferences.as_ref(), theme)?;
                    context.apply_saved_theme()?
                }
            };
            println!("theme: {}", theme.as_str());
            return Ok(ExitCode::SUCCESS);
        }
        Command::Login { email, password } => RawInput::Login { email, password },
        Command::Register {
            email,
            password,
            confirm,
        } => RawInput::Register {
            email,
            password,
            confirmation: confirm,
        },
        Command::Recover { email } => RawInput::RecoverPassword { email },
        Command::Reset {
            token,
            password,
            confirm,
        } => RawInput::ResetPassword {
            password,
            confirmation: confirm,
            token,
        },
    };

    let transport = HttpTransport::new(&settings.api_base_url)?;
    let controller = ExchangeController::mount(
        Presentation::for_flow(input.flow()),
        transport,
        context,
        settings.validation_rules(),
    )?;
    let submission = controller.submit(input).await;
    controller.unmount();

    Ok(match submission {
        Submission::Resolved(ExchangeState::Succeeded(_)) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn run_chat(controller: &ExchangeController<HttpTransport>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim() == "/quit" {
            break;
        }
        controller
            .submit(RawInput::Chat { message: line })
            .await;
    }
    Ok(())
}
