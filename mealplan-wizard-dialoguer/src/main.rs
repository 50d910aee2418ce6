use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dialoguer::{Input, Password};
use mealplan_survey::{AuthProvider, Session};
use mealplan_survey_http::{ClientConfig, HttpApi, TokenStore};
use mealplan_wizard_dialoguer::{DialoguerWizard, WizardError};

/// Answer the meal-plan questionnaire in the terminal and print the generated plan
#[derive(Parser, Debug)]
#[command(name = "mealplan-wizard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the backend API
    #[arg(long, env = "MEALPLAN_API_URL")]
    api_url: Option<String>,

    /// Access token from a previous login
    #[arg(long, env = "MEALPLAN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Email to log in with when no token is given
    #[arg(long)]
    email: Option<String>,

    /// Password to log in with (prompted for when missing)
    #[arg(long, env = "MEALPLAN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Use the plain theme without colors
    #[arg(long)]
    plain: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config = config.with_base_url(api_url);
    }

    let store = Arc::new(match cli.token {
        Some(token) => TokenStore::with_token(token),
        None => TokenStore::new(),
    });
    let api = HttpApi::new(config, store.clone()).context("Invalid client configuration")?;

    if store.token().is_none() {
        let email = match cli.email {
            Some(email) => email,
            None => Input::<String>::new().with_prompt("Email").interact_text()?,
        };
        let password = match cli.password {
            Some(password) => password,
            None => Password::new().with_prompt("Password").interact()?,
        };
        api.login(&email, &password)
            .await
            .map_err(|e| anyhow::anyhow!(e.message()))?;
    }

    let mut session = Session::load(api).await?;
    let report = session.report();
    if !report.applied.is_empty() {
        println!("Resuming with {} saved answers.", report.applied.len());
    }

    let wizard = if cli.plain {
        DialoguerWizard::plain()
    } else {
        DialoguerWizard::new()
    };

    match wizard.run(&mut session).await {
        Ok(plan) => {
            println!("{}", serde_json::to_string_pretty(plan.as_json())?);
            Ok(())
        }
        Err(WizardError::Cancelled) => {
            println!("Cancelled. Your saved answers are kept for next time.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
