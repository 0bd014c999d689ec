use std::time::Duration;

use anyhow::{Context, Result};
use authsignal::{ApiResponse, TrackEvent};
use clap::Parser;
use serde_json::Value;

/// authsignal - command line client for the Authsignal API
///
/// Prints the normalized result as JSON. API failures are printed like any other
/// result unless --strict is given, in which case they become errors.
///
/// Examples:
///   authsignal get-user --user-id abc
///   authsignal --strict track --user-id abc --action signIn
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (defaults to https://signal.authsignal.com/v1/)
    #[arg(long = "api-url", env = "AUTHSIGNAL_API_URL", value_name = "URL", global = true)]
    api_url: Option<String>,

    /// API secret key
    #[arg(
        long = "secret-key",
        env = "AUTHSIGNAL_SECRET_KEY",
        value_name = "KEY",
        hide_env_values = true,
        global = true
    )]
    secret_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    timeout: Option<u64>,

    /// Exit with an error when the API reports a failure
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch a user
    GetUser {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        redirect_url: Option<String>,
    },

    /// Update user attributes
    UpdateUser {
        #[arg(long)]
        user_id: String,
        /// User attributes as a JSON object
        #[arg(long, value_parser = parse_json)]
        user: Value,
    },

    /// Delete a user
    DeleteUser {
        #[arg(long)]
        user_id: String,
    },

    /// Fetch the outcome of a tracked action
    GetAction {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        action: String,
        #[arg(long)]
        idempotency_key: String,
    },

    /// Enroll an authenticator verified by the caller
    EnrollVerifiedAuthenticator {
        #[arg(long)]
        user_id: String,
        /// Authenticator as a JSON object
        #[arg(long, value_parser = parse_json)]
        authenticator: Value,
    },

    /// Delete an authenticator
    DeleteAuthenticator {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        user_authenticator_id: String,
    },

    /// Track an action
    Track {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        action: String,
        /// Extra event attributes as a JSON object
        #[arg(long, value_parser = parse_json)]
        attributes: Option<Value>,
    },

    /// Validate a challenge token
    ValidateChallenge {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        action: Option<String>,
    },
}

fn parse_json(s: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("expected a JSON object".to_string())
    }
}

/// Calls the raising variant of an operation when `strict` is set, the plain one otherwise.
macro_rules! call {
    ($strict:expr, $plain:path, $raising:path, $($arg:expr),*) => {
        if $strict {
            $raising($($arg),*).await
        } else {
            $plain($($arg),*).await
        }
    };
}

async fn run(command: Commands, strict: bool) -> Result<ApiResponse> {
    match command {
        Commands::GetUser {
            user_id,
            redirect_url,
        } => call!(
            strict,
            authsignal::get_user,
            authsignal::get_user_strict,
            &user_id,
            redirect_url.as_deref()
        ),
        Commands::UpdateUser { user_id, user } => call!(
            strict,
            authsignal::update_user,
            authsignal::update_user_strict,
            &user_id,
            user
        ),
        Commands::DeleteUser { user_id } => call!(
            strict,
            authsignal::delete_user,
            authsignal::delete_user_strict,
            &user_id
        ),
        Commands::GetAction {
            user_id,
            action,
            idempotency_key,
        } => call!(
            strict,
            authsignal::get_action,
            authsignal::get_action_strict,
            &user_id,
            &action,
            &idempotency_key
        ),
        Commands::EnrollVerifiedAuthenticator {
            user_id,
            authenticator,
        } => call!(
            strict,
            authsignal::enroll_verified_authenticator,
            authsignal::enroll_verified_authenticator_strict,
            &user_id,
            authenticator
        ),
        Commands::DeleteAuthenticator {
            user_id,
            user_authenticator_id,
        } => call!(
            strict,
            authsignal::delete_authenticator,
            authsignal::delete_authenticator_strict,
            &user_id,
            &user_authenticator_id
        ),
        Commands::Track {
            user_id,
            action,
            attributes,
        } => {
            let mut event = TrackEvent::new(user_id, action);
            if let Some(Value::Object(attributes)) = attributes {
                event.attributes = attributes;
            }
            call!(strict, authsignal::track, authsignal::track_strict, &event)
        }
        Commands::ValidateChallenge {
            token,
            user_id,
            action,
        } => call!(
            strict,
            authsignal::validate_challenge,
            authsignal::validate_challenge_strict,
            &token,
            user_id.as_deref(),
            action.as_deref()
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    authsignal::setup(|config| {
        if let Some(api_url) = cli.api_url.clone() {
            config.api_url = api_url;
        }
        if let Some(secret_key) = cli.secret_key.clone() {
            config.api_secret_key = Some(secret_key);
        }
        if let Some(timeout) = cli.timeout {
            config.timeout = Duration::from_secs(timeout);
        }
    });

    let response = run(cli.command, cli.strict).await?;

    let output = serde_json::to_string_pretty(&response).context("Failed to serialize result")?;
    println!("{}", output);
    Ok(())
}
