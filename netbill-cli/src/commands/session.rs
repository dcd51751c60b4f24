use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use rpassword::prompt_password;
use shared::access::AccessGuard;
use shared::models::{LoginRequest, RegisterRequest};
use shared::session::Session;

use crate::context::AppContext;

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Sign in and store the returned token
    Login(LoginArgs),
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Refresh and print the signed-in user from the server
    Whoami,
    /// Revoke the token on the server and clear the local session
    Logout,
    /// Print the locally stored session without contacting the server
    Status,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email; prompted when omitted
    #[arg(long, short)]
    pub email: Option<String>,
    /// Read the password from the first line of stdin instead of the terminal
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Full name; prompted when omitted
    #[arg(long, short)]
    pub name: Option<String>,
    /// Account email; prompted when omitted
    #[arg(long, short)]
    pub email: Option<String>,
    /// Read the password from the first line of stdin; no confirmation is asked
    #[arg(long)]
    pub password_stdin: bool,
}

pub async fn run(context: &AppContext, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Login(args) => login(context, args).await,
        SessionCommand::Register(args) => register(context, args).await,
        SessionCommand::Whoami => whoami(context).await,
        SessionCommand::Logout => logout(context).await,
        SessionCommand::Status => {
            print_session_summary(&context.store.snapshot());
            println!("Session file: {}", context.session_file.display());
            Ok(())
        }
    }
}

async fn login(context: &AppContext, args: LoginArgs) -> Result<()> {
    let client = context.client()?;
    let email = match args.email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = if args.password_stdin {
        read_password_line(io::stdin().lock())?
    } else {
        prompt_password("Password: ")?
    };
    if password.trim().is_empty() {
        bail!("password must not be empty");
    }

    let session = client
        .login(&LoginRequest { email, password })
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))
        .context("login failed")?;
    print_session_summary(&session);
    Ok(())
}

async fn register(context: &AppContext, args: RegisterArgs) -> Result<()> {
    let client = context.client()?;
    let name = match args.name {
        Some(name) => name,
        None => prompt("Name: ")?,
    };
    let email = match args.email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let (password, password_confirmation) = if args.password_stdin {
        let password = read_password_line(io::stdin().lock())?;
        (password.clone(), password)
    } else {
        (
            prompt_password("Password: ")?,
            prompt_password("Confirm password: ")?,
        )
    };
    if password != password_confirmation {
        bail!("passwords do not match");
    }

    let session = client
        .register(&RegisterRequest {
            name,
            email,
            password,
            password_confirmation,
        })
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))
        .context("registration failed")?;
    print_session_summary(&session);
    Ok(())
}

async fn whoami(context: &AppContext) -> Result<()> {
    if !context.store.is_authenticated() {
        bail!("no active session found; run `netbill session login` first");
    }
    let client = context.client()?;
    let user = client
        .refresh_user()
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))
        .context("failed to refresh user")?;
    match user {
        Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
        None => println!("Signed in without a user record."),
    }
    Ok(())
}

async fn logout(context: &AppContext) -> Result<()> {
    if context.store.snapshot().token.is_none() {
        context.store.logout();
        println!("No active session.");
        return Ok(());
    }
    context.client()?.sign_out().await;
    println!("Signed out.");
    Ok(())
}

/// One-paragraph description of `session`.
pub fn describe_session(session: &Session) -> String {
    if !session.is_authenticated {
        return "Not signed in.".to_string();
    }
    let Some(user) = &session.user else {
        return "Signed in (no user record).".to_string();
    };

    let name = user.display_name().unwrap_or("unknown user");
    let role = AccessGuard::effective_role(session);
    let mut permissions: Vec<&str> = user.permissions().collect();
    permissions.sort_unstable();

    let mut summary = format!("Signed in as {name}");
    if !role.is_empty() {
        summary.push_str(&format!(" ({role})"));
    }
    if permissions.is_empty() {
        summary.push_str("\nPermissions: none");
    } else {
        summary.push_str(&format!("\nPermissions: {}", permissions.join(", ")));
    }
    summary
}

fn print_session_summary(session: &Session) {
    println!("{}", describe_session(session));
}

/// First line of `input` with the line ending removed. Other whitespace is
/// part of the password.
fn read_password_line(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\n', '\r']).to_string();
    if password.is_empty() {
        bail!("no password on stdin");
    }
    Ok(password)
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}
