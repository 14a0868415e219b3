//! Command-line client for a notekeeper server.
//!
//! Each invocation runs one command. The session token is kept in a small
//! JSON file so later invocations stay signed in.

use anyhow::{Context, Result};
use chrono::Utc;
use pico_args::Arguments;
use std::path::PathBuf;

use nk_client::{
    api_client::{ApiClient, AuthResponse},
    commands::{Command, parse_command},
    session::{self, Session},
};

const HELP: &str = "\
Keep notes on a notekeeper server

USAGE:
  nk_client [OPTIONS] COMMAND [ARGS]

COMMANDS:
  send-otp EMAIL                          Mail a one-time passcode
  signup EMAIL OTP [NAME] [YYYY-MM-DD]    Create an account with a passcode
  login EMAIL OTP                         Sign in with a passcode
  google-login ID_TOKEN                   Sign in with Google
  google-signup ID_TOKEN                  Create an account with Google
  me                                      Show the signed-in user
  notes                                   List notes, newest first
  add TITLE...                            Create a note
  delete NOTE_ID                          Delete a note
  logout                                  Forget the session token

OPTIONS:
  --server URL          Server URL  [default: $NOTEKEEPER_URL or http://localhost:5000]
  --session PATH        Session file  [default: ~/.notekeeper/session.json]

FLAGS:
  -h, --help            Print help information
";

const DEFAULT_SERVER: &str = "http://localhost:5000";

struct Args {
    server_url: String,
    session_path: PathBuf,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let server_url: Option<String> = pargs.opt_value_from_str("--server")?;
    let session_path: Option<PathBuf> = pargs.opt_value_from_str("--session")?;
    let rest: Vec<String> = pargs
        .finish()
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let args = Args {
        server_url: server_url
            .or_else(|| std::env::var("NOTEKEEPER_URL").ok())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
        session_path: session_path.unwrap_or_else(session::default_path),
        command: parse_command(&rest)?,
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let mut session = Session::load(&args.session_path)?;
    let mut client = ApiClient::new(args.server_url);
    client.set_token(session.token.clone());

    match args.command {
        Command::SendOtp { email } => {
            let now = Utc::now();
            if let Some(wait) = session.cooldown_remaining(&email, now) {
                anyhow::bail!("Please wait {wait}s before requesting another code");
            }

            client.send_otp(&email).await?;
            session.record_otp_sent(&email, now);
            session.save(&args.session_path)?;
            println!("OTP sent to {}", email.trim());
        }
        Command::Signup {
            email,
            otp,
            name,
            dob,
        } => {
            let auth = client
                .signup(name.as_deref(), dob.as_deref(), &email, &otp)
                .await?;
            remember(&mut session, &args.session_path, &auth)?;
        }
        Command::Login { email, otp } => {
            let auth = client.login(&email, &otp).await?;
            remember(&mut session, &args.session_path, &auth)?;
        }
        Command::GoogleLogin { id_token } => {
            let auth = client.google_login(&id_token).await?;
            remember(&mut session, &args.session_path, &auth)?;
        }
        Command::GoogleSignup { id_token } => {
            let auth = client.google_signup(&id_token).await?;
            remember(&mut session, &args.session_path, &auth)?;
        }
        Command::Me => {
            let profile = client.me().await?;
            println!("#{} {}", profile.id, profile.email);
            if let Some(name) = profile.name {
                println!("Name: {name}");
            }
        }
        Command::Notes => {
            let notes = client.list_notes().await?;
            if notes.is_empty() {
                println!("No notes yet.");
            }
            for note in notes {
                println!(
                    "{:>6}  {}  {}",
                    note.id,
                    note.created_at.format("%Y-%m-%d %H:%M"),
                    note.title
                );
            }
        }
        Command::Add { title } => {
            let note = client.create_note(&title).await?;
            println!("Created note {}", note.id);
        }
        Command::Delete { id } => {
            client.delete_note(&id).await?;
            println!("Deleted note {id}");
        }
        Command::Logout => {
            session.logout();
            session.save(&args.session_path)?;
            println!("Signed out.");
        }
    }

    Ok(())
}

fn remember(session: &mut Session, path: &std::path::Path, auth: &AuthResponse) -> Result<()> {
    session.token = Some(auth.token.clone());
    session.save(path).context("Signed in, but the session could not be saved")?;

    let who = auth.user.name.as_deref().unwrap_or(&auth.user.email);
    println!("Signed in as {} (user #{})", who, auth.user.id);
    Ok(())
}
