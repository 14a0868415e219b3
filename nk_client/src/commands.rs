//! Subcommand parsing for the command-line client.

use std::fmt;

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No subcommand given.
    MissingCommand,
    /// A required positional argument is absent.
    MissingArgument {
        command: &'static str,
        usage: &'static str,
    },
    /// Note title empty after trimming.
    EmptyTitle,
    /// Unknown subcommand.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "No command given. Run with --help for usage"),
            Self::MissingArgument { command, usage } => {
                write!(f, "'{}' is missing an argument. Usage: {}", command, usage)
            }
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Run with --help to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A client action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SendOtp {
        email: String,
    },
    Signup {
        email: String,
        otp: String,
        name: Option<String>,
        dob: Option<String>,
    },
    Login {
        email: String,
        otp: String,
    },
    GoogleLogin {
        id_token: String,
    },
    GoogleSignup {
        id_token: String,
    },
    Me,
    Notes,
    Add {
        title: String,
    },
    Delete {
        id: String,
    },
    Logout,
}

/// Parse positional arguments into a [`Command`].
///
/// `add` joins every remaining word into the title, so quoting is optional.
///
/// # Examples
///
/// ```
/// use nk_client::commands::{Command, parse_command};
///
/// let args = vec!["login".to_string(), "ada@x.com".to_string(), "123456".to_string()];
/// assert!(matches!(parse_command(&args), Ok(Command::Login { .. })));
///
/// let args = vec!["add".to_string(), "buy".to_string(), "milk".to_string()];
/// assert_eq!(parse_command(&args), Ok(Command::Add { title: "buy milk".to_string() }));
/// ```
pub fn parse_command(args: &[String]) -> Result<Command, ParseError> {
    let (name, rest) = args.split_first().ok_or(ParseError::MissingCommand)?;
    let arg = |i: usize, usage: &'static str| {
        rest.get(i).cloned().ok_or(ParseError::MissingArgument {
            command: command_name(name),
            usage,
        })
    };

    match name.as_str() {
        "send-otp" => Ok(Command::SendOtp {
            email: arg(0, "send-otp EMAIL")?,
        }),
        "signup" => {
            const USAGE: &str = "signup EMAIL OTP [NAME] [YYYY-MM-DD]";
            Ok(Command::Signup {
                email: arg(0, USAGE)?,
                otp: arg(1, USAGE)?,
                name: rest.get(2).cloned(),
                dob: rest.get(3).cloned(),
            })
        }
        "login" => {
            const USAGE: &str = "login EMAIL OTP";
            Ok(Command::Login {
                email: arg(0, USAGE)?,
                otp: arg(1, USAGE)?,
            })
        }
        "google-login" => Ok(Command::GoogleLogin {
            id_token: arg(0, "google-login ID_TOKEN")?,
        }),
        "google-signup" => Ok(Command::GoogleSignup {
            id_token: arg(0, "google-signup ID_TOKEN")?,
        }),
        "me" => Ok(Command::Me),
        "notes" => Ok(Command::Notes),
        "add" => {
            let title = rest.join(" ").trim().to_string();
            if title.is_empty() {
                return Err(ParseError::EmptyTitle);
            }
            Ok(Command::Add { title })
        }
        "delete" => Ok(Command::Delete {
            id: arg(0, "delete NOTE_ID")?,
        }),
        "logout" => Ok(Command::Logout),
        other => Err(ParseError::UnrecognizedCommand(other.to_string())),
    }
}

fn command_name(name: &str) -> &'static str {
    match name {
        "send-otp" => "send-otp",
        "signup" => "signup",
        "login" => "login",
        "google-login" => "google-login",
        "google-signup" => "google-signup",
        "delete" => "delete",
        _ => "command",
    }
}
