use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::io::{BufRead, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use bookbot::App;
use bookbot::auth::{self, RegistrationForm, TokenStore};
use bookbot::chapter::{EXPERTISE_LEVELS, HARDWARE_ACCESS_LEVELS, ReaderProfile};
use bookbot::chat::{Language, worker};
use bookbot::config::{self, ConfigResult};
use bookbot::error::BookbotError;
use bookbot::gateway::BackendClient;

/// Chat with the Physical AI textbook
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Ask the Physical AI textbook questions from the terminal"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Interactive chat (default)
    Chat,
    /// Log in; the password is read from stdin
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account; password and confirmation are read from stdin
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "beginner")]
        software_experience: String,
        #[arg(long, default_value = "beginner")]
        hardware_experience: String,
        #[arg(long, default_value = "basic")]
        robotics_knowledge: String,
    },
    /// Forget the stored login
    Logout,
    /// Show who is logged in
    Whoami,
    /// Rewrite a chapter for your reader profile
    Personalize {
        file: PathBuf,
        #[arg(long)]
        chapter_id: Option<String>,
        /// Reader expertise the rewrite targets
        #[arg(long, default_value = "intermediate", value_parser = PossibleValuesParser::new(EXPERTISE_LEVELS))]
        expertise_level: String,
        /// Robotics hardware the reader can use
        #[arg(long, default_value = "simulation_only", value_parser = PossibleValuesParser::new(HARDWARE_ACCESS_LEVELS))]
        hardware_access: String,
        #[arg(long, default_value = "beginner")]
        robotics_experience: String,
    },
    /// Translate a chapter
    Translate {
        file: PathBuf,
        /// Target language (en or ur)
        #[arg(long, default_value = "ur", value_parser = parse_language)]
        to: Language,
        #[arg(long)]
        chapter_id: Option<String>,
    },
    /// Check that the backend is up
    Health,
}

fn parse_language(code: &str) -> std::result::Result<Language, String> {
    Language::from_code(code).ok_or_else(|| format!("unsupported language '{code}' (use en or ur)"))
}

fn main() -> Result<()> {
    // Writes to /tmp/bookbot-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    init_debug_log();

    color_eyre::install()?;

    // Load config early to avoid defaults during app initialization
    let config_result = config::load_config();

    let args = Args::parse();

    if let Some(warning) = &config_result.warning {
        eprintln!("Warning: {}", warning);
    }

    let result = match args.command.unwrap_or(Cmd::Chat) {
        Cmd::Chat => run_chat(config_result),
        Cmd::Logout => {
            auth::logout(&TokenStore::default_location())?;
            println!("Logged out.");
            Ok(())
        }
        Cmd::Whoami => whoami(),
        other => run_oneshot(other, &config_result.config),
    };

    #[cfg(debug_assertions)]
    log::debug!("=== BOOKBOT DEBUG SESSION ENDED ===");

    result
}

#[cfg(debug_assertions)]
fn init_debug_log() {
    let Ok(log_file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("/tmp/bookbot-debug.log")
    else {
        return;
    };

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format(|buf, record| {
            use std::time::SystemTime;
            let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
            writeln!(
                buf,
                "[{}] [{}] {}",
                datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();

    log::debug!("=== BOOKBOT DEBUG SESSION STARTED ===");
}

fn run_chat(config_result: ConfigResult) -> Result<()> {
    let mut app = App::new(&config_result.config);
    setup_chat_worker(&mut app, &config_result.config);

    println!("bookbot {} - type /help for commands", env!("CARGO_PKG_VERSION"));

    let input_rx = spawn_stdin_reader();
    let mut out = stdout();

    loop {
        app.handle_events(&input_rx, &mut out)?;

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Set up the chat worker thread and channels
fn setup_chat_worker(app: &mut App, config: &config::Config) {
    let (request_tx, request_rx) = mpsc::channel();
    let (response_tx, response_rx) = mpsc::channel();
    app.chat.set_channels(request_tx, response_rx);

    worker::spawn_worker(&config.backend, request_rx, response_tx);
}

/// Forward stdin lines to the main loop; the channel closes at EOF
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn whoami() -> Result<()> {
    let token = TokenStore::default_location()
        .load()
        .ok_or(BookbotError::NotLoggedIn)?;
    match auth::decode_subject(&token) {
        Some(subject) => println!("{}", subject),
        None => println!("Logged in (account name unavailable)"),
    }
    Ok(())
}

/// Commands that make one backend call
fn run_oneshot(command: Cmd, config: &config::Config) -> Result<()> {
    let client = BackendClient::from_config(&config.backend)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match command {
        Cmd::Login { email } => {
            let password = read_stdin_line("Password: ")?;
            let store = TokenStore::default_location();
            match rt.block_on(auth::login(&client, &store, &email, &password)) {
                Ok(_) => println!("Logged in as {}.", email),
                Err(e) => fail(&e.to_string()),
            }
        }
        Cmd::Register {
            email,
            software_experience,
            hardware_experience,
            robotics_knowledge,
        } => {
            let form = RegistrationForm {
                email,
                password: read_stdin_line("Password: ")?,
                confirm_password: read_stdin_line("Confirm password: ")?,
                software_experience,
                hardware_experience,
                robotics_knowledge,
            };
            let store = TokenStore::default_location();
            match rt.block_on(auth::register(&client, &store, &form)) {
                Ok(_) => println!("Account created for {}.", form.email),
                Err(e) => fail(&e.to_string()),
            }
        }
        Cmd::Personalize {
            file,
            chapter_id,
            expertise_level,
            hardware_access,
            robotics_experience,
        } => {
            let content = read_chapter(&file)?;
            let chapter_id = chapter_id.unwrap_or_else(|| file.display().to_string());
            let profile = ReaderProfile {
                expertise_level,
                hardware_access,
                robotics_experience,
            };
            match rt.block_on(client.personalize_chapter(&chapter_id, &content, &profile)) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    log::error!("Personalization failed: {}", e);
                    fail("Failed to personalize content. Make sure backend is running.");
                }
            }
        }
        Cmd::Translate {
            file,
            to,
            chapter_id,
        } => {
            let content = read_chapter(&file)?;
            let chapter_id = chapter_id.unwrap_or_else(|| file.display().to_string());
            match rt.block_on(client.translate_chapter(&content, to, &chapter_id)) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    log::error!("Translation failed: {}", e);
                    fail("Failed to translate content. Make sure backend is running.");
                }
            }
        }
        Cmd::Health => match rt.block_on(client.health()) {
            Ok(health) => println!("{}: {}", client.base_url(), health.status),
            Err(e) => fail(&format!("{}: {}", client.base_url(), e)),
        },
        Cmd::Chat | Cmd::Logout | Cmd::Whoami => {}
    }

    Ok(())
}

fn read_chapter(path: &Path) -> Result<String, BookbotError> {
    let content = std::fs::read_to_string(path).map_err(|source| BookbotError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Err(BookbotError::EmptyInput(path.to_path_buf()));
    }
    Ok(content)
}

fn read_stdin_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Print a user-facing failure and exit non-zero
fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}
