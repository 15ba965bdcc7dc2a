use facegate::{
    enroll::{self, EnrollmentForm},
    gate::{AccessGate, Admission, AuthProvider, Identity},
    liveness::{FailureKind, SleepPacer, Stage},
    presenter, routes,
    camera::{Camera, FrameSource},
    Config, EnrollOutcome, FaceGateError, HttpBackend, VerificationSession,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "facegate")]
#[command(about = "Liveness-gated face verification client")]
struct Cli {
    /// Enable development mode (verbose logging)
    #[arg(long, global = true)]
    dev: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the liveness-gated verification flow
    Verify,
    /// Enroll a new identity (admin only)
    Enroll {
        /// Identity label for the new face
        #[arg(short, long)]
        person_id: String,
        /// Path to the face image
        #[arg(short, long)]
        image: PathBuf,
        /// Admin email for the access gate
        #[arg(long, env = "FACEGATE_ADMIN_EMAIL")]
        email: String,
        /// Admin password for the access gate
        #[arg(long, env = "FACEGATE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Capture a single frame and save it
    TestCamera {
        #[arg(short, long, default_value = "test_capture.png")]
        output: PathBuf,
    },
    /// Show which surface a path resolves to
    Route { path: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.dev);

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Verify => run_verify(&config)?,
        Commands::Enroll { person_id, image, email, password } => {
            run_enroll(&config, &person_id, &image, &email, &password)?
        }
        Commands::TestCamera { output } => {
            println!("Testing camera...");
            let mut camera = Camera::new(&config.camera)?;
            let frame = camera.start_session()?.capture()?;
            std::fs::write(&output, frame.png())?;
            println!("Saved test image to {:?}", output);
        }
        Commands::Route { path } => {
            println!("{} -> {:?}", path, routes::resolve(&path));
        }
    }

    Ok(())
}

fn run_verify(config: &Config) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    let mut camera = Camera::new(&config.camera)?;
    let mut pacer = SleepPacer;

    println!("{}", presenter::status_message(&Stage::Idle));

    let result = camera.start_session().and_then(|mut frames| {
        let mut session = VerificationSession::new(&mut frames, &backend, &config.liveness);
        session.run(&mut pacer, &mut |stage| {
            println!("{}", presenter::status_message(stage));
        })
    });

    match result {
        Ok(_) => Ok(()),
        // Every run failure maps to one terminal status line, never a crash
        Err(err) => match FailureKind::of(&err) {
            Some(kind) => {
                tracing::debug!(error = %err, "verification run aborted");
                println!("{}", presenter::status_message(&Stage::Failed(kind)));
                Ok(())
            }
            None => Err(err.into()),
        },
    }
}

fn run_enroll(
    config: &Config,
    person_id: &str,
    image_path: &PathBuf,
    email: &str,
    password: &str,
) -> Result<()> {
    let mut provider = CliAuthProvider::default();
    let mut gate = AccessGate::new(&mut provider, config.admin.predicate.clone());

    match gate.login_with_password(email, password) {
        Admission::Admit(identity) => {
            tracing::info!(admin = %identity.email, "enrollment authorized");
            let backend = HttpBackend::new(&config.backend)?;
            let form = EnrollmentForm {
                person_id: person_id.to_string(),
                image: Some(std::fs::read(image_path)?),
            };
            match enroll::submit_enrollment(&backend, form)? {
                EnrollOutcome::Enrolled(message) => println!("{}", message),
                EnrollOutcome::Rejected(message) => println!("{}", message),
            }
        }
        Admission::Deny(reason) => println!("{}", reason),
    }

    Ok(())
}

/// Stand-in for the external identity provider. A deployment wires a real
/// IdP behind [`AuthProvider`]; the CLI takes the claim from its flags and
/// leaves the admission decision to the gate.
#[derive(Default)]
struct CliAuthProvider {
    session: Option<Identity>,
}

impl AuthProvider for CliAuthProvider {
    fn sign_in_with_password(&mut self, email: &str, password: &str) -> facegate::Result<Identity> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(FaceGateError::AuthFailed("missing credentials".to_string()));
        }
        let identity = Identity { email: email.to_string() };
        self.session = Some(identity.clone());
        Ok(identity)
    }

    fn sign_in_with_provider(&mut self) -> facegate::Result<Identity> {
        Err(FaceGateError::AuthFailed("no external provider configured".to_string()))
    }

    fn sign_out(&mut self) {
        self.session = None;
    }
}

fn setup_logging(dev_mode: bool) {
    if dev_mode {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }
}
