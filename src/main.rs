use anyhow::Context;
use clap::{Parser, Subcommand};
use facegate_core::{Distance, EngineConfig, Identity, Uid};
use facegate_session::{DirectoryCapture, LineCommands, Pipeline, SessionConfig, SessionController};
use facegate_storage::{DatasetManager, NamingScheme};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Identify faces against a live enrollment gallery
#[derive(Parser, Debug)]
#[command(name = "facegate")]
#[command(about = "Face identification with live enrollment", long_about = None)]
struct Args {
    /// Directory containing `dataset/train` and `dataset/test`
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Side length of the normalized face image
    #[arg(long, default_value_t = 64)]
    face_size: u32,

    /// Embedding grid; embeddings have grid * grid components
    #[arg(long, default_value_t = 16)]
    grid: u32,

    /// Use cosine instead of Euclidean distance
    #[arg(long)]
    cosine: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive loop: one command per line (a, n, d, s, q)
    Session {
        /// Directory of frames replayed as the camera stream
        #[arg(long)]
        frames: PathBuf,

        /// Where `s` saves the annotated frame
        #[arg(long, default_value = "face.jpg")]
        snapshot: PathBuf,

        /// Report faces farther than this from every gallery sample as unknown
        #[arg(long)]
        max_distance: Option<f32>,
    },
    /// Accuracy of the gallery on the test split
    Evaluate {
        #[arg(long)]
        json: bool,
    },
    /// Classify a single image as one face
    Identify { image: PathBuf },
    /// Show the file the next enrollment would be written to
    Allocate {
        /// Existing uid; omit for a new identity
        #[arg(long)]
        uid: Option<u32>,
    },
    /// List gallery identities
    Persons,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting facegate v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let dataset = DatasetManager::new(&args.data_dir, NamingScheme::default())
        .context("failed to open dataset")?;
    let engine_config = EngineConfig {
        distance: if args.cosine { Distance::Cosine } else { Distance::Euclidean },
        expected_dim: Some((args.grid * args.grid) as usize),
    };
    let session_config = match &args.command {
        Commands::Session {
            snapshot,
            max_distance,
            ..
        } => SessionConfig {
            snapshot_path: snapshot.clone(),
            max_distance: *max_distance,
        },
        _ => SessionConfig::default(),
    };

    let mut session = SessionController::new(
        dataset,
        Pipeline::reference(args.face_size, args.grid),
        engine_config,
        session_config,
    )
    .context("failed to load gallery")?;

    match args.command {
        Commands::Session { frames, .. } => {
            let mut capture = DirectoryCapture::new(&frames)?;
            let mut commands = LineCommands::new(std::io::stdin().lock());
            let summary = session.run(&mut capture, &mut commands)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Evaluate { json } => {
            let eval = session.evaluate()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&eval)?);
            } else {
                println!(
                    "accuracy: {:.4} ({}/{})",
                    eval.accuracy, eval.correct, eval.total
                );
            }
        }
        Commands::Identify { image } => {
            let frame = image::open(&image)
                .with_context(|| format!("failed to open {}", image.display()))?
                .to_rgb8();
            match session.identify(&frame)? {
                Some(m) => println!("uid: {} (distance {:.4})", m.uid, m.distance),
                None => println!("uid: unknown (empty gallery)"),
            }
        }
        Commands::Allocate { uid } => {
            let identity = Identity::from(uid.map(Uid));
            let key = session.allocator().allocate(session.train(), identity);
            println!("{}", session.dataset().train().path_for(key).display());
        }
        Commands::Persons => {
            println!("{}", serde_json::to_string_pretty(&session.train().get_persons())?);
        }
    }

    Ok(())
}
