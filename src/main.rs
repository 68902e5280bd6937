use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use transkriptor::{
    check_format, export, mask, Anonymizer, DiarizationSource, HfNerClient, Pipeline,
    PipelineOptions, RemoteAsrClient, RemoteDiarizationBackend, TokenStore,
};

#[derive(Parser)]
#[command(name = "transkriptor")]
#[command(author, version, about = "Audio transcription with speaker diarization and anonymization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe an audio file into a speaker-attributed transcript
    Transcribe {
        /// Input audio file (.wav, .mp3, .m4a)
        #[arg(short, long)]
        input: PathBuf,

        /// Transcription model size
        #[arg(long, default_value = "large")]
        model_size: String,

        /// Run audio preprocessing (resample/normalize) first
        #[arg(long)]
        preprocess: bool,

        /// Anonymize names, places, numbers and contact data in the text
        #[arg(long)]
        anonymize: bool,

        /// Attribute lines to speakers via diarization
        #[arg(long)]
        diarize: bool,

        /// Prefix each line with a [start-end] timestamp
        #[arg(long)]
        timestamps: bool,

        /// Skip the diarization model and collapse all speakers into one
        #[arg(long)]
        force_fallback: bool,

        /// Write the transcript as plain text to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the transcript as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print the raw diarization and transcript segments afterwards
        #[arg(long)]
        debug_segments: bool,

        /// Path to the config file holding the access token
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Base URL of the transcription service
        #[arg(long, default_value = "http://127.0.0.1:9736")]
        asr_url: String,

        /// Base URL of the diarization model host
        #[arg(long, default_value = "http://127.0.0.1:9737")]
        diarize_url: String,

        /// Named-entity recognition endpoint for the anonymizer
        #[arg(
            long,
            default_value = "https://api-inference.huggingface.co/models/mschiesser/ner-bert-german"
        )]
        ner_url: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Manage the persisted Hugging Face access token
    Token {
        #[command(subcommand)]
        command: TokenCommands,

        /// Path to the config file holding the access token
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Show the stored token (masked) and check its format
    Show,
    /// Store a new token
    Set { token: String },
    /// Validate the stored token against the Hugging Face API
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transcribe {
            input,
            model_size,
            preprocess,
            anonymize,
            diarize,
            timestamps,
            force_fallback,
            output,
            json,
            debug_segments,
            config,
            asr_url,
            diarize_url,
            ner_url,
            verbose,
        } => {
            setup_logging(verbose);
            let options = PipelineOptions {
                model_size,
                preprocess,
                anonymize,
                diarize,
                timestamps,
                force_fallback,
            };
            transcribe(
                input,
                options,
                output,
                json,
                debug_segments,
                config,
                asr_url,
                diarize_url,
                ner_url,
            )
            .await
        }
        Commands::Token { command, config } => {
            setup_logging(false);
            manage_token(command, config).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn transcribe(
    input: PathBuf,
    options: PipelineOptions,
    output: Option<PathBuf>,
    json: Option<PathBuf>,
    debug_segments: bool,
    config: PathBuf,
    asr_url: String,
    diarize_url: String,
    ner_url: String,
) -> Result<()> {
    let store = TokenStore::new(config);
    let token = match store.load() {
        Ok(token) => token,
        Err(err) => {
            warn!("Could not load access token: {}", err);
            None
        }
    };

    let mut pipeline = Pipeline::new(Arc::new(RemoteAsrClient::new(asr_url)));

    if options.diarize {
        let backend = Arc::new(RemoteDiarizationBackend::new(diarize_url));
        pipeline = pipeline.with_diarization(DiarizationSource::new(backend));
    }

    if options.anonymize {
        let recognizer = Arc::new(HfNerClient::new(ner_url, token.clone()));
        pipeline = pipeline.with_anonymizer(Anonymizer::with_recognizer(recognizer));
    }

    info!("Processing {:?}", input);
    let result = pipeline.run(&input, token.as_deref(), &options).await?;

    if let Some(path) = &output {
        export::write_text(path, &result.text)?;
        info!("Transcript written to {:?}", path);
    }
    if let Some(path) = &json {
        export::write_json(path, &result.text)?;
        info!("JSON export written to {:?}", path);
    }
    if output.is_none() && json.is_none() {
        println!("{}", result.text);
    }

    if debug_segments {
        println!();
        println!("{}", export::render_debug(&result.debug));
    }

    Ok(())
}

async fn manage_token(command: TokenCommands, config: PathBuf) -> Result<()> {
    let store = TokenStore::new(config);

    match command {
        TokenCommands::Show => {
            match store.load()? {
                Some(token) => {
                    println!("Token: {}", mask(&token));
                    println!("Format: {}", check_format(&token).message());
                }
                None => println!("No token found in {:?}", store.path()),
            }
            Ok(())
        }
        TokenCommands::Set { token } => {
            let check = check_format(&token);
            if !check.is_usable() {
                warn!("Storing token anyway, but: {}", check.message());
            }
            store.save(&token)?;
            println!("Token saved to {:?}", store.path());
            Ok(())
        }
        TokenCommands::Validate => {
            let token = store
                .load()?
                .context("No token stored; run `transkriptor token set <token>` first")?;
            let check = check_format(&token);
            if !check.is_usable() {
                anyhow::bail!("Token format invalid: {}", check.message());
            }
            let account = transkriptor::config::validate_remote(&token).await?;
            println!("Token is valid (account: {})", account);
            Ok(())
        }
    }
}
