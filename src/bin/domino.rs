use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, ValueEnum};
use domino_rs::{
    audio, labels, Aligner, AlignerBuilder, AlignerConfig, AlignmentError, PhonemeAlignment,
    Waveform,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `start\tend\tphoneme`, three decimals.
    Lab,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Lab => "lab",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "domino")]
#[command(about = "Align a phoneme transcription to 16 kHz mono speech")]
struct Args {
    /// A `.wav` file, or a directory of `.wav` files with sibling `.txt` transcriptions.
    #[arg(long = "input_path")]
    input_path: PathBuf,
    /// Space separated phonemes; defaults to the `.txt` next to the wav.
    #[arg(long = "input_phoneme")]
    input_phoneme: Option<String>,
    /// Output file (single wav) or directory (directory input).
    #[arg(long = "output_path")]
    output_path: Option<PathBuf>,
    /// Minimum number of 10 ms frames per non-boundary phoneme.
    #[arg(long = "min_frame", default_value_t = 5, allow_negative_numbers = true)]
    min_frame: i64,
    #[arg(
        long = "model_path",
        env = "DOMINO_MODEL_PATH",
        default_value = "onnx_model/phoneme_transition_model.onnx"
    )]
    model_path: String,
    /// Transition vocabulary; defaults to `phoneme_transitions.txt` next to the model.
    #[arg(long = "vocab_path", env = "DOMINO_VOCAB_PATH")]
    vocab_path: Option<String>,
    #[arg(long = "output_format", value_enum, default_value_t = OutputFormat::Lab)]
    output_format: OutputFormat,
    /// Use the transcription verbatim: no edge `pau`, devoicing or repeat merging.
    #[arg(long = "no_normalize", default_value_t = false)]
    no_normalize: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("error [{}]: {err}", err.kind());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AlignmentError> {
    let started = Instant::now();
    let config = AlignerConfig {
        model_path: args.model_path.clone(),
        vocab_path: args.vocab_path.clone(),
        normalize_phonemes: !args.no_normalize,
        ..AlignerConfig::default()
    };
    let aligner = AlignerBuilder::new(config).build()?;
    tracing::info!(
        scorer = %aligner.scorer_label(),
        model_path = %args.model_path,
        "aligner ready"
    );

    let result = if args.input_path.is_dir() {
        align_directory(&aligner, &args)
    } else if is_wav(&args.input_path) && args.input_path.is_file() {
        let output_path = args
            .output_path
            .clone()
            .unwrap_or_else(|| args.input_path.with_extension(args.output_format.extension()));
        let phonemes = match &args.input_phoneme {
            Some(phonemes) => phonemes.clone(),
            None => labels::read_phoneme_file(&args.input_path.with_extension("txt"))?,
        };
        align_file(&aligner, &args, &args.input_path, &phonemes, &output_path)
    } else {
        Err(AlignmentError::InvalidArgument {
            message: format!("invalid input_path: {}", args.input_path.display()),
        })
    };

    aligner.release();
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "total"
    );
    result
}

fn align_directory(aligner: &Aligner, args: &Args) -> Result<(), AlignmentError> {
    let mut wav_files = std::fs::read_dir(&args.input_path)
        .map_err(|e| AlignmentError::Io {
            context: "list input directory",
            source: e,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_wav(path))
        .collect::<Vec<_>>();
    wav_files.sort();

    if let Some(dir) = &args.output_path {
        std::fs::create_dir_all(dir).map_err(|e| AlignmentError::Io {
            context: "create output directory",
            source: e,
        })?;
    }

    for wav_file in &wav_files {
        let lab_file = with_extension_in(
            wav_file,
            args.output_format.extension(),
            args.output_path.as_deref(),
        );
        let phonemes = labels::read_phoneme_file(&wav_file.with_extension("txt"))?;
        align_file(aligner, args, wav_file, &phonemes, &lab_file)?;
    }
    tracing::info!(files = wav_files.len(), "directory aligned");
    Ok(())
}

fn align_file(
    aligner: &Aligner,
    args: &Args,
    wav_file: &Path,
    phonemes: &str,
    output_path: &Path,
) -> Result<(), AlignmentError> {
    let started = Instant::now();
    let samples = audio::read_wav_mono_16k(wav_file)?;
    let alignment = aligner.align(&Waveform::mono_16k(&samples), phonemes, args.min_frame)?;
    write_output(&alignment, output_path, args.output_format)?;
    tracing::info!(
        wav = %wav_file.display(),
        output = %output_path.display(),
        segments = alignment.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "aligned"
    );
    Ok(())
}

fn write_output(
    alignment: &[PhonemeAlignment],
    path: &Path,
    format: OutputFormat,
) -> Result<(), AlignmentError> {
    match format {
        OutputFormat::Lab => labels::write_lab_file(alignment, path),
        OutputFormat::Json => labels::write_json_file(alignment, path),
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// `Path::with_extension`, optionally moved into `parent_dir`.
fn with_extension_in(file: &Path, extension: &str, parent_dir: Option<&Path>) -> PathBuf {
    let new_path = file.with_extension(extension);
    match (parent_dir, new_path.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => new_path,
    }
}
