use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use oxidize_cos::{ObjectId, ObjectParser, ParseOptions, PdfContext};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "oxidizecos",
    about = "Inspect the COS objects of a PDF file",
    version,
    author
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse consecutive objects starting at a byte offset
    Parse {
        /// Input file
        file: PathBuf,

        /// Byte offset of the first object
        #[arg(short, long, default_value_t = 0)]
        offset: usize,

        /// Number of objects to parse
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Identity of the enclosing indirect object (NUM GEN)
        #[arg(long, num_args = 2, value_names = ["NUM", "GEN"])]
        object: Option<Vec<u32>>,

        /// Clamp numbers beyond 2^53 - 1
        #[arg(long)]
        cap_numbers: bool,

        /// Treat unterminated strings as errors
        #[arg(long)]
        strict: bool,

        /// Decode #xx escapes in names
        #[arg(long)]
        decode_names: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            file,
            offset,
            count,
            object,
            cap_numbers,
            strict,
            decode_names,
        } => {
            let mut options = if strict {
                ParseOptions::strict()
            } else {
                ParseOptions::default()
            };
            options.cap_numbers = cap_numbers;
            options.decode_name_escapes = decode_names;

            let id = object.map(|parts| object_id(&parts)).transpose()?;
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            parse_objects(data, offset, count, id, options)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn object_id(parts: &[u32]) -> Result<ObjectId> {
    match parts {
        [number, generation] => {
            let generation = u16::try_from(*generation)
                .with_context(|| format!("Generation {generation} does not fit in 16 bits"))?;
            Ok(ObjectId::new(*number, generation))
        }
        _ => bail!("--object expects an object number and a generation"),
    }
}

fn parse_objects(
    data: Vec<u8>,
    offset: usize,
    count: usize,
    id: Option<ObjectId>,
    options: ParseOptions,
) -> Result<()> {
    let len = data.len();
    tracing::debug!("Parsing up to {count} object(s) at offset {offset} of {len} bytes");
    let mut context = PdfContext::new();
    let mut parser = ObjectParser::with_options(data, &mut context, options);
    parser
        .move_to(offset)
        .with_context(|| format!("Offset {offset} is outside the file ({len} bytes)"))?;

    for index in 0..count {
        parser.skip_whitespace_and_comments();
        if parser.is_done() {
            println!("End of input after {index} object(s)");
            break;
        }

        let position = parser.position();
        let parsed = parser
            .parse_object(id)
            .with_context(|| format!("Failed to parse object {} at {position}", index + 1))?;

        println!(
            "#{} {} at {position}",
            index + 1,
            parsed.value.type_name()
        );
        println!("{:#?}", parsed.value);
        for warning in &parsed.warnings {
            println!("warning: {warning}");
        }

        // Step over the `endobj` closing an indirect object body
        parser.skip_whitespace_and_comments();
        parser.match_keyword(b"endobj");
    }

    Ok(())
}
