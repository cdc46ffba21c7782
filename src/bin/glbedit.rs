use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use glbedit::{
    Container, EditorConfig, ErrorCategory, FsStorage, GlbEditError, GlbEditResult, GlbEditor,
    MaterialLookup, ParameterChangeRequest, TextureChangeRequest, TextureSlot,
    UnknownFieldPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "glbedit", version, about = "Edit materials and textures of glTF/GLB assets")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// JSON config file; flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding source models.
    #[arg(long, global = true)]
    source_dir: Option<PathBuf>,

    /// Directory receiving results.
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    /// Directory holding texture images.
    #[arg(long, global = true)]
    textures_dir: Option<PathBuf>,

    /// Insert override keys the material does not have instead of rejecting them.
    #[arg(long, global = true)]
    insert_unknown_fields: bool,

    /// Reject material names carried by more than one material.
    #[arg(long, global = true)]
    strict_names: bool,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge parameter overrides into named materials.
    Parameters(RequestArgs),
    /// Point material texture slots at new image files.
    Textures(RequestArgs),
    /// Print materials with their texture bindings and sharing counts.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Request JSON file.
    #[arg(long)]
    request: PathBuf,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// glTF or GLB file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli) {
        Ok(out) => {
            println!("{out:#}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(error = ?err, "request failed");
            let report = json!({
                "status": "error",
                "kind": err.kind(),
                "detail": err.to_string(),
            });
            eprintln!("{report}");
            ExitCode::from(exit_code(err.category()))
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(category: ErrorCategory) -> u8 {
    match category {
        ErrorCategory::ServerError => 1,
        ErrorCategory::ClientError => 2,
        ErrorCategory::Unprocessable => 3,
    }
}

fn run(cli: Cli) -> GlbEditResult<serde_json::Value> {
    match cli.cmd {
        Command::Parameters(args) => {
            let request: ParameterChangeRequest = read_json(&args.request)?;
            let mut editor = make_editor(&cli.global)?;
            let response = editor.change_parameters(&request)?;
            Ok(serde_json::to_value(response).context("encode response")?)
        }
        Command::Textures(args) => {
            let request: TextureChangeRequest = read_json(&args.request)?;
            let mut editor = make_editor(&cli.global)?;
            let response = editor.change_textures(&request)?;
            Ok(serde_json::to_value(response).context("encode response")?)
        }
        Command::Inspect(args) => inspect(&args.in_path),
    }
}

fn load_config(global: &GlobalArgs) -> GlbEditResult<EditorConfig> {
    let mut config = match &global.config {
        Some(path) => EditorConfig::from_json_file(path)
            .map_err(|e| GlbEditError::invalid_request(format!("{e:#}")))?,
        None => EditorConfig::default(),
    };
    if let Some(dir) = &global.source_dir {
        config.source_dir = dir.clone();
    }
    if let Some(dir) = &global.results_dir {
        config.results_dir = dir.clone();
    }
    if let Some(dir) = &global.textures_dir {
        config.textures_dir = dir.clone();
    }
    if global.insert_unknown_fields {
        config.unknown_fields = UnknownFieldPolicy::Insert;
    }
    if global.strict_names {
        config.material_lookup = MaterialLookup::Strict;
    }
    Ok(config)
}

fn make_editor(global: &GlobalArgs) -> GlbEditResult<GlbEditor<FsStorage>> {
    let config = load_config(global)?;
    tracing::debug!(?config, "editor config");
    let options = config.edit_options();
    Ok(GlbEditor::new(FsStorage::new(config), options))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> GlbEditResult<T> {
    let f = File::open(path)
        .with_context(|| format!("open request '{}'", path.display()))
        .map_err(|e| GlbEditError::invalid_request(format!("{e:#}")))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse request '{}'", path.display()))
        .map_err(|e| GlbEditError::invalid_request(format!("{e:#}")))
}

fn inspect(path: &Path) -> GlbEditResult<serde_json::Value> {
    if !path.is_file() {
        return Err(GlbEditError::source_not_found(path.display().to_string()));
    }
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let asset = glbedit::parse(&bytes)?;
    let doc = &asset.document;

    let materials: Vec<_> = doc
        .materials
        .iter()
        .enumerate()
        .map(|(idx, material)| {
            let slots: Vec<_> = TextureSlot::ALL
                .iter()
                .filter_map(|&slot| {
                    let texture = slot.read(material)?.index;
                    let usage = glbedit::usage(doc, texture);
                    let image = doc.image_of(texture);
                    let image_desc = image.and_then(|i| doc.images.get(i)).map(|img| {
                        if img.is_file_backed() {
                            json!({ "uri": img.uri })
                        } else {
                            json!({ "embedded": true, "mimeType": img.mime_type })
                        }
                    });
                    Some(json!({
                        "slot": slot.key(),
                        "texture": texture,
                        "image": image,
                        "source": image_desc,
                        "texturesSharingImage": usage.textures_sharing_image,
                        "materialsUsingTexture": usage.materials_using_texture,
                        "inPlace": usage.sharing() == glbedit::Sharing::SafeToMutateInPlace,
                    }))
                })
                .collect();
            json!({ "index": idx, "name": material.name, "slots": slots })
        })
        .collect();

    Ok(json!({
        "container": match asset.container() {
            Container::Glb => "glb",
            Container::Json => "gltf",
        },
        "blobBytes": asset.blob().map_or(0, <[u8]>::len),
        "textures": doc.textures.len(),
        "images": doc.images.len(),
        "duplicateMaterialNames": doc.duplicate_material_names(),
        "materials": materials,
    }))
}
