use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use dna_calib::{DnaReader as _, DnaWriter as _};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "dna-calib", version)]
struct Cli {
    /// Log stage progress (repeat for debug output).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a DNA file.
    Inspect(InspectArgs),
    /// Write the scene snapshot a fresh import of a DNA file would produce.
    Mirror(MirrorArgs),
    /// Calibrate a DNA file against an edited scene snapshot.
    Calibrate(CalibrateArgs),
    /// Convert a DNA file between the binary and JSON encodings.
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// DNA file (.dna or .json).
    dna: PathBuf,
}

#[derive(Parser, Debug)]
struct MirrorArgs {
    /// Input DNA file.
    #[arg(long)]
    dna: PathBuf,

    /// Output scene snapshot JSON.
    #[arg(long)]
    out: PathBuf,

    /// Instance name prefixed to object names.
    #[arg(long)]
    instance: Option<String>,

    /// Scene up axis.
    #[arg(long, value_enum, default_value_t = UpAxisChoice::ZUp)]
    up_axis: UpAxisChoice,
}

#[derive(Parser, Debug)]
struct CalibrateArgs {
    /// Input DNA file.
    #[arg(long)]
    dna: PathBuf,

    /// Edited scene snapshot JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Output DNA file; the encoding follows its extension.
    #[arg(long)]
    out: PathBuf,

    /// Calibration config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instance name prefixed to object names (overrides the config).
    #[arg(long)]
    instance: Option<String>,

    #[arg(long)]
    no_meshes: bool,

    #[arg(long)]
    no_shape_keys: bool,

    #[arg(long)]
    no_bones: bool,

    /// Reconcile meshes in parallel.
    #[arg(long)]
    parallel: bool,

    /// Print the calibration report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UpAxisChoice {
    YUp,
    ZUp,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let res = match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Mirror(args) => cmd_mirror(args),
        Command::Calibrate(args) => cmd_calibrate(args),
        Command::Convert(args) => cmd_convert(args),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_code(&e)
        }
    }
}

/// 2 when a calibration aborted after validation passed, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<dna_calib::CalibError>() {
        Some(e) if e.is_fatal() => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_dna(path: &Path) -> anyhow::Result<dna_calib::DnaStream> {
    dna_calib::DnaStream::open(path).with_context(|| format!("open DNA '{}'", path.display()))
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.dna).with_context(|| format!("read '{}'", args.dna.display()))?;
    let dna = open_dna(&args.dna)?;

    println!("name:        {}", dna.name());
    println!("format:      {:?}", dna.format());
    println!("units:       {:?} / {:?}", dna.translation_unit(), dna.rotation_unit());
    println!("lods:        {}", dna.lod_count());
    println!("joints:      {}", dna.joint_count());
    println!("channels:    {}", dna.blend_shape_channel_count());
    println!("meshes:      {}", dna.mesh_count());
    for m in 0..dna.mesh_count() {
        println!(
            "  {:<32} vertices={} targets={}",
            dna.mesh_name(m),
            dna.vertex_position_count(m),
            dna.blend_shape_target_count(m)
        );
    }
    println!("sha256:      {}", sha256_hex(&bytes));
    Ok(())
}

fn cmd_mirror(args: MirrorArgs) -> anyhow::Result<()> {
    let dna = open_dna(&args.dna)?;
    let up_axis = match args.up_axis {
        UpAxisChoice::YUp => dna_calib::UpAxis::YUp,
        UpAxisChoice::ZUp => dna_calib::UpAxis::ZUp,
    };
    let convention =
        dna_calib::SceneConvention::new(up_axis, dna.translation_unit().linear_modifier())?;
    let snapshot = dna_calib::mirror_document(&dna, convention, args.instance.as_deref())?;
    snapshot
        .to_path(&args.out)
        .with_context(|| format!("write scene snapshot '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_calibrate(args: CalibrateArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(p) => dna_calib::CalibrationConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => dna_calib::CalibrationConfig::default(),
    };
    if args.instance.is_some() {
        config.instance_name = args.instance.clone();
    }
    config.include_meshes &= !args.no_meshes;
    config.include_shape_keys &= !args.no_shape_keys;
    config.include_bones &= !args.no_bones;
    config.parallel |= args.parallel;

    let scene = dna_calib::SceneSnapshot::from_path(&args.scene)
        .with_context(|| format!("load scene '{}'", args.scene.display()))?;
    let mut dna = open_dna(&args.dna)?;
    dna.retarget(&args.out)?;

    let report = dna_calib::Calibrator::new(&mut dna, &scene, config)?.run()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    for w in &report.warnings {
        eprintln!("warning: {w}");
    }
    if !report.success {
        let fix = report
            .fix
            .as_ref()
            .map(|f| format!(" (fix: {f:?})"))
            .unwrap_or_default();
        anyhow::bail!("{}: {}{fix}", report.title, report.message);
    }
    eprintln!(
        "wrote {} ({} vertices, {} targets, {} joint translations, {} joint rotations)",
        args.out.display(),
        report.stats.vertices_changed,
        report.stats.targets_rewritten,
        report.stats.joint_translations_changed,
        report.stats.joint_rotations_changed
    );
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let mut dna = open_dna(&args.in_path)?;
    dna.retarget(&args.out)?;
    dna.write();
    if !dna.status().is_ok() {
        anyhow::bail!("write '{}': {}", args.out.display(), dna.status().message());
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
