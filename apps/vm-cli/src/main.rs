use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use vm_app::{
    AppError, AppResult, BACKEND_ENV, CommandBackend, DispatchOptions, RunRequest, RunResponse,
    RunSource, SimulationConfig, can_deserialize, dispatch,
};
use vm_config::{ConfigError, ManualForm, TimeVariationForm, TransformSelectors};

#[derive(Parser)]
#[command(name = "vm-cli")]
#[command(about = "Vectorial model front-end - run and inspect coma simulations", long_about = None)]
struct Cli {
    /// Bridge program driving the model library (falls back to VM_BACKEND)
    #[arg(long, global = true)]
    backend: Option<PathBuf>,
    /// Extra leading argument for the bridge program, e.g. a script path
    #[arg(long = "backend-arg", global = true)]
    backend_args: Vec<OsString>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a configuration document and refresh its etc block
    Validate {
        /// Path to the configuration YAML file
        config_path: PathBuf,
        /// Results cache to record in the etc block
        #[arg(long)]
        coma_pickle: Option<PathBuf>,
    },
    /// Check whether a results file can be read back
    Probe {
        /// Path to the serialized results
        blob_path: PathBuf,
    },
    /// Run the model and print its tables
    #[command(subcommand)]
    Run(RunCommands),
}

#[derive(Subcommand)]
enum RunCommands {
    /// Run from a configuration document
    Yaml {
        /// Path to the configuration YAML file
        config_path: PathBuf,
        /// Results cache to record in the etc block
        #[arg(long)]
        coma_pickle: Option<PathBuf>,
    },
    /// Show results saved by an earlier run
    Blob {
        /// Path to the serialized results
        blob_path: PathBuf,
    },
    /// Run from values typed on the command line
    Manual(ManualArgs),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variation {
    None,
    Sine,
    Gaussian,
    SquarePulse,
}

#[derive(Clone, Copy, ValueEnum)]
enum Transform {
    None,
    CochranSchleicher93,
    FestouFortran,
}

// Raw field text; checking happens in the form, not in the argument parser.
#[derive(Args)]
struct ManualArgs {
    #[arg(long, default_value = "")]
    base_q: String,
    #[arg(long, value_enum, default_value = "none")]
    variation: Variation,
    #[arg(long, default_value = "")]
    amplitude: String,
    #[arg(long, default_value = "")]
    period: String,
    #[arg(long, default_value = "")]
    delta: String,
    #[arg(long, default_value = "")]
    std_dev: String,
    #[arg(long, default_value = "")]
    t_max: String,
    #[arg(long, default_value = "")]
    duration: String,
    #[arg(long, default_value = "")]
    t_start: String,

    #[arg(long, default_value = "")]
    parent_name: String,
    #[arg(long, default_value = "")]
    v_outflow: String,
    #[arg(long, default_value = "")]
    tau_d: String,
    #[arg(long, default_value = "")]
    sigma: String,
    #[arg(long, default_value = "")]
    t_to_d_ratio: String,

    #[arg(long, default_value = "")]
    fragment_name: String,
    #[arg(long, default_value = "")]
    v_photo: String,
    #[arg(long, default_value = "")]
    tau_t: String,

    #[arg(long, default_value = "")]
    comet_name: String,
    #[arg(long, default_value = "")]
    rh: String,
    /// Geocentric distance in AU
    #[arg(long, default_value = "")]
    comet_delta: String,
    #[arg(long, value_enum, default_value = "none")]
    transform: Transform,

    #[arg(long, default_value = "")]
    angular_points: String,
    #[arg(long, default_value = "")]
    radial_points: String,
    #[arg(long, default_value = "")]
    radial_substeps: String,

    /// Where to write the assembled configuration
    #[arg(long, default_value = vm_app::DEFAULT_MANUAL_CONFIG)]
    config_out: PathBuf,
    /// Keep the assembled configuration after the run
    #[arg(long)]
    keep_file: bool,
    /// Results cache to record in the etc block
    #[arg(long)]
    coma_pickle: Option<PathBuf>,
}

impl ManualArgs {
    fn form(&self) -> ManualForm {
        let variation = self.variation;
        let pick = |wanted: Variation, text: &str| {
            if variation == wanted {
                text.to_string()
            } else {
                String::new()
            }
        };
        ManualForm {
            base_q: self.base_q.clone(),
            time_variation: TimeVariationForm {
                sine: variation == Variation::Sine,
                gaussian: variation == Variation::Gaussian,
                square_pulse: variation == Variation::SquarePulse,
                none: variation == Variation::None,
                sine_amplitude: pick(Variation::Sine, &self.amplitude),
                sine_period: pick(Variation::Sine, &self.period),
                sine_delta: pick(Variation::Sine, &self.delta),
                gaussian_amplitude: pick(Variation::Gaussian, &self.amplitude),
                gaussian_std_dev: pick(Variation::Gaussian, &self.std_dev),
                gaussian_t_max: pick(Variation::Gaussian, &self.t_max),
                square_amplitude: pick(Variation::SquarePulse, &self.amplitude),
                square_duration: pick(Variation::SquarePulse, &self.duration),
                square_t_start: pick(Variation::SquarePulse, &self.t_start),
            },
            parent_name: self.parent_name.clone(),
            v_outflow: self.v_outflow.clone(),
            tau_d: self.tau_d.clone(),
            sigma: self.sigma.clone(),
            t_to_d_ratio: self.t_to_d_ratio.clone(),
            fragment_name: self.fragment_name.clone(),
            v_photo: self.v_photo.clone(),
            tau_t: self.tau_t.clone(),
            comet_name: self.comet_name.clone(),
            rh: self.rh.clone(),
            comet_delta: self.comet_delta.clone(),
            transform: TransformSelectors {
                cochran_schleicher_93: matches!(self.transform, Transform::CochranSchleicher93),
                festou_fortran: matches!(self.transform, Transform::FestouFortran),
                none: matches!(self.transform, Transform::None),
            },
            angular_points: self.angular_points.clone(),
            radial_points: self.radial_points.clone(),
            radial_substeps: self.radial_substeps.clone(),
        }
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            config_path,
            coma_pickle,
        } => cmd_validate(&config_path, coma_pickle),
        Commands::Probe { blob_path } => {
            let mut backend = backend(cli.backend, cli.backend_args)?;
            cmd_probe(&mut backend, &blob_path)
        }
        Commands::Run(run_cmd) => {
            let mut backend = backend(cli.backend, cli.backend_args)?;
            match run_cmd {
                RunCommands::Yaml {
                    config_path,
                    coma_pickle,
                } => cmd_run(
                    &mut backend,
                    RunRequest {
                        source: RunSource::Yaml(Some(&config_path)),
                        coma_pickle: coma_pickle.as_deref(),
                        options: DispatchOptions::default(),
                    },
                ),
                RunCommands::Blob { blob_path } => cmd_run(
                    &mut backend,
                    RunRequest {
                        source: RunSource::Blob(Some(&blob_path)),
                        coma_pickle: Some(&blob_path),
                        options: DispatchOptions::default(),
                    },
                ),
                RunCommands::Manual(args) => {
                    let form = args.form();
                    cmd_run(
                        &mut backend,
                        RunRequest {
                            source: RunSource::Manual(&form),
                            coma_pickle: args.coma_pickle.as_deref(),
                            options: DispatchOptions {
                                manual_config_path: args.config_out.clone(),
                                keep_file: args.keep_file,
                            },
                        },
                    )
                }
            }
        }
    }
}

fn backend(program: Option<PathBuf>, args: Vec<OsString>) -> AppResult<CommandBackend> {
    let backend = match program {
        Some(program) => CommandBackend::new(program),
        None => CommandBackend::from_env().ok_or_else(|| AppError::Backend {
            message: format!("no bridge program given; pass --backend or set {BACKEND_ENV}"),
        })?,
    };
    tracing::debug!(program = %backend.program().display(), "using bridge");
    Ok(args.into_iter().fold(backend, |backend, arg| backend.arg(arg)))
}

fn cmd_validate(config_path: &Path, coma_pickle: Option<PathBuf>) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let now = chrono::Local::now().naive_local();
    match vm_config::validate_file(config_path, coma_pickle, now) {
        Ok(_) => {
            println!("✓ Configuration is valid");
            Ok(())
        }
        Err(ConfigError::Document(err)) => {
            println!("✗ Missing or invalid field: {}", err.locator);
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_probe(backend: &mut CommandBackend, blob_path: &Path) -> AppResult<()> {
    if can_deserialize(backend, blob_path)? {
        println!("✓ Results file is readable: {}", blob_path.display());
        Ok(())
    } else {
        println!("✗ Results file could not be read: {}", blob_path.display());
        std::process::exit(1);
    }
}

fn cmd_run(backend: &mut CommandBackend, request: RunRequest) -> AppResult<()> {
    match dispatch(backend, &request)? {
        Ok(response) => {
            print_response(&response);
            Ok(())
        }
        Err(failure) => {
            eprintln!("{}", failure.user_message());
            std::process::exit(1);
        }
    }
}

fn print_response(response: &RunResponse) {
    match &response.config {
        SimulationConfig::Loaded(config) => {
            println!(
                "✓ Simulation completed: {}",
                response.run_id.as_deref().unwrap_or("-")
            );
            println!(
                "  Comet: {}  Parent: {}  Fragment: {}",
                config.comet.name.as_deref().unwrap_or("-"),
                config.parent.name.as_deref().unwrap_or("-"),
                config.fragment.name.as_deref().unwrap_or("-"),
            );
        }
        SimulationConfig::Placeholder { fragment_name } => {
            println!("✓ Results loaded (fragment: {fragment_name})");
        }
    }
    println!("  Time: {:.2}s", response.elapsed_s);

    print!("{}", response.radial_density_table());
    print!("{}", response.column_density_table());
    print!("{}", response.agreement_check());
    if let Some(report) = &response.aperture_report {
        print!("{report}");
    }
    println!(
        "\nMax grid radius: {:.0} km",
        response.result.max_grid_radius_m / 1000.0
    );
}
