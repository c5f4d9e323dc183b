use std::path::Path;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::LevelFilter;

use ib_forces::{
    floating_type_mod::FT, index_mapper::one_dimensional_window, Axis, DeltaKernelTrait, ForceModelParams, IbError,
    IbResult, SceneConfig,
};

const CARGO_PKG_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const CARGO_PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub fn start() {
    let matches = App::new("Immersed Boundary Forces")
        .version(CARGO_PKG_VERSION)
        .author(CARGO_PKG_AUTHORS)
        .about(CARGO_PKG_DESCRIPTION)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            SubCommand::with_name("spread")
                .about("Compute the structure forces once and spread them onto the grid")
                .arg(
                    Arg::with_name("PARAMETER_CONFIG")
                        .help("Grid, kernel and model parameters")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("SCENE_CONFIG")
                        .help("Lagrangian points and element tables")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::with_name("TIME")
                        .long("time")
                        .short("t")
                        .takes_value(true)
                        .default_value("0")
                        .help("Simulation time passed to the muscle activation"),
                )
                .arg(
                    Arg::with_name("OVERWRITE_CONFIG_FILE")
                        .long("overwrite-config-file")
                        .short("c")
                        .required(false)
                        .takes_value(true)
                        .help("Overwrite single parameters"),
                ),
        )
        .subcommand(
            SubCommand::with_name("check-kernel")
                .about("Print the delta weight sums of the configured kernel for sub-cell offsets")
                .arg(
                    Arg::with_name("PARAMETER_CONFIG")
                        .help("Grid, kernel and model parameters")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("SAMPLES")
                        .long("samples")
                        .short("n")
                        .takes_value(true)
                        .default_value("8"),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    let result = if let Some(spread_matches) = matches.subcommand_matches("spread") {
        run_spread(spread_matches)
    } else if let Some(kernel_matches) = matches.subcommand_matches("check-kernel") {
        run_check_kernel(kernel_matches)
    } else {
        Ok(())
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn parse_value<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> IbResult<T> {
    let s = matches.value_of(name).unwrap_or_default();
    s.parse::<T>()
        .map_err(|_| IbError::InvalidParameter(format!("cannot parse {} from '{}'", name, s)))
}

fn load_params(matches: &ArgMatches) -> IbResult<ForceModelParams> {
    let parameter_file = matches.value_of("PARAMETER_CONFIG").unwrap_or_default();
    let overrides = matches.value_of("OVERWRITE_CONFIG_FILE").map(Path::new);
    let params = ForceModelParams::from_file(parameter_file, overrides)?;
    log::info!("{:?}", params);
    Ok(params)
}

fn run_spread(matches: &ArgMatches) -> IbResult<()> {
    let params = load_params(matches)?;
    let time: FT = parse_value(matches, "TIME")?;

    let scene = SceneConfig::from_file(matches.value_of("SCENE_CONFIG").unwrap_or_default())?;
    let points = scene.lagrangian_points()?;
    let forces = params.build(scene.structure()?)?;
    log::info!(
        "{} points on a {}x{} grid, enabled elements: {:?}",
        points.len(),
        params.nx,
        params.ny,
        params.flags.enabled_kinds()
    );

    let output = forces.compute(&points, params.clock(time), &params.muscle_activation())?;

    let lagrangian = output.lagrangian.total() * forces.grid().ds();
    let eulerian = output.eulerian.integral();
    let scale = lagrangian.norm().max(FT::EPSILON);

    println!("lagrangian force * ds: ({:+.9e}, {:+.9e})", lagrangian.x, lagrangian.y);
    println!("eulerian integral:     ({:+.9e}, {:+.9e})", eulerian.x, eulerian.y);
    println!("relative conservation error: {:.3e}", (eulerian - lagrangian).norm() / scale);
    println!("max |f| on grid: {:.6e}", output.eulerian.max_magnitude());
    for mf in &output.mass_forces {
        println!(
            "mass point {}: ({:+.6e}, {:+.6e})",
            mf.point.one_based(),
            mf.force.x,
            mf.force.y
        );
    }

    Ok(())
}

fn run_check_kernel(matches: &ArgMatches) -> IbResult<()> {
    let params = load_params(matches)?;
    let samples: usize = parse_value(matches, "SAMPLES")?;
    let kernel = params.delta_kernel()?;
    let grid = params.grid(0)?;
    let h = grid.dx();

    for s in 0..samples {
        let x = (s as FT + 0.5) / samples as FT * h + 0.5 * grid.lx();
        let window = one_dimensional_window(x, grid.nx(), h, kernel.support(), grid.boundary(Axis::X))
            .ok_or(IbError::OutOfDomain {
                point: s + 1,
                axis: Axis::X,
                coordinate: x,
            })?;
        let sum: FT = window.offsets.iter().map(|&r| kernel.delta(r, h)).sum();
        println!("offset {:.4}: sum * h = {:.15}", x / h - (x / h).floor(), sum * h);
    }

    Ok(())
}
