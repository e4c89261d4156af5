//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads points and runs the fit
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, SampleArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::{FitOptions, Point, SlopeConstraint, SlopeConstraints};
use crate::error::FitError;

pub mod pipeline;

/// Entry point for the `regress` binary.
pub fn run() -> Result<(), FitError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), FitError> {
    let options = fit_options_from_args(&args);
    let ingest = crate::io::load_points(&args.input)?;
    for e in &ingest.row_errors {
        log::warn!("{}:{}: {}", args.input.display(), e.line, e.message);
    }
    log::info!(
        "loaded {} points from {}",
        ingest.points.len(),
        args.input.display()
    );

    let trace = args.trace;
    let run = pipeline::run_fit(&ingest, &options, &mut |fit, epoch| {
        if trace {
            println!("epoch {epoch:>4}  mse {:.6e}", fit.error);
        }
    })?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &ingest,
            &run.fit,
            options.exact,
            &options.point_constraints,
            options.slopes(),
            &run.residuals,
        )
    );

    if args.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            &run.fit,
            args.width,
            args.height,
            &options.point_constraints,
        );
        println!("{plot}");
    }

    if let Some(path) = &args.export_curve {
        let curve = crate::io::curve_file(
            &run.fit,
            run.summary.clone(),
            &ingest.stats,
            &options.point_constraints,
            options.slopes(),
        );
        crate::io::write_curve_json(path, &curve)?;
        log::info!("wrote curve to {}", path.display());
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), FitError> {
    let config = SampleConfig {
        coefficients: args.coefficients,
        count: args.count,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise,
        seed: args.seed,
    };
    let points = generate_sample(&config)?;
    crate::io::write_points(&args.output, &points)?;
    log::info!("wrote {} samples to {}", points.len(), args.output.display());
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), FitError> {
    let curve = crate::io::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn fit_options_from_args(args: &FitArgs) -> FitOptions {
    let slopes: Vec<SlopeConstraint> = args.slopes.iter().map(|&p| p.into()).collect();
    FitOptions {
        degree: args.deg,
        components: None,
        exact: !args.approximate,
        point_constraints: args.points.iter().map(|&p| Point::from(p)).collect(),
        slope_constraints: (!slopes.is_empty()).then_some(SlopeConstraints {
            components: None,
            slopes,
        }),
        epochs: args.epochs,
        init_epochs: args.init_epochs,
        learning_rate: args.learning_rate,
        seed: args.seed,
    }
}
