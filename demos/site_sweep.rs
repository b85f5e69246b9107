use harmonic_af::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> harmonic_af::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Site aggregate impedance at the 14th harmonic; 0.75 % is half the 1.5 % planning level.
    let site = Impedance::new(100.0, 30.0);
    let mut config = AnalysisConfig::new("Puffer Fish", 14, site, 0.75)
        .with_sweep(SweepSpec::new((0.0, 1000.0), (-1000.0, 1000.0), 1.0))
        .with_sensitivity(site, SnapPolicy::Nearest);

    // Optional polygon table: site_sweep <polygons.csv> [impedance base]
    let mut args = std::env::args().skip(1);
    if let Some(path) = args.next() {
        let mut study = PolygonStudy::new(path);
        if let Some(base) = args.next() {
            let base = base
                .parse::<Scalar>()
                .map_err(|e| HarmonicsError::Configuration(format!("impedance base: {e}")))?;
            study.table = study.table.with_impedance_base(base);
        }
        config = config.with_polygon(study);
    }

    let mut renderer = CsvRenderer::new(".");
    let report = HarmonicAnalysis::new(config).run(Some(&mut renderer))?;

    if let Some(peak) = report.peak {
        println!("peak AF {:.4} at {}", peak.value, peak.network);
    }
    if let Some(env) = report.envelope {
        println!(
            "polygon h={}: max AF {:.4}, {}th percentile {:.4} over {} points",
            env.harmonic,
            env.max_af,
            env.quantile,
            env.quantile_af,
            env.corner_points + env.boundary_points + env.interior_points
        );
    }
    for path in renderer.written() {
        println!("wrote {}", path.display());
    }
    Ok(())
}
