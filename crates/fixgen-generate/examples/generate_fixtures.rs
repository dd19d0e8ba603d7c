use std::env;
use std::path::PathBuf;

use fixgen_core::load_schema_config;
use fixgen_generate::{FixtureEngine, GenerateOptions};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut options = GenerateOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                options.out_dir = args.next().map(PathBuf::from).ok_or("missing --out value")?
            }
            "--seed" => options.seed = args.next().ok_or("missing --seed value")?.parse()?,
            "--rows" => options.rows = args.next().ok_or("missing --rows value")?.parse()?,
            _ => {
                if config_path.is_none() {
                    config_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let config_path = config_path.ok_or("missing config path")?;
    let loaded = load_schema_config(&config_path)?;
    let result = FixtureEngine::new(options).run(&loaded)?;

    for class in &result.report.classes {
        println!("{} files={}", class.class, class.files.len());
    }
    println!("out_dir={}", result.out_dir.display());
    Ok(())
}
