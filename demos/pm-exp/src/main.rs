use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use pmd::d2::{perona_malik, Exponential};

fn usage() -> ! {
    eprintln!("usage: pm-exp <iterations> <K> <input> <output_dir> [--quiet]");
    exit(1);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut positional = Vec::new();
    let mut quiet = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--quiet" => quiet = true,
            _ => positional.push(arg),
        }
    }

    if positional.len() != 4 {
        usage();
    }

    let iterations: i64 = positional[0].parse().unwrap_or_else(|_| usage());
    let k: f64 = positional[1].parse().unwrap_or_else(|_| usage());

    if iterations <= 0 {
        eprintln!("iteration count must be greater than 0");
        exit(1);
    }

    let field = image_util::load_grayscale(&positional[2])?;

    if !quiet {
        let (m, n) = field.dim();
        eprintln!("{}x{} grayscale image", m, n);
    }

    let start = Instant::now();
    let result = perona_malik(&field, iterations as usize, k, &Exponential)?;

    if !quiet {
        eprintln!("solver took {:.6}s", start.elapsed().as_secs_f64());
    }

    let out_path =
        PathBuf::from(&positional[3]).join(format!("perona_malik_exp_K{}_it{}.png", k, iterations));
    image_util::save_grayscale(&out_path, &result)?;

    if !quiet {
        eprintln!("saved {}", out_path.display());
    }

    Ok(())
}
