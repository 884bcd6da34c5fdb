use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use pmd::d2::{heat, heat_observed};

fn usage() -> ! {
    eprintln!("usage: heat <r> <t> <input> <output_dir> [--steps] [--quiet]");
    exit(1);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut positional = Vec::new();
    let mut steps = false;
    let mut quiet = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--steps" => steps = true,
            "--quiet" => quiet = true,
            _ => positional.push(arg),
        }
    }

    if positional.len() != 4 {
        usage();
    }

    let r: f64 = positional[0].parse().unwrap_or_else(|_| usage());
    let t: f64 = positional[1].parse().unwrap_or_else(|_| usage());

    if t <= 0.0 {
        eprintln!("diffusion time must be greater than 0");
        exit(1);
    }

    let field = image_util::load_grayscale(&positional[2])?;
    let out_dir = PathBuf::from(&positional[3]);

    if !quiet {
        let (m, n) = field.dim();
        eprintln!("{}x{} grayscale image", m, n);
    }

    let start = Instant::now();
    let result = if steps {
        heat_observed(&field, r, t, |unit, state| {
            image_util::save_frame(&out_dir, "heat", unit, state).unwrap();
            if !quiet {
                eprint!("\r T={} / {}", unit, t);
            }
        })?
    } else {
        heat(&field, r, t)?
    };

    if !quiet {
        eprintln!("\nsolver took {:.6}s", start.elapsed().as_secs_f64());
    }

    let out_path = out_dir.join(format!("heat_r{}_t{}.png", r, t));
    image_util::save_grayscale(&out_path, &result)?;

    if !quiet {
        eprintln!("saved {}", out_path.display());
    }

    Ok(())
}
