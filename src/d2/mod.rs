use ndarray::{Array, Array2};
use thiserror::Error;

pub mod conductivity;

pub use conductivity::{Conductivity, Exponential, Fractional};

/// A 2D grid of grayscale samples, indexed `[[row, col]]` from the top-left.
pub type Field = Array2<f64>;

/// Errors detected before a solver loop starts. No partial output is
/// produced once one of these is returned.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("time step r={r} exceeds the explicit stability bound 1/4")]
    UnstableTimeStep { r: f64 },
}

/// Discretization coefficients derived once per run from the field shape.
///
/// The field spans the unit square, so sample spacing and the largest stable
/// explicit time step follow from the dimensions alone.
#[derive(Debug, Clone, Copy)]
pub struct GridCoeffs {
    pub deltax: f64,
    pub deltay: f64,
    pub deltamin: f64,
    pub deltat: f64,
    pub sx: f64,
    pub sy: f64,
}

impl GridCoeffs {
    pub fn new((m, n): (usize, usize)) -> Self {
        assert!(m >= 2);
        assert!(n >= 2);

        let deltax = 1.0 / (m - 1) as f64;
        let deltay = 1.0 / (n - 1) as f64;
        let deltamin = deltax.min(deltay);
        let deltat = deltamin * deltamin / 4.0;

        GridCoeffs {
            deltax,
            deltay,
            deltamin,
            deltat,
            sx: deltat / (deltax * deltax),
            sy: deltat / (deltay * deltay),
        }
    }
}

fn kernel(r: f64) -> [[f64; 3]; 3] {
    [[0.0, r, 0.0], [r, 1.0 - 4.0 * r, r], [0.0, r, 0.0]]
}

fn heat_step(field: &Field, kernel: &[[f64; 3]; 3]) -> Field {
    let (m, n) = field.dim();

    Array::from_shape_fn((m, n), |(y, x)| {
        let mut acc = 0.0;
        for (dy, row) in kernel.iter().enumerate() {
            for (dx, &w) in row.iter().enumerate() {
                // reflective border: an out-of-bounds neighbour mirrors back
                // onto the edge sample
                let yy = (y + dy).saturating_sub(1).min(m - 1);
                let xx = (x + dx).saturating_sub(1).min(n - 1);

                acc += w * field[[yy, xx]];
            }
        }
        acc
    })
}

/// Diffuse `field` under the linear heat equation for `t` time units, with
/// time-step fraction `r`, and return the smoothed field.
pub fn heat(field: &Field, r: f64, t: f64) -> Result<Field, SolveError> {
    heat_observed(field, r, t, |_, _| {})
}

/// Same as [`heat`], invoking `observer` with each elapsed whole time unit
/// (1, 2, ...) and the field state at that moment.
///
/// The observer is for visualization only; it does not alter the result.
pub fn heat_observed<F>(field: &Field, r: f64, t: f64, mut observer: F) -> Result<Field, SolveError>
where
    F: FnMut(usize, &Field),
{
    if t <= 0.0 {
        return Err(SolveError::InvalidParameter(format!(
            "diffusion time must be positive, got {}",
            t
        )));
    }
    if r < 0.0 {
        return Err(SolveError::InvalidParameter(format!(
            "time step must be non-negative, got {}",
            r
        )));
    }
    if r > 0.25 {
        return Err(SolveError::UnstableTimeStep { r });
    }
    if r == 0.0 {
        // identity kernel, zero steps
        return Ok(field.clone());
    }

    let steps = (t / r).ceil() as usize;
    log::debug!(
        "heat: {:?} field, r={}, t={}, {} steps",
        field.dim(),
        r,
        t,
        steps
    );

    let kernel = kernel(r);
    let mut out = field.clone();
    let mut elapsed = 1;

    for k in 1..=steps {
        out = heat_step(&out, &kernel);

        while k as f64 * r >= elapsed as f64 {
            observer(elapsed, &out);
            elapsed += 1;
        }
    }

    Ok(out)
}

fn perona_malik_step<C>(field: &Field, c: &GridCoeffs, lambda2: f64, g: &C) -> Field
where
    C: Conductivity,
{
    let (m, n) = field.dim();

    Array::from_shape_fn((m, n), |(y, x)| {
        let here = field[[y, x]];

        // forward (south/east) and backward (north/west) differences; a
        // missing neighbour contributes no flux
        let ds = if y + 1 < m { field[[y + 1, x]] - here } else { 0.0 };
        let de = if x + 1 < n { field[[y, x + 1]] - here } else { 0.0 };
        let dn = if y > 0 { field[[y - 1, x]] - here } else { 0.0 };
        let dw = if x > 0 { field[[y, x - 1]] - here } else { 0.0 };

        let g1 = g.conductivity(((de / c.deltax).powi(2) + (ds / c.deltay).powi(2)) / lambda2);
        let g2 = g.conductivity(((dw / c.deltax).powi(2) + (dn / c.deltay).powi(2)) / lambda2);

        here + c.sy * (ds * g1 + dn * g2) + c.sx * (de * g1 + dw * g2)
    })
}

/// Smooth `field` with Perona-Malik anisotropic diffusion for `iterations`
/// steps under the conductivity law `g`.
///
/// `k` is the edge-sensitivity threshold: gradients well above it conduct
/// almost nothing and survive, gradients well below it diffuse as under the
/// heat equation. As `k` grows the scheme approaches isotropic diffusion
/// with `r = 1/4`.
pub fn perona_malik<C>(
    field: &Field,
    iterations: usize,
    k: f64,
    g: &C,
) -> Result<Field, SolveError>
where
    C: Conductivity,
{
    if k <= 0.0 {
        return Err(SolveError::InvalidParameter(format!(
            "edge threshold K must be positive, got {}",
            k
        )));
    }

    let (m, n) = field.dim();
    if m < 2 || n < 2 {
        // no neighbour pairs, nothing to diffuse
        return Ok(field.clone());
    }

    let c = GridCoeffs::new((m, n));
    let lambda = k / c.deltamin;
    log::debug!(
        "perona_malik: {:?} field, K={}, {} iterations, dt={}",
        field.dim(),
        k,
        iterations,
        c.deltat
    );

    let mut out = field.clone();
    for _ in 0..iterations {
        out = perona_malik_step(&out, &c, lambda * lambda, g);
    }

    Ok(out)
}
