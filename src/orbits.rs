// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape trajectories of the Mandelbrot recurrence.
//!
//! A Buddhabrot only cares about points that *leave*.  Starting from
//! zero, we iterate `z = z * z + c` and remember every `z` we pass
//! through.  If `z` is still inside the bailout circle when the
//! budget runs out, the point is assumed to be in the black heart and
//! its orbit contributes nothing.

use num::Complex;

/// The bailout, compared directly against the *squared* magnitude of
/// `z`.  This is looser than the textbook `|z| > 2` test (which would
/// be `4.0` here) and is kept so images match the reference renders.
/// `trace` accepts any threshold for callers who want the canonical one.
pub const ESCAPE_THRESHOLD: f64 = 2.0;

/// Orbit buffers grow past this on demand.
pub(crate) const ORBIT_RESERVE: usize = 1 << 12;

/// Returns the escape trajectory of `c`, including the escaping point,
/// or an empty vector if `c` did not escape within `max_iterations`.
pub fn trajectory(c: Complex<f64>, max_iterations: usize) -> Vec<Complex<f64>> {
    let mut orbit = Vec::with_capacity(max_iterations.min(ORBIT_RESERVE));
    trace(c, max_iterations, ESCAPE_THRESHOLD, &mut orbit);
    orbit
}

/// The workhorse behind `trajectory`.  Clears `orbit`, iterates `c`,
/// and leaves the trajectory in `orbit` if the point escaped.  Returns
/// whether it escaped; on `false`, `orbit` is empty.
///
/// Note that a point which crosses the threshold on its very last
/// permitted iteration is still treated as bounded.
pub fn trace(
    c: Complex<f64>,
    max_iterations: usize,
    threshold: f64,
    orbit: &mut Vec<Complex<f64>>,
) -> bool {
    orbit.clear();
    let mut z = Complex::new(0.0_f64, 0.0_f64);
    let mut n = 0;
    while n < max_iterations && z.norm_sqr() <= threshold {
        z = z * z + c;
        n += 1;
        orbit.push(z);
    }

    if n == max_iterations {
        orbit.clear();
        return false;
    }
    true
}
