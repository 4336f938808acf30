//! Pure kinematic formulas for two-body decays.
//!
//! Angular momenta are given in units of ħ/2, so `L = 2` is a p-wave.

use num_complex::Complex64;
use tracing::{debug, warn};

/// Momentum scale in GeV/c of the barrier factors, equivalent to a 1 fm
/// interaction radius.
pub const DEFAULT_MOMENTUM_SCALE: f64 = 0.1973;

/// Squared breakup momentum of `M -> m1 m2`; 0 below threshold.
pub fn breakup_momentum_squared(mass: f64, m1: f64, m2: f64) -> f64 {
    if mass < m1 + m2 {
        return 0.0;
    }
    (mass - m1 - m2) * (mass + m1 + m2) * (mass - m1 + m2) * (mass + m1 - m2) / (4.0 * mass * mass)
}

/// Breakup momentum of `M -> m1 m2`; 0 below threshold.
pub fn breakup_momentum(mass: f64, m1: f64, m2: f64) -> f64 {
    if mass < m1 + m2 {
        return 0.0;
    }
    breakup_momentum_squared(mass, m1, m2).sqrt()
}

/// Border of the Dalitz plot for `M -> m0 m1 m2` (PDG eq. 38.22).
///
/// `mass_2` is the squared (m0 m1) mass on the x-axis; the result is the
/// minimum (`min = true`) or maximum squared (m1 m2) mass. Points outside the
/// physical region give 0.
pub fn dalitz_kinematic_border(mass_2: f64, mass: f64, daughters: [f64; 3], min: bool) -> f64 {
    if mass_2 < 0.0 {
        return 0.0;
    }
    let m01 = mass_2.sqrt();
    let m_2 = daughters.map(|m| m * m);
    // energies of particles 1 and 2 in the (m0 m1) rest frame
    let e1 = (mass_2 - m_2[0] + m_2[1]) / (2.0 * m01);
    let e2 = (mass * mass - mass_2 - m_2[2]) / (2.0 * m01);
    if e1 * e1 < m_2[1] || e2 * e2 < m_2[2] {
        return 0.0;
    }
    let p1 = (e1 * e1 - m_2[1]).sqrt();
    let p2 = (e2 * e2 - m_2[2]).sqrt();
    let e_sum_2 = (e1 + e2) * (e1 + e2);
    if min {
        e_sum_2 - (p1 + p2) * (p1 + p2)
    } else {
        e_sum_2 - (p1 - p2) * (p1 - p2)
    }
}

/// Normalisation `sqrt(2l + 1)` of an amplitude with angular momentum `L = 2l`.
pub fn ang_mom_norm_factor(l: i32) -> f64 {
    let norm = f64::from(l + 1).sqrt();
    debug!(l, norm, "angular momentum normalization factor");
    norm
}

/// Prefactor `ε P (-1)^((J - M) / 2)` of the reflectivity-basis
/// symmetrisation; 0 for invalid quantum numbers.
pub fn reflectivity_factor(j: i32, parity: i32, m: i32, refl: i32) -> i32 {
    if parity.abs() != 1 {
        warn!(parity, "parity must be +-1, returning 0");
        return 0;
    }
    if m < 0 {
        warn!(m, "spin projection must not be negative in the reflectivity basis, returning 0");
        return 0;
    }
    if refl.abs() != 1 {
        warn!(refl, "reflectivity must be +-1, returning 0");
        return 0;
    }
    let sign = if ((j - m) / 2).rem_euclid(2) == 0 { 1 } else { -1 };
    refl * parity * sign
}

/// Squared Blatt-Weisskopf barrier factor for angular momentum `L` (ħ/2
/// units, even values up to 14) at breakup momentum `q`.
pub fn barrier_factor_squared(l: i32, q: f64, momentum_scale: f64) -> f64 {
    let z = (q * q) / (momentum_scale * momentum_scale);
    match l {
        0 => 1.0,
        2 => (2.0 * z) / (z + 1.0),
        4 => (13.0 * z * z) / (z * (z + 3.0) + 9.0),
        6 => (277.0 * z * z * z) / (z * (z * (z + 6.0) + 45.0) + 225.0),
        8 => {
            let z2 = z * z;
            (12746.0 * z2 * z2) / (z * (z * (z * (z + 10.0) + 135.0) + 1575.0) + 11025.0)
        }
        10 => {
            let z2 = z * z;
            (998881.0 * z2 * z2 * z)
                / (z * (z * (z * (z * (z + 15.0) + 315.0) + 6300.0) + 99225.0) + 893025.0)
        }
        12 => {
            let z3 = z * z * z;
            (118394977.0 * z3 * z3)
                / (z * (z * (z * (z * (z * (z + 21.0) + 630.0) + 18900.0) + 496125.0) + 9823275.0)
                    + 108056025.0)
        }
        14 => {
            let z3 = z * z * z;
            (19727003738.0 * z3 * z3 * z)
                / (z * (z * (z * (z * (z * (z * (z + 28.0) + 1134.0) + 47250.0) + 1819125.0)
                    + 58939650.0)
                    + 1404728325.0)
                    + 18261468225.0)
        }
        _ => {
            debug!(l, "barrier factor is not implemented for this angular momentum, returning 0");
            0.0
        }
    }
}

/// Blatt-Weisskopf barrier factor, the square root of
/// [`barrier_factor_squared`].
pub fn barrier_factor(l: i32, q: f64, momentum_scale: f64) -> f64 {
    barrier_factor_squared(l, q, momentum_scale).sqrt()
}

/// Relativistic Breit-Wigner with mass-dependent width
/// `Γ(m) = Γ0 (m0 / m) (q / q0) F²(q) / F²(q0)`.
pub fn breit_wigner(m: f64, m0: f64, gamma0: f64, l: i32, q: f64, q0: f64) -> Complex64 {
    let gamma = gamma0
        * (m0 / m)
        * (q / q0)
        * (barrier_factor_squared(l, q, DEFAULT_MOMENTUM_SCALE)
            / barrier_factor_squared(l, q0, DEFAULT_MOMENTUM_SCALE));
    Complex64::new(m0 * gamma0, 0.0) / Complex64::new(m0 * m0 - m * m, -m0 * gamma)
}
