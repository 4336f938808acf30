#![deny(missing_docs)]
#![doc = "Two-body kinematics, Blatt-Weisskopf barrier factors, Breit-Wigner lineshapes and an \
in-memory particle-properties table for partial-wave amplitude models."]

mod kinematics;
mod particle;

pub use kinematics::{
    ang_mom_norm_factor, barrier_factor, barrier_factor_squared, breakup_momentum,
    breakup_momentum_squared, breit_wigner, dalitz_kinematic_border, reflectivity_factor,
    DEFAULT_MOMENTUM_SCALE,
};
pub use particle::{charge_from_name, ParticleDataTable, ParticleProperties};
