//! Leaf-scale physics: conductances, psychrometrics, energy balance, nitrogen

pub mod conductance;
pub mod constants;
pub mod energy_balance;
pub mod nitrogen;
pub mod psychrometrics;

pub use conductance::{
    forced_convection_conductance, free_convection_conductance, radiation_conductance,
    LeafConductances,
};
pub use energy_balance::{
    isothermal_net_radiation, solve_leaf_energy_balance, LeafEnergyBalance, LeafProperties,
};
pub use nitrogen::{canopy_nitrogen_content, leaf_nitrogen, top_of_canopy_nitrogen};
pub use psychrometrics::{penman_leaf, saturation_vapour_pressure, LeafEvaporation};
