//! Synthetic half-hourly forcing
//!
//! PAR follows a sine curve from 6am to 6pm scaled by a daily cloudiness draw;
//! air temperature follows a diurnal cycle between the daily minimum and
//! maximum; vapour pressure is held at saturation at the minimum temperature
//! (dew point ≈ Tmin) so VPD peaks in the afternoon.

use canopy_core::physics::saturation_vapour_pressure;
use canopy_core::{Celsius, Kilopascals, MetForcing, MeteorologicalSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Smallest VPD handed to the canopy (kPa)
const MIN_VPD: f64 = 0.05;

#[derive(Debug, Clone, Copy)]
pub struct WeatherConfig {
    /// First day of year
    pub doy: u16,
    pub days: usize,
    /// Daily maximum air temperature (°C)
    pub tmax: f64,
    /// Daily minimum air temperature (°C)
    pub tmin: f64,
    /// Clear-sky noon PAR (µmol m⁻² s⁻¹)
    pub par_max: f64,
    /// Atmospheric CO2 (µmol mol⁻¹)
    pub co2: f64,
    pub seed: u64,
}

/// Build `days × 48` half-hourly samples
pub fn synthetic_forcing(config: &WeatherConfig) -> MetForcing {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut samples = Vec::with_capacity(config.days * 48);

    let ea = saturation_vapour_pressure(Celsius::new(config.tmin)).value();

    for day in 0..config.days {
        let doy = day_of_year(config.doy, day);
        let cloudiness: f64 = rng.random_range(0.55..1.0);
        let wind_base: f64 = rng.random_range(1.0..4.0);

        for slot in 0..48 {
            let hour = (slot as f64 + 0.5) * 0.5;

            let par = if (6.0..=18.0).contains(&hour) {
                let hour_factor = ((hour - 6.0) * PI / 12.0).sin();
                let flicker: f64 = rng.random_range(0.9..1.0);
                config.par_max * hour_factor * cloudiness * flicker
            } else {
                0.0
            };

            let tair = diurnal_temperature(config.tmin, config.tmax, hour);

            let es = saturation_vapour_pressure(Celsius::new(tair)).value();
            let vpd = ((es - ea) / 1000.0).max(MIN_VPD);
            let wind = wind_base * rng.random_range(0.7..1.3);

            samples.push(
                MeteorologicalSample::new(doy, par, Celsius::new(tair), Kilopascals::new(vpd), wind)
                    .with_co2(config.co2),
            );
        }
    }

    MetForcing::new(samples)
}

/// Day of year `offset` days after `start`, wrapping after 365
fn day_of_year(start: u16, offset: usize) -> u16 {
    let zero_based = (usize::from(start.max(1)) - 1 + offset) % 365;
    zero_based as u16 + 1
}

/// Cosine rise from the minimum at 5am to the maximum at 3pm, cosine fall
/// back over the following 14 hours
fn diurnal_temperature(tmin: f64, tmax: f64, hour: f64) -> f64 {
    let range = (tmax - tmin).max(0.0);
    if (5.0..15.0).contains(&hour) {
        tmin + range * (1.0 - (PI * (hour - 5.0) / 10.0).cos()) / 2.0
    } else {
        let since_peak = (hour - 15.0).rem_euclid(24.0);
        tmax.max(tmin) - range * (1.0 - (PI * since_peak / 14.0).cos()) / 2.0
    }
}
