//! Half-hourly meteorological forcing

use crate::core_types::units::{Celsius, Kilopascals};
use crate::error::{CanopyError, CanopyResult};
use serde::{Deserialize, Serialize};

/// One half-hour of meteorological forcing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeteorologicalSample {
    /// Incident photosynthetically active radiation (µmol m⁻² s⁻¹)
    pub par: f64,
    /// Air temperature
    pub tair: Celsius,
    /// Vapour pressure deficit of the air
    pub vpd: Kilopascals,
    /// Atmospheric pressure
    pub press: Kilopascals,
    /// Wind speed (m s⁻¹)
    pub wind: f64,
    /// Atmospheric CO2 concentration (µmol mol⁻¹)
    pub co2: f64,
    /// Day of year (1-366)
    pub doy: u16,
}

impl MeteorologicalSample {
    /// Sample with sea-level pressure and ambient CO2, for building forcing by hand
    pub fn new(doy: u16, par: f64, tair: Celsius, vpd: Kilopascals, wind: f64) -> Self {
        Self {
            par,
            tair,
            vpd,
            press: Kilopascals::new(101.325),
            wind,
            co2: 400.0,
            doy,
        }
    }

    /// Override the CO2 concentration
    pub fn with_co2(mut self, co2: f64) -> Self {
        self.co2 = co2;
        self
    }

    /// Override the atmospheric pressure
    pub fn with_pressure(mut self, press: Kilopascals) -> Self {
        self.press = press;
        self
    }
}

/// Ordered sequence of half-hourly samples, indexed by the run cursor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetForcing {
    samples: Vec<MeteorologicalSample>,
}

impl MetForcing {
    pub fn new(samples: Vec<MeteorologicalSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample under the cursor
    ///
    /// # Errors
    /// [`CanopyError::ForcingExhausted`] when the cursor is past the last sample.
    pub fn sample(&self, cursor: usize) -> CanopyResult<&MeteorologicalSample> {
        self.samples
            .get(cursor)
            .ok_or(CanopyError::ForcingExhausted {
                cursor,
                len: self.samples.len(),
            })
    }

    pub fn samples(&self) -> &[MeteorologicalSample] {
        &self.samples
    }
}

impl FromIterator<MeteorologicalSample> for MetForcing {
    fn from_iter<I: IntoIterator<Item = MeteorologicalSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(par: f64) -> MeteorologicalSample {
        MeteorologicalSample::new(180, par, Celsius::new(20.0), Kilopascals::new(1.0), 2.0)
    }

    #[test]
    fn test_sample_lookup() {
        let forcing: MetForcing = [sample(0.0), sample(800.0)].into_iter().collect();
        assert_eq!(forcing.len(), 2);
        assert_eq!(forcing.sample(1).map(|s| s.par).ok(), Some(800.0));
    }

    #[test]
    fn test_sample_past_end_is_error() {
        let forcing = MetForcing::new(vec![sample(0.0)]);
        match forcing.sample(1) {
            Err(CanopyError::ForcingExhausted { cursor, len }) => {
                assert_eq!(cursor, 1);
                assert_eq!(len, 1);
            }
            other => panic!("expected ForcingExhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_overrides() {
        let s = sample(100.0)
            .with_co2(550.0)
            .with_pressure(Kilopascals::new(90.0));
        assert_eq!(s.co2, 550.0);
        assert_eq!(*s.press, 90.0);
    }
}
