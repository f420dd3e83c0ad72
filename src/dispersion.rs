//! Acoustic-gravity wave dispersion in an isothermal atmosphere.
//!
//! Used to mark the border between the infrasonic and gravity-wave regimes
//! on every spectrum. Wavenumber `k` and angular frequency `omega` are in
//! the normalised units `k / gamma` and `omega / omega_c`.

use serde::{Deserialize, Serialize};

/// Bulk parameters of the atmosphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    /// Speed of sound (m/s)
    pub sound_speed: f64,
    /// Surface gravity (m/s^2)
    pub gravity: f64,
    /// Density scale height (m)
    pub scale_height: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            sound_speed: 240.0,
            gravity: 3.72,
            scale_height: 10.8e3,
        }
    }
}

impl Atmosphere {
    /// `1 / (2H)`
    pub fn gamma(&self) -> f64 {
        1.0 / (2.0 * self.scale_height)
    }

    /// Acoustic cutoff `gamma * C`.
    pub fn cutoff(&self) -> f64 {
        self.gamma() * self.sound_speed
    }

    /// Border frequency between the two regimes, reported next to spectra.
    pub fn border_frequency(&self) -> f64 {
        self.sound_speed * self.gamma()
    }

    fn buoyancy_term(&self) -> f64 {
        2.0 * self.gamma() * self.gravity - (self.gravity / self.sound_speed).powi(2)
    }

    /// Normalised buoyancy asymptote `sqrt(2 gamma g - (g/C)^2) / omega_c`.
    pub fn buoyancy_asymptote(&self) -> f64 {
        self.buoyancy_term().sqrt() / self.cutoff()
    }

    /// Full dispersion relation `n^2(k, omega)`.
    pub fn general(&self, k: f64, omega: f64) -> f64 {
        let gamma = self.gamma();
        (omega.powi(2) - k.powi(2) - 1.0) * gamma.powi(2)
            + self.buoyancy_term() * (k / (self.sound_speed * omega)).powi(2)
    }

    /// Gravity-wave branch.
    pub fn gravity_wave(&self, k: f64, omega: f64) -> f64 {
        let gamma = self.gamma();
        -(gamma * k).powi(2) - gamma.powi(2) + (gamma * omega).powi(2)
    }

    /// Infrasound branch.
    pub fn infrasound(&self, k: f64, omega: f64) -> f64 {
        let gamma = self.gamma();
        -(gamma * k).powi(2) - gamma.powi(2) + self.buoyancy_term() * ((gamma * k) / (self.cutoff() * omega)).powi(2)
    }

    /// Whether a wave with this `(k, omega)` propagates (`n^2 > 0`).
    pub fn propagates(&self, k: f64, omega: f64) -> bool {
        self.general(k, omega) > 0.0
    }
}
