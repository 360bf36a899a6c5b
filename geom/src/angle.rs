use std::{f64, fmt};

use serde::{Deserialize, Serialize};

/// An angle, stored in radians.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn radians(rads: f64) -> Angle {
        if !rads.is_finite() {
            panic!("Bad Angle {}", rads);
        }
        Angle(rads)
    }

    pub fn degrees(degs: f64) -> Angle {
        Angle::radians(degs.to_radians())
    }

    pub fn normalized_radians(self) -> f64 {
        if self.0 < 0.0 {
            self.0 + (2.0 * f64::consts::PI)
        } else {
            self.0
        }
    }

    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }

    /// Unlike `normalized_radians`, keeps the sign. Bank angles are small and signed.
    pub fn inner_radians(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signs() {
        let bank = Angle::degrees(-90.0);
        assert!((bank.inner_radians() + f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((bank.normalized_degrees() - 270.0).abs() < 1e-9);
        assert_eq!(Angle::ZERO.to_string(), "Angle(0 degrees)");
    }
}
