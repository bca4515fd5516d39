//! Equatorial to galactic coordinate conversion.
//!
//! The selector only needs galactic latitude, but the transform returns the
//! full (l, b) pair so it can be swapped for any other implementation.

use nalgebra::{Matrix3, Vector3};

/// Maps equatorial (ra, dec) to galactic (l, b), all in degrees.
pub trait CoordinateTransform {
    fn to_galactic(&self, ra_deg: f64, dec_deg: f64) -> (f64, f64);
}

impl<F> CoordinateTransform for F
where
    F: Fn(f64, f64) -> (f64, f64),
{
    fn to_galactic(&self, ra_deg: f64, dec_deg: f64) -> (f64, f64) {
        self(ra_deg, dec_deg)
    }
}

/// FK5 (J2000) equatorial → galactic rotation.
///
/// Uses the Hipparcos definition of the galactic pole and origin, which
/// matches FK5 J2000 to well below a milliarcsecond.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fk5Galactic;

impl Fk5Galactic {
    fn rotation() -> Matrix3<f64> {
        Matrix3::new(
            -0.054_875_560_416_215_4,
            -0.873_437_090_234_885_0,
            -0.483_835_015_548_713_2,
            0.494_109_427_875_583_7,
            -0.444_829_629_960_011_2,
            0.746_982_244_497_218_9,
            -0.867_666_149_019_004_7,
            -0.198_076_373_431_201_5,
            0.455_983_776_175_066_9,
        )
    }
}

impl CoordinateTransform for Fk5Galactic {
    fn to_galactic(&self, ra_deg: f64, dec_deg: f64) -> (f64, f64) {
        let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
        let equatorial = Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin());
        let g = Self::rotation() * equatorial;

        let l = g.y.atan2(g.x).to_degrees().rem_euclid(360.0);
        let b = g.z.clamp(-1.0, 1.0).asin().to_degrees();
        (l, b)
    }
}
