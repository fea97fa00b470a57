use super::{Bodies, Body};

/// Source of initial conditions.
pub trait BodyCreator {
    fn create_body(&mut self) -> Body;

    fn create_bodies(&mut self, n: usize) -> Bodies {
        (0..n).map(|_| self.create_body()).collect()
    }
}

#[cfg(feature = "randomization")]
pub use random::*;

#[cfg(feature = "randomization")]
mod random {
    use std::f64::consts::PI;

    use nalgebra::Vector2;
    use rand::{rngs::ThreadRng, Rng};
    use rand_distr::{Distribution, Uniform};

    use super::*;

    /// Samples every coordinate independently from the given distributions.
    pub struct DistrBodyCreator<R, MD, PD, VD>
    where
        R: Rng,
        MD: Distribution<f64>,
        PD: Distribution<f64>,
        VD: Distribution<f64>,
    {
        rng: R,
        mass_distr: MD,
        position_distr: PD,
        velocity_distr: VD,
    }

    impl<MD, PD, VD> DistrBodyCreator<ThreadRng, MD, PD, VD>
    where
        MD: Distribution<f64>,
        PD: Distribution<f64>,
        VD: Distribution<f64>,
    {
        pub fn new(mass_distr: MD, position_distr: PD, velocity_distr: VD) -> Self {
            Self::rng(mass_distr, position_distr, velocity_distr, rand::thread_rng())
        }
    }

    impl<R, MD, PD, VD> DistrBodyCreator<R, MD, PD, VD>
    where
        R: Rng,
        MD: Distribution<f64>,
        PD: Distribution<f64>,
        VD: Distribution<f64>,
    {
        pub fn rng(mass_distr: MD, position_distr: PD, velocity_distr: VD, rng: R) -> Self {
            Self {
                rng,
                mass_distr,
                position_distr,
                velocity_distr,
            }
        }
    }

    impl<R, MD, PD, VD> BodyCreator for DistrBodyCreator<R, MD, PD, VD>
    where
        R: Rng,
        MD: Distribution<f64>,
        PD: Distribution<f64>,
        VD: Distribution<f64>,
    {
        fn create_body(&mut self) -> Body {
            let rng = &mut self.rng;

            let mass = self.mass_distr.sample(rng);
            let position = Vector2::new(
                self.position_distr.sample(rng),
                self.position_distr.sample(rng),
            );
            let velocity = Vector2::new(
                self.velocity_distr.sample(rng),
                self.velocity_distr.sample(rng),
            );

            Body::new(position, velocity, mass, 1.)
        }
    }

    /// A rotating disc of stars around a heavy central body at the center of the unit square.
    ///
    /// The first body created is the central one; every further star gets the
    /// circular orbital velocity for its radius.
    pub struct DiscBodyCreator<R, MD, RD>
    where
        R: Rng,
        MD: Distribution<f64>,
        RD: Distribution<f64>,
    {
        rng: R,
        g: f64,
        central_mass: f64,
        mass_distr: MD,
        radial_distr: RD,
        first_body: bool,
    }

    impl<R, MD, RD> DiscBodyCreator<R, MD, RD>
    where
        R: Rng,
        MD: Distribution<f64>,
        RD: Distribution<f64>,
    {
        pub fn new(
            g: f64,
            central_mass: f64,
            mass_distr: MD,
            radial_distr: RD,
            rng: R,
        ) -> Self {
            Self {
                rng,
                g,
                central_mass,
                mass_distr,
                radial_distr,
                first_body: true,
            }
        }
    }

    impl<R, MD, RD> BodyCreator for DiscBodyCreator<R, MD, RD>
    where
        R: Rng,
        MD: Distribution<f64>,
        RD: Distribution<f64>,
    {
        fn create_body(&mut self) -> Body {
            let center = Vector2::new(0.5, 0.5);
            if self.first_body {
                self.first_body = false;
                return Body::new(center, Vector2::zeros(), self.central_mass, 1.);
            }

            let rng = &mut self.rng;

            let r = self.radial_distr.sample(rng);
            let phi = Uniform::new(0., 2. * PI).sample(rng);
            let position = center + r * Vector2::new(phi.cos(), phi.sin());
            let velocity =
                Vector2::new(-phi.sin(), phi.cos()) * (self.g * self.central_mass / r).sqrt();

            Body::new(position, velocity, self.mass_distr.sample(rng), 1.)
        }
    }

}
