use quakefem::material::Rheology;
use quakefem::nalgebra::{DMatrix, DVector};
use quakefem::{Error, Real, Result};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub mu: T,
    pub lambda: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

/// Density and seismic wave speeds, the parametrisation used by spatial databases.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeismicVelocities<T> {
    pub density: T,
    pub vs: T,
    pub vp: T,
}

impl<T: Real> From<YoungPoisson<T>> for LameParameters<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn from(params: YoungPoisson<T>) -> Self {
        let YoungPoisson { young, poisson } = params;
        let mu = 0.5 * young / (1.0 + poisson);
        let lambda = 2.0 * mu * poisson / (1.0 - 2.0 * poisson);
        Self { mu, lambda }
    }
}

impl<T: Real> From<SeismicVelocities<T>> for LameParameters<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn from(params: SeismicVelocities<T>) -> Self {
        let SeismicVelocities { density, vs, vp } = params;
        let mu = density * vs * vs;
        let lambda = density * vp * vp - 2.0 * mu;
        Self { mu, lambda }
    }
}

impl<T: Real> LameParameters<T> {
    /// Bulk modulus `K = λ + 2μ/3`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn bulk_modulus(&self) -> T {
        self.lambda + 2.0 * self.mu / 3.0
    }
}

/// Parameters of [`IsotropicLinearElasticity`] at a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticParameters<T> {
    pub density: T,
    pub lame: LameParameters<T>,
}

impl<T: Real> ElasticParameters<T> {
    /// Validated parameters.
    ///
    /// Fails with a material error unless the density, shear modulus and bulk modulus are all
    /// positive.
    pub fn new(density: T, lame: LameParameters<T>) -> Result<Self> {
        if !(density > T::zero()) {
            return Err(Error::material(format!("Found negative or zero density ({density}).")));
        }
        if !(lame.mu > T::zero()) {
            return Err(Error::material(format!(
                "Found negative or zero shear modulus ({}).",
                lame.mu
            )));
        }
        let bulk_modulus = lame.bulk_modulus();
        if !(bulk_modulus > T::zero()) {
            return Err(Error::material(format!(
                "Found negative or zero bulk modulus ({bulk_modulus})."
            )));
        }
        Ok(Self { density, lame })
    }
}

impl<T: Real> TryFrom<SeismicVelocities<T>> for ElasticParameters<T> {
    type Error = Error;

    fn try_from(velocities: SeismicVelocities<T>) -> Result<Self> {
        Self::new(velocities.density, velocities.into())
    }
}

/// Isotropic linear elasticity.
///
/// Given Lamé parameters $\mu$ and $\lambda$, the stress of a strain $\vec \epsilon$ is
/// $$
/// \vec \sigma(\vec \epsilon) = 2 \mu \vec \epsilon + \lambda \operatorname{tr}(\vec \epsilon) \vec I.
/// $$
/// In two dimensions this is plane strain. The associated stress contraction is
/// $$
/// \mathcal{C}(\vec a, \vec b) =
///     \mu \left[ (\vec a \cdot \vec b) \vec I + \vec b \vec a^T \right]
///     + \lambda \vec a \vec b^T.
/// $$
///
/// Parameters are queried as `density`, `vs` and `vp`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsotropicLinearElasticity;

const PROPERTY_NAMES: [&str; 3] = ["density", "vs", "vp"];

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
impl<T: Real> Rheology<T> for IsotropicLinearElasticity {
    type Parameters = ElasticParameters<T>;

    fn property_names(&self) -> &[&'static str] {
        &PROPERTY_NAMES
    }

    fn parameters_from_properties(&self, properties: &[T]) -> Result<Self::Parameters> {
        match *properties {
            [density, vs, vp] => SeismicVelocities { density, vs, vp }.try_into(),
            _ => Err(Error::configuration(format!(
                "Expected density, vs and vp, got {} values.",
                properties.len()
            ))),
        }
    }

    fn density(&self, parameters: &Self::Parameters) -> T {
        parameters.density
    }

    fn wave_speed(&self, parameters: &Self::Parameters) -> T {
        let &ElasticParameters {
            density,
            lame: LameParameters { mu, lambda },
        } = parameters;
        ((lambda + 2.0 * mu) / density).sqrt()
    }

    fn compute_stress(&self, strain: &DMatrix<T>, parameters: &Self::Parameters) -> Result<DMatrix<T>> {
        if !strain.is_square() {
            return Err(Error::configuration(format!(
                "Strain must be a square tensor, got {}x{}.",
                strain.nrows(),
                strain.ncols()
            )));
        }
        let LameParameters { mu, lambda } = parameters.lame;
        let dim = strain.nrows();
        let mut stress = strain * (2.0 * mu);
        for i in 0..dim {
            stress[(i, i)] += lambda * strain.trace();
        }
        Ok(stress)
    }

    #[allow(non_snake_case)]
    fn compute_stress_contraction(&self, a: &DVector<T>, b: &DVector<T>, parameters: &Self::Parameters) -> DMatrix<T> {
        let LameParameters { mu, lambda } = parameters.lame;
        let I = DMatrix::<T>::identity(a.len(), a.len());
        (I * a.dot(b) + b * a.transpose()) * mu + a * b.transpose() * lambda
    }
}
