use super::lame_parameters;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use proptest::prelude::*;
use quakefem::material::Rheology;
use quakefem::nalgebra::{dmatrix, dvector, DMatrix, DVector};
use quakefem::Error;
use quakefem_solid::materials::{ElasticParameters, LameParameters, SeismicVelocities, YoungPoisson};
use quakefem_solid::IsotropicLinearElasticity;
use util::assert_err_matches;

fn elastic_parameters() -> ElasticParameters<f64> {
    ElasticParameters::new(2.0, lame_parameters()).unwrap()
}

#[test]
fn lame_from_young_poisson() {
    let young_poisson = YoungPoisson {
        young: 1e3,
        poisson: 0.3,
    };
    let lame = LameParameters::from(young_poisson);

    assert_scalar_eq!(lame.mu, 384.6153846153846, comp = float);
    assert_scalar_eq!(lame.lambda, 576.9230769230769, comp = float);
}

#[test]
fn lame_from_seismic_velocities() {
    let velocities = SeismicVelocities {
        density: 2500.0,
        vs: 3000.0,
        vp: 6000.0,
    };
    let lame = LameParameters::from(velocities);

    assert_scalar_eq!(lame.mu, 2.25e10, comp = float);
    assert_scalar_eq!(lame.lambda, 4.5e10, comp = float);
    assert_scalar_eq!(lame.bulk_modulus(), 6.0e10, comp = float);
}

#[test]
fn parameters_from_properties_round_trip_wave_speed() {
    let params = IsotropicLinearElasticity
        .parameters_from_properties(&[2500.0, 3000.0, 6000.0])
        .unwrap();

    assert_eq!(IsotropicLinearElasticity.density(&params), 2500.0);
    assert_scalar_eq!(IsotropicLinearElasticity.wave_speed(&params), 6000.0, comp = float);
}

#[test]
fn non_physical_parameters_are_material_errors() {
    let rheology = IsotropicLinearElasticity;
    let check = |properties: [f64; 3]| rheology.parameters_from_properties(&properties);

    assert_err_matches!(check([0.0, 3000.0, 6000.0]), Error::Material(_));
    assert_err_matches!(check([-1.0, 3000.0, 6000.0]), Error::Material(_));
    assert_err_matches!(check([2500.0, 0.0, 6000.0]), Error::Material(_));
    // vp too small relative to vs gives a negative bulk modulus
    assert_err_matches!(check([2500.0, 3000.0, 3000.0]), Error::Material(_));
}

#[test]
fn wrong_number_of_properties_is_a_configuration_error() {
    let result: Result<ElasticParameters<f64>, _> = IsotropicLinearElasticity.parameters_from_properties(&[1.0, 2.0]);
    assert_err_matches!(result, Error::Configuration(_));
}

#[test]
fn linear_elastic_stress_2d() {
    let strain = dmatrix![1.0, 2.0;
                          2.0, 4.0];
    let stress = IsotropicLinearElasticity
        .compute_stress(&strain, &elastic_parameters())
        .unwrap();

    let expected = dmatrix![3653.0, 1536.0;
                            1536.0, 5957.0];
    assert_matrix_eq!(stress, expected, comp = float);
}

#[test]
fn linear_elastic_stress_3d_is_isotropic() {
    // A pure volumetric strain gives a pure pressure 3K e
    let strain = DMatrix::identity(3, 3) * 1e-3;
    let stress = IsotropicLinearElasticity
        .compute_stress(&strain, &elastic_parameters())
        .unwrap();

    let bulk_modulus = lame_parameters().bulk_modulus();
    let expected = DMatrix::identity(3, 3) * (3.0 * bulk_modulus * 1e-3);
    assert_matrix_eq!(stress, expected, comp = abs, tol = 1e-12);
}

#[test]
fn non_square_strain_is_rejected() {
    let strain = DMatrix::zeros(2, 3);
    assert_err_matches!(
        IsotropicLinearElasticity.compute_stress(&strain, &elastic_parameters()),
        Error::Configuration(_)
    );
}

#[test]
fn stress_contraction_agrees_with_stress() {
    // C(a, b) c = sigma(sym(c b^T)) a for a linear rheology
    let a = dvector![1.0, -2.0, 0.5];
    let b = dvector![0.3, 0.7, -1.1];
    let c = dvector![-0.4, 0.9, 2.0];
    let params = elastic_parameters();

    let contraction = IsotropicLinearElasticity.compute_stress_contraction(&a, &b, &params);
    let grad = &c * b.transpose();
    let strain = (&grad + grad.transpose()) * 0.5;
    let stress = IsotropicLinearElasticity.compute_stress(&strain, &params).unwrap();

    assert_matrix_eq!(contraction * &c, stress * &a, comp = abs, tol = 1e-9);
}

proptest! {
    #[test]
    fn stress_contraction_is_symmetric(
        a in prop::collection::vec(-10.0..10.0, 3),
        b in prop::collection::vec(-10.0..10.0, 3),
    ) {
        let a = DVector::from_vec(a);
        let b = DVector::from_vec(b);
        let params = elastic_parameters();
        let c_ab = IsotropicLinearElasticity.compute_stress_contraction(&a, &b, &params);
        let c_ba = IsotropicLinearElasticity.compute_stress_contraction(&b, &a, &params);
        assert_matrix_eq!(c_ab, c_ba.transpose(), comp = abs, tol = 1e-9);
    }
}
