use quakefem::settings::{ExplicitSettings, ImplicitSettings, NeumannSettings, StrainFormulation};

#[test]
fn explicit_settings_defaults() {
    let settings: ExplicitSettings<f64> = serde_json::from_str(r#"{ "time_step": 0.01 }"#).unwrap();
    assert_eq!(settings, ExplicitSettings::new(0.01));
    assert!(!settings.lumped);
    assert_eq!(settings.formulation, StrainFormulation::Infinitesimal);
    assert_eq!(settings.gravity, None);

    assert!(serde_json::from_str::<ExplicitSettings<f64>>(r#"{ "lumped": true }"#).is_err());
}

#[test]
fn explicit_settings_from_json() {
    let json = r#"{
        "time_step": 0.005,
        "lumped": true,
        "formulation": "finite",
        "gravity": [0.0, 0.0, -9.80665]
    }"#;
    let settings: ExplicitSettings<f64> = serde_json::from_str(json).unwrap();
    let expected = ExplicitSettings::new(0.005)
        .with_lumped(true)
        .with_formulation(StrainFormulation::Finite)
        .with_gravity(vec![0.0, 0.0, -9.80665]);
    assert_eq!(settings, expected);

    let round_trip: ExplicitSettings<f64> = serde_json::from_str(&serde_json::to_string(&expected).unwrap()).unwrap();
    assert_eq!(round_trip, expected);
}

#[test]
fn implicit_settings_default_to_no_gravity() {
    let settings: ImplicitSettings<f64> = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, ImplicitSettings::default());
    assert_eq!(settings.gravity, None);
}

#[test]
fn neumann_settings_hold_boundary_label() {
    let settings: NeumannSettings = serde_json::from_str(r#"{ "label": "surface" }"#).unwrap();
    assert_eq!(settings, NeumannSettings::new("surface"));
    assert!(serde_json::from_str::<NeumannSettings>("{}").is_err());
}
