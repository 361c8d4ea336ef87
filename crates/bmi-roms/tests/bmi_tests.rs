//! End-to-end tests of the BMI contract over in-memory ROMS datasets.

use bmi_roms::{Bmi, BmiError, BmiErrorKind, BmiRoms, GRID_TYPE, VAR_LOCATION};
use ndarray::{ArrayD, IxDyn};
use roms_dataset::{Catalog, CatalogOptions, MemoryStore};
use test_utils::fixtures::doppio::{ETA_RHO, HORIZONTAL_NODES, S_RHO, VOLUME_NODES, XI_RHO};
use test_utils::fixtures::time::{DAILY_STEP_HOURS, ROMS_CALENDAR, ROMS_TIME_UNITS};
use test_utils::{assert_approx_eq, indexed_values, salinity_values, uniform_axis};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// One time step of Doppio-shaped output: 3-D salinity plus the 2-D
/// longitude/latitude fields.
fn doppio_catalog(options: CatalogOptions, salt_units: Option<&str>) -> Catalog {
    let mut builder = MemoryStore::builder()
        .dimension("ocean_time", 1)
        .dimension("s_rho", S_RHO)
        .dimension("eta_rho", ETA_RHO)
        .dimension("xi_rho", XI_RHO)
        .variable("ocean_time", &["ocean_time"], vec![47436.0])
        .units("ocean_time", ROMS_TIME_UNITS)
        .attribute("ocean_time", "calendar", ROMS_CALENDAR)
        .variable(
            "lon_rho",
            &["eta_rho", "xi_rho"],
            (0..HORIZONTAL_NODES)
                .map(|i| -82.0 + (i % XI_RHO) as f64 * 0.1)
                .collect(),
        )
        .units("lon_rho", "degree_east")
        .variable(
            "lat_rho",
            &["eta_rho", "xi_rho"],
            (0..HORIZONTAL_NODES)
                .map(|i| 32.0 + (i / XI_RHO) as f64 * 0.1)
                .collect(),
        )
        .units("lat_rho", "degree_north")
        .variable(
            "salt",
            &["ocean_time", "s_rho", "eta_rho", "xi_rho"],
            salinity_values(VOLUME_NODES),
        )
        .attribute("salt", "long_name", "time-averaged salinity");
    if let Some(units) = salt_units {
        builder = builder.units("salt", units);
    }
    let store = builder.build().unwrap();
    Catalog::from_store(Box::new(store), "doppio", options).unwrap()
}

/// Small multi-step dataset with predictable values.
fn small_catalog(steps: usize) -> Catalog {
    let store = MemoryStore::builder()
        .dimension("ocean_time", steps)
        .dimension("s_rho", 2)
        .dimension("eta_rho", 2)
        .dimension("xi_rho", 3)
        .variable(
            "ocean_time",
            &["ocean_time"],
            uniform_axis(12.0, DAILY_STEP_HOURS, steps),
        )
        .units("ocean_time", ROMS_TIME_UNITS)
        .variable("s_rho", &["s_rho"], vec![-0.75, -0.25])
        .variable(
            "zeta",
            &["ocean_time", "eta_rho", "xi_rho"],
            indexed_values(&[steps, 2, 3]),
        )
        .units("zeta", "meter")
        .variable("h", &["eta_rho", "xi_rho"], vec![25.0; 6])
        .units("h", "meter")
        .variable(
            "temp",
            &["ocean_time", "s_rho", "eta_rho", "xi_rho"],
            indexed_values(&[steps, 2, 2, 3]),
        )
        .units("temp", "Celsius")
        .build()
        .unwrap();
    Catalog::from_store(Box::new(store), "small", CatalogOptions::default()).unwrap()
}

fn ready(catalog: Catalog) -> BmiRoms {
    init_tracing();
    let mut model = BmiRoms::new();
    model.initialize_from_catalog(catalog).unwrap();
    model
}

// ============================================================================
// Doppio-shaped dataset
// ============================================================================

#[test]
fn test_doppio_grids() {
    let mut model = ready(doppio_catalog(CatalogOptions::default(), Some("psu")));

    assert_eq!(
        model.get_output_var_names().unwrap(),
        vec!["lon_rho", "lat_rho", "salt"]
    );
    assert_eq!(model.get_output_item_count().unwrap(), 3);

    let lon = model.get_var_grid("lon_rho").unwrap();
    let lat = model.get_var_grid("lat_rho").unwrap();
    let salt = model.get_var_grid("salt").unwrap();
    assert_eq!(lon, lat);
    assert_ne!(lon, salt);

    assert_eq!(model.get_grid_rank(lon).unwrap(), 2);
    assert_eq!(model.get_grid_rank(salt).unwrap(), 3);
    assert_eq!(model.get_grid_size(lon).unwrap(), HORIZONTAL_NODES);
    assert_eq!(model.get_grid_size(salt).unwrap(), VOLUME_NODES);

    let mut shape = [0usize; 3];
    model.get_grid_shape(salt, &mut shape).unwrap();
    assert_eq!(shape, [S_RHO, ETA_RHO, XI_RHO]);

    // single step: update is a no-op
    let before = model.get_current_time().unwrap();
    model.update().unwrap();
    assert_eq!(model.get_current_time().unwrap(), before);
    assert_eq!(model.get_time_step().unwrap(), 0.0);

    let mut buffer = vec![0.0; VOLUME_NODES];
    model.get_value("salt", &mut buffer).unwrap();
    assert_eq!(buffer, salinity_values(VOLUME_NODES));

    assert_eq!(model.get_var_nbytes("salt").unwrap(), 8 * VOLUME_NODES);
    assert_eq!(model.get_var_nbytes("salt").unwrap(), 8_208_640);
    model.finalize().unwrap();
}

#[test]
fn test_doppio_unitless_salt() {
    let model = ready(doppio_catalog(CatalogOptions::default(), None));
    assert_eq!(
        model.get_output_var_names().unwrap(),
        vec!["lon_rho", "lat_rho"]
    );

    let model = ready(doppio_catalog(
        CatalogOptions {
            include_unitless: true,
        },
        None,
    ));
    assert_eq!(model.get_var_units("salt").unwrap(), "N/A");
    assert_eq!(model.get_var_grid("salt").unwrap(), 1);
}

#[test]
fn test_doppio_time_metadata() {
    let model = ready(doppio_catalog(CatalogOptions::default(), Some("psu")));
    assert_eq!(model.get_time_units().unwrap(), ROMS_TIME_UNITS);
    assert_eq!(model.get_time_calendar().unwrap(), ROMS_CALENDAR);
    assert_eq!(model.get_start_time().unwrap(), 47436.0);
    assert_eq!(model.get_end_time().unwrap(), 47436.0);

    let datetime = model.get_current_datetime().unwrap().unwrap();
    assert_eq!(datetime.to_rfc3339(), "2023-03-31T12:00:00+00:00");
}

#[test]
fn test_unrepresentable_datetime_is_none() {
    let store = MemoryStore::builder()
        .dimension("ocean_time", 1)
        .dimension("eta_rho", 2)
        .dimension("xi_rho", 3)
        .variable("ocean_time", &["ocean_time"], vec![1.0e12])
        .units("ocean_time", "days since 2000-01-01")
        .variable("zeta", &["ocean_time", "eta_rho", "xi_rho"], vec![0.0; 6])
        .units("zeta", "meter")
        .build()
        .unwrap();
    let catalog = Catalog::from_store(Box::new(store), "far", CatalogOptions::default()).unwrap();
    let model = ready(catalog);

    assert_eq!(model.get_current_time().unwrap(), 1.0e12);
    assert_eq!(model.get_current_datetime().unwrap(), None);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_grid_geometry_is_consistent() {
    let model = ready(small_catalog(4));

    for name in model.get_output_var_names().unwrap() {
        let grid = model.get_var_grid(&name).unwrap();
        assert_eq!(model.get_var_grid(&name).unwrap(), grid);

        let rank = model.get_grid_rank(grid).unwrap();
        let mut shape = vec![0usize; rank];
        let mut spacing = vec![0.0; rank];
        let mut origin = vec![0.0; rank];
        model.get_grid_shape(grid, &mut shape).unwrap();
        model.get_grid_spacing(grid, &mut spacing).unwrap();
        model.get_grid_origin(grid, &mut origin).unwrap();

        assert_eq!(model.get_grid_size(grid).unwrap(), shape.iter().product::<usize>());
        assert_eq!(model.get_grid_type(grid).unwrap(), GRID_TYPE);
        assert_eq!(model.get_var_location(&name).unwrap(), VAR_LOCATION);
    }
}

#[test]
fn test_grid_spacing_and_origin() {
    let model = ready(small_catalog(2));
    let grid = model.get_var_grid("temp").unwrap();

    let mut spacing = [0.0; 3];
    let mut origin = [0.0; 3];
    model.get_grid_spacing(grid, &mut spacing).unwrap();
    model.get_grid_origin(grid, &mut origin).unwrap();

    assert_approx_eq!(spacing[0], 0.5, 1e-12);
    assert_approx_eq!(origin[0], -0.75, 1e-12);
    assert_eq!(&spacing[1..], &[1.0, 1.0]);
    assert_eq!(&origin[1..], &[0.0, 0.0]);
}

#[test]
fn test_time_is_monotonic() {
    let mut model = ready(small_catalog(5));
    let start = model.get_start_time().unwrap();
    let step = model.get_time_step().unwrap();
    assert_eq!(start, 12.0);
    assert_eq!(step, DAILY_STEP_HOURS);
    assert_eq!(model.get_end_time().unwrap(), 12.0 + 4.0 * DAILY_STEP_HOURS);

    let mut previous = model.get_current_time().unwrap();
    for n in 1..5 {
        model.update().unwrap();
        let now = model.get_current_time().unwrap();
        assert!(now >= previous);
        assert_eq!(now, start + n as f64 * step);
        previous = now;
    }
}

#[test]
fn test_value_round_trip() {
    let mut model = ready(small_catalog(3));
    model.update().unwrap();

    let grid = model.get_var_grid("temp").unwrap();
    let size = model.get_grid_size(grid).unwrap();
    let mut shape = [0usize; 3];
    model.get_grid_shape(grid, &mut shape).unwrap();

    let mut buffer = vec![f64::NAN; size];
    model.get_value("temp", &mut buffer).unwrap();
    assert!(buffer.iter().all(|v| v.is_finite()));

    let native = ArrayD::from_shape_vec(IxDyn(&shape), buffer).unwrap();
    let stored = ArrayD::from_shape_vec(IxDyn(&[3, 2, 2, 3]), indexed_values(&[3, 2, 2, 3]))
        .unwrap();
    assert_eq!(native, stored.index_axis(ndarray::Axis(0), 1));
    // value at [time=1, level=1, row=0, col=2]
    assert_eq!(native[[1, 0, 2]], 1_001_000_002.0);
}

#[test]
fn test_static_variable_ignores_time() {
    let mut model = ready(small_catalog(3));
    model.update().unwrap();
    let mut buffer = vec![0.0; 6];
    model.get_value("h", &mut buffer).unwrap();
    assert_eq!(buffer, vec![25.0; 6]);
}

#[test]
fn test_value_at_indices() {
    let model = ready(small_catalog(2));
    let mut dest = [0.0; 2];
    model
        .get_value_at_indices("zeta", &mut dest, &[0, 5])
        .unwrap();
    assert_eq!(dest, [0.0, 1_002.0]);

    let err = model
        .get_value_at_indices("zeta", &mut dest, &[0, 6])
        .unwrap_err();
    assert_eq!(err.kind(), BmiErrorKind::IndexOutOfRange);
}

#[test]
fn test_update_until() {
    let mut model = ready(small_catalog(4));
    model.update_until(40.0).unwrap();
    assert_eq!(model.get_current_time().unwrap(), 60.0);

    model.update_until(1.0e6).unwrap();
    assert_eq!(model.get_current_time().unwrap(), model.get_end_time().unwrap());
}

#[test]
fn test_input_side_is_empty() {
    let model = ready(small_catalog(2));
    assert_eq!(model.get_component_name(), "ROMS Model Data");
    assert_eq!(model.get_input_item_count().unwrap(), 0);
    assert!(model.get_input_var_names().unwrap().is_empty());
    assert_eq!(model.get_var_type("zeta").unwrap(), "float64");
    assert_eq!(model.get_var_itemsize("zeta").unwrap(), 8);
}

// ============================================================================
// Error scenarios
// ============================================================================

#[test]
fn test_undersized_buffer_untouched() {
    let model = ready(small_catalog(2));
    let mut buffer = vec![-9.0; 5];
    let err = model.get_value("zeta", &mut buffer).unwrap_err();
    assert!(matches!(
        err,
        BmiError::BufferSizeMismatch {
            expected: 6,
            actual: 5
        }
    ));
    assert!(buffer.iter().all(|&v| v == -9.0));
}

#[test]
fn test_update_past_end() {
    let mut model = ready(small_catalog(3));
    model.update().unwrap();
    model.update().unwrap();
    let time = model.get_current_time().unwrap();

    let err = model.update().unwrap_err();
    assert!(matches!(err, BmiError::EndOfData { step: 2, total: 3 }));
    assert_eq!(model.get_current_time().unwrap(), time);
}

#[test]
fn test_queries_before_initialize() {
    let mut model = BmiRoms::new();
    let mut shape = [0usize; 2];
    let mut buffer = [0.0; 6];

    let results = [
        model.get_output_var_names().map(|_| ()),
        model.get_output_item_count().map(|_| ()),
        model.get_var_grid("zeta").map(|_| ()),
        model.get_var_units("zeta").map(|_| ()),
        model.get_grid_rank(0).map(|_| ()),
        model.get_grid_shape(0, &mut shape),
        model.get_current_time().map(|_| ()),
        model.get_time_units().map(|_| ()),
        model.get_value("zeta", &mut buffer),
    ];
    for result in results {
        assert_eq!(result.unwrap_err().kind(), BmiErrorKind::NotInitialized);
    }
    assert_eq!(model.update().unwrap_err().kind(), BmiErrorKind::NotInitialized);
}

#[test]
fn test_unknown_identifiers() {
    let model = ready(small_catalog(2));
    assert!(matches!(
        model.get_var_grid("salt"),
        Err(BmiError::UnknownVariable(_))
    ));
    assert!(matches!(
        model.get_var_units("mask_rho"),
        Err(BmiError::UnknownVariable(_))
    ));
    assert!(matches!(model.get_grid_size(7), Err(BmiError::UnknownGrid(7))));
}

#[test]
fn test_double_finalize() {
    let mut model = ready(small_catalog(2));
    model.finalize().unwrap();
    model.finalize().unwrap();
    assert_eq!(
        model.get_output_var_names().unwrap_err().kind(),
        BmiErrorKind::NotInitialized
    );
    assert_eq!(
        model.catalog().unwrap_err().kind(),
        BmiErrorKind::NotInitialized
    );
}

#[test]
fn test_independent_handles() {
    let mut first = ready(small_catalog(3));
    let second = ready(small_catalog(3));
    first.update().unwrap();
    assert_eq!(first.get_current_time().unwrap(), 36.0);
    assert_eq!(second.get_current_time().unwrap(), 12.0);
}
