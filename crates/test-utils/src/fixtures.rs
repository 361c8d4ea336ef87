//! Common test fixtures for ROMS datasets.

/// File name of the optional real ROMS dataset used by integration tests.
pub const EXAMPLE_DATASET: &str = "example.nc";

/// Grid dimensions of the Doppio ROMS configuration (rho points).
pub mod doppio {
    /// Vertical sigma levels
    pub const S_RHO: usize = 40;
    /// Rows
    pub const ETA_RHO: usize = 106;
    /// Columns
    pub const XI_RHO: usize = 242;

    /// Nodes of one horizontal slice.
    pub const HORIZONTAL_NODES: usize = ETA_RHO * XI_RHO;

    /// Nodes of one 3-D (level, row, col) slice.
    pub const VOLUME_NODES: usize = S_RHO * ETA_RHO * XI_RHO;
}

/// Common time values for testing.
pub mod time {
    /// Time units as written by ROMS.
    pub const ROMS_TIME_UNITS: &str = "hours since 2017-11-01 00:00:00.000 UTC";

    /// Calendar attribute as written by ROMS.
    pub const ROMS_CALENDAR: &str = "proleptic_gregorian";

    /// Daily-average output step, in hours.
    pub const DAILY_STEP_HOURS: f64 = 24.0;
}
