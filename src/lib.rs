pub mod logging;
pub mod series;
pub mod volume_profile;
