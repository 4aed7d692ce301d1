pub mod rest_api;
pub mod roster_image;

pub use rest_api::RestApiAdapter;
pub use roster_image::RosterImageRenderer;
