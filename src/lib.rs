pub mod config;
pub mod detect;
pub mod logging;
pub mod response;
pub mod routes;
pub mod squat;
pub mod state;
pub mod store;
pub mod validation;
pub mod view;
