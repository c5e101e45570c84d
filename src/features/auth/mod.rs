pub mod controller;
pub mod dtos;
pub mod model;

pub use controller::SessionController;
pub use model::{NavAction, Routing, Screen, SessionState};
