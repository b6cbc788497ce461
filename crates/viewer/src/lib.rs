mod controller;
mod datasets;
mod headless;
mod loader;
mod regions;
mod session;
mod surface;
pub mod templates;
mod utils;

pub use controller::*;
pub use datasets::*;
pub use headless::*;
pub use loader::*;
pub use regions::*;
pub use session::*;
pub use surface::*;
pub use utils::*;
