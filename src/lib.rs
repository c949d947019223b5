mod config;
mod event;
mod mask;
mod notify;
mod points;
pub mod raster;
mod tool;
mod types;

pub use config::*;
pub use event::*;
pub use mask::*;
pub use notify::{NotificationPolicy, SelectionNotification};
pub use points::*;
pub use raster::{polygon_closes, rasterize, RasterInput, POLYGON_CLOSING_DISTANCE};
pub use tool::*;
pub use types::*;
