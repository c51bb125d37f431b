mod common;
mod dispatch;

pub use common::common_routes;
pub use dispatch::app;
