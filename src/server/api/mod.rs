pub mod addon_controller;
pub mod metrics_controller;
pub mod stream_controller;

pub use addon_controller::AddonController;
pub use metrics_controller::MetricsController;
pub use stream_controller::StreamController;
