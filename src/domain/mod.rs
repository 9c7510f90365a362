//! Domain layer: sensor catalog, readings, live subscriptions, fan-out,
//! and threshold classification.
//!
//! Nothing in here touches the network or the database. The registry and
//! dispatcher hold in-memory state only; alert classification is pure.

pub mod alert;
pub mod connection_id;
pub mod dispatcher;
pub mod reading;
pub mod registry;
pub mod sensor;
pub mod subscription;

pub use alert::{AlertType, Severity, ThresholdConfig, Violation};
pub use connection_id::ConnectionId;
pub use dispatcher::{BroadcastDispatcher, DispatchReport};
pub use reading::Reading;
pub use registry::{ConnectionHandle, DeliveryError, ReadingSender, SubscriptionRegistry};
pub use sensor::{CATALOG, CutPoints, DeviceType, SensorProfile, SensorType};
pub use subscription::{SensorClass, SubscriptionKey};
