pub mod bus;

pub use bus::{BallAction, EventBus, EventKind, PoolEvent, SubscriptionId};
