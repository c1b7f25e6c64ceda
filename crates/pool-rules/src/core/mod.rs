pub mod scheduler;
pub mod time;
pub mod tween;
