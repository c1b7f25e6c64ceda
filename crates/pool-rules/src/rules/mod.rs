pub mod balls;
pub mod cue;
pub mod players;
pub mod resolver;
pub mod round;
pub mod shot;
