//! Sport-level rules shared by every provider: at-bat reconstruction and
//! result classification for baseball, shot geometry for basketball.

pub mod baseball;
pub mod basketball;
