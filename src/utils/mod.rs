pub mod data;
pub mod dates;
pub mod maximizer;
pub mod projections;
pub mod request_gate;
pub mod schedule;
pub mod week_calculator;
