pub mod clock;
pub mod rate_limiter;
pub mod static_answers;
pub mod upstream;
