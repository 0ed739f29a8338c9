pub mod lifecycle;
pub mod listing;
pub mod transitions;
