#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]
mod matrix;
mod misc;
mod random;

pub use matrix::{Matrix, Shape};
pub use misc::*;
pub use random::*;
