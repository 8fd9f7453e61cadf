#![warn(unused_extern_crates)]
#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]
mod chi_square;
pub mod crp;
pub mod gauss;
pub mod mh;
pub mod occupancy;

pub use occupancy::{Occupancy, OccupancyDiagnostics, OccupancyError};
pub use splitmerge_consts::rv;

pub mod test {
    use super::chi_square;

    pub use chi_square::{chi_square_test, ChiSquareTest};
}
