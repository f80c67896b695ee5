pub mod cli;
pub mod dns;
pub mod network;
pub mod report;
pub mod runner;
pub mod utils;

pub use cli::*;
pub use dns::*;
pub use network::*;
pub use report::*;
pub use runner::*;
pub use utils::*;
