mod driver;
mod tick;

pub use driver::Simulation;
pub use tick::FixedTimestep;
