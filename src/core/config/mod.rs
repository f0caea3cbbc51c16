pub mod data;
pub mod io;
pub mod printing;

pub use data::Config;

#[cfg(test)]
pub mod tests;
