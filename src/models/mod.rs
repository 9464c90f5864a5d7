//! Wire types for the namespace provisioning API.

mod requests;

pub use requests::*;

#[cfg(test)]
mod tests;
