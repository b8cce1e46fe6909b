// Getting ledger data out of the store in portable formats.

pub mod export;

pub use export::*;
