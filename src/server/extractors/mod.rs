mod client_address_extractor;

pub use client_address_extractor::*;
