//! Harvest recipient addresses from an IMAP folder into an address book.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod harvest;
pub mod mail;
pub mod render;

pub use domain::{Address, AddressBook, DateFilter, HeaderRecord};
pub use error::{DecodeError, HarvestError};
pub use harvest::{Harvest, HarvestStats, harvest, merge};
