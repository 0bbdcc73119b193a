pub mod abook;
pub mod record;

pub use abook::{Address, AddressBook, DisplayName, Upsert};
pub use record::{DateFilter, HeaderRecord};
