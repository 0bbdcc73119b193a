use crate::domain::DateFilter;
use crate::error::Result;

/// Yields the raw To/Cc/Bcc/Date header block of every selected message,
/// in the server's message order.
pub trait HeaderSource {
    fn fetch_headers(&mut self, filter: &DateFilter) -> Result<Vec<Vec<u8>>>;
}

impl<S: HeaderSource + ?Sized> HeaderSource for &mut S {
    fn fetch_headers(&mut self, filter: &DateFilter) -> Result<Vec<Vec<u8>>> {
        (**self).fetch_headers(filter)
    }
}
