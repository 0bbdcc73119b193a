//! Address book output formats

use std::io::{self, Write};

use log::debug;

use crate::domain::AddressBook;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// `address<TAB>name` lines
    #[default]
    Tsv,
    /// vCard 2.1, one card per address
    Vcard,
}

/// Write `book` in `format`. Entries without a name are skipped unless
/// `email_as_name` is set, in which case the address doubles as the name.
pub fn render<W: Write>(
    book: &AddressBook,
    format: Format,
    email_as_name: bool,
    out: W,
) -> io::Result<usize> {
    match format {
        Format::Tsv => write_tsv(book, email_as_name, out),
        Format::Vcard => write_vcard(book, email_as_name, out),
    }
}

pub fn write_tsv<W: Write>(book: &AddressBook, email_as_name: bool, mut out: W) -> io::Result<usize> {
    let mut written = 0;
    for (addr, name) in book.named_entries(email_as_name) {
        writeln!(out, "{addr}\t{name}")?;
        written += 1;
    }
    out.flush()?;
    debug!("Wrote {written} TSV lines");
    Ok(written)
}

pub fn write_vcard<W: Write>(
    book: &AddressBook,
    email_as_name: bool,
    mut out: W,
) -> io::Result<usize> {
    let mut written = 0;
    for (addr, name) in book.named_entries(email_as_name) {
        write!(
            out,
            "BEGIN:VCARD\r\nVERSION:2.1\r\nN:{name}\r\nEMAIL:{addr}\r\nEND:VCARD\r\n"
        )?;
        written += 1;
    }
    out.flush()?;
    debug!("Wrote {written} vCards");
    Ok(written)
}
