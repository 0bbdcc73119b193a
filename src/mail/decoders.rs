use log::{debug, warn};
use mailparse::{MailAddr, MailHeaderMap};

use crate::domain::HeaderRecord;
use crate::error::DecodeError;

/// Header fields that carry recipients, in harvest order.
pub const ADDRESS_FIELDS: [&str; 3] = ["To", "Cc", "Bcc"];

pub fn decode_mime_words(raw: &[u8]) -> String {
    let mut line = b"X: ".to_vec();
    line.extend_from_slice(raw);
    line.extend_from_slice(b"\r\n");

    match mailparse::parse_header(&line) {
        Ok((h, _idx)) => h.get_value(), // decodes RFC 2047 encoded-words
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Decoded, trimmed display name; `None` when nothing readable is left.
pub fn decode_display_name(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_matches('"').trim();
    if raw.is_empty() {
        return None;
    }
    let name = decode_mime_words(raw.as_bytes());
    let name = name.trim().trim_matches('"').trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Turn one raw header block (as returned by a HEADER.FIELDS fetch) into a
/// `HeaderRecord`. Only a block that is not header syntax at all fails; a
/// single unparsable address field is skipped with a warning.
pub fn decode_header_block(raw: &[u8]) -> Result<HeaderRecord, DecodeError> {
    check_header_syntax(raw)?;

    let (headers, _) =
        mailparse::parse_headers(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let mut pairs = Vec::new();
    for field in ADDRESS_FIELDS {
        for header in headers.get_all_headers(field) {
            let value = unfold(header.get_value_raw());
            match parse_address_list(&value) {
                Ok(mut parsed) => pairs.append(&mut parsed),
                Err(e) => warn!("Skipping unparsable {} field {:?}: {}", field, value, e),
            }
        }
    }

    let date = headers
        .get_first_value("Date")
        .and_then(|d| match mailparse::dateparse(&d) {
            // the epoch itself is what a date with no usable fields comes out as
            Ok(0) => None,
            Ok(epoch) => Some(epoch),
            Err(e) => {
                debug!("Unparsable Date {:?}: {}", d, e);
                None
            }
        });

    Ok(HeaderRecord { pairs, date })
}

fn parse_address_list(
    value: &str,
) -> Result<Vec<(Option<String>, String)>, mailparse::MailParseError> {
    if value.trim().is_empty() {
        return Ok(vec![]);
    }

    let mut out = Vec::new();
    for addr in mailparse::addrparse(value)?.into_inner() {
        let singles = match addr {
            MailAddr::Single(info) => vec![info],
            MailAddr::Group(group) => group.addrs,
        };
        for info in singles {
            let address = info.addr.trim().to_lowercase();
            if address.is_empty() {
                continue;
            }
            if address.contains(char::is_whitespace) {
                warn!("Skipping address with embedded whitespace: {:?}", info.addr);
                continue;
            }
            let name = info.display_name.as_deref().and_then(decode_display_name);
            out.push((name, address));
        }
    }
    Ok(out)
}

fn unfold(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).replace("\r\n", "").replace('\n', "")
}

/// The first non-blank line must start with `field-name:`. A block made only
/// of blank lines is valid: the message had none of the requested fields.
fn check_header_syntax(raw: &[u8]) -> Result<(), DecodeError> {
    let text = String::from_utf8_lossy(raw);
    let Some(first) = text.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(());
    };

    let valid = match first.split_once(':') {
        Some((name, _)) => !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic()),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DecodeError::Malformed(format!(
            "not a header field: {:?}",
            first.chars().take(60).collect::<String>()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: Option<&str>, addr: &str) -> (Option<String>, String) {
        (name.map(str::to_string), addr.to_string())
    }

    #[test]
    fn preserves_field_and_list_order() {
        let raw = b"Bcc: z@x\r\nTo: \"Bob\" <B@X.org>, carol@y\r\nCc: Dave <d@z>\r\n\r\n";
        let rec = decode_header_block(raw).unwrap();
        assert_eq!(
            rec.pairs,
            vec![
                pair(Some("Bob"), "b@x.org"),
                pair(None, "carol@y"),
                pair(Some("Dave"), "d@z"),
                pair(None, "z@x"),
            ]
        );
    }

    #[test]
    fn decodes_encoded_word_names() {
        let raw = b"To: =?UTF-8?B?w4lyaWM=?= <eric@x>, \"=?iso-8859-1?Q?Fran=E7ois?=\" <f@x>\r\n";
        let rec = decode_header_block(raw).unwrap();
        assert_eq!(
            rec.pairs,
            vec![pair(Some("Éric"), "eric@x"), pair(Some("François"), "f@x")]
        );
    }

    #[test]
    fn folded_field_is_unfolded() {
        let raw = b"To: Alice <a@x>,\r\n Bob <b@x>\r\n";
        let rec = decode_header_block(raw).unwrap();
        assert_eq!(rec.pairs, vec![pair(Some("Alice"), "a@x"), pair(Some("Bob"), "b@x")]);
    }

    #[test]
    fn groups_are_flattened() {
        let raw = b"To: Team: a@x, Bob <b@x>;\r\n";
        let rec = decode_header_block(raw).unwrap();
        assert_eq!(rec.pairs, vec![pair(None, "a@x"), pair(Some("Bob"), "b@x")]);
    }

    #[test]
    fn bad_field_does_not_spoil_others() {
        let raw = b"To: ; Broken <a@x>\r\nCc: Carol <c@y>\r\n";
        let rec = decode_header_block(raw).unwrap();
        assert_eq!(rec.pairs, vec![pair(Some("Carol"), "c@y")]);
    }

    #[test]
    fn unbracketed_name_is_not_an_address() {
        let raw = b"To: John Smith john@x, Ann <ann@x>\r\n";
        let rec = decode_header_block(raw).unwrap();
        assert_eq!(rec.pairs, vec![pair(Some("Ann"), "ann@x")]);
    }

    #[test]
    fn parses_date() {
        let raw = b"To: a@x\r\nDate: Thu, 01 Jan 1970 00:01:40 +0000\r\n";
        assert_eq!(decode_header_block(raw).unwrap().date, Some(100));
    }

    #[test]
    fn bad_or_missing_date_is_unknown() {
        let raw = b"To: a@x\r\nDate: unparsable\r\n";
        assert_eq!(decode_header_block(raw).unwrap().date, None);
        assert_eq!(decode_header_block(b"To: a@x\r\n").unwrap().date, None);
    }

    #[test]
    fn empty_block_is_empty_record() {
        assert_eq!(decode_header_block(b"\r\n").unwrap(), HeaderRecord::default());
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_header_block(b"this is not a header block\r\n").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(decode_display_name("  \"\"  "), None);
        assert_eq!(decode_display_name("Plain Name"), Some("Plain Name".into()));
    }
}
