use tk_core::Error;

/// Decodes a project file according to the `encoding` of its XML
/// declaration. UTF-8 is assumed when the declaration is absent.
pub fn decode_document(bytes: &[u8]) -> Result<String, Error> {
    let label = declared_encoding(bytes).unwrap_or_else(|| "utf-8".to_owned());
    match label.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => {
            String::from_utf8(bytes.to_vec()).map_err(|err| {
                Error::Encoding(format!(
                    "invalid UTF-8 at byte {}",
                    err.utf8_error().valid_up_to()
                ))
            })
        }
        "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
        _ => Err(Error::Encoding(format!("unsupported document encoding '{label}'"))),
    }
}

fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if !bytes.starts_with(b"<?xml") {
        return None;
    }
    let end = bytes.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&bytes[..end]).ok()?;

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    Some(value[..value.find(quote)?].to_owned())
}

#[cfg(test)]
mod tests {
    use tk_core::Error;

    use super::{declared_encoding, decode_document};

    #[test]
    fn reads_declared_label() {
        let decl = br#"<?xml version="1.0" encoding="ISO-8859-1"?><a/>"#;
        assert_eq!(declared_encoding(decl).as_deref(), Some("ISO-8859-1"));
        assert_eq!(
            declared_encoding(b"<?xml version='1.0' encoding = 'utf-8' ?><a/>").as_deref(),
            Some("utf-8")
        );
        assert_eq!(declared_encoding(br#"<?xml version="1.0"?><a/>"#), None);
        assert_eq!(declared_encoding(b"<a/>"), None);
    }

    #[test]
    fn latin1_bytes_decode_to_code_points() {
        let doc = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a t=\"Caf\xE9 \xB5m\"/>";
        let text = decode_document(doc).expect("latin-1");
        assert!(text.ends_with("<a t=\"Caf\u{e9} \u{b5}m\"/>"));
    }

    #[test]
    fn utf8_is_the_default() {
        assert_eq!(
            decode_document("<a t=\"Caf\u{e9}\"/>".as_bytes()).expect("utf-8"),
            "<a t=\"Caf\u{e9}\"/>"
        );
        assert!(matches!(
            decode_document(b"<a t=\"Caf\xE9\"/>"),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            decode_document(b"<?xml version=\"1.0\" encoding=\"EBCDIC\"?><a/>"),
            Err(Error::Encoding(_))
        ));
    }
}
