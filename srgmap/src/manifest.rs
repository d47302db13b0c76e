use tracing::debug;

const DIGEST_ATTR: &str = "SHA-256-Digest";

/// Strip signature digests from a jar manifest.
///
/// The main-attributes section is copied through with its content intact.
/// Every per-entry section loses any attribute named `SHA-256-Digest`
/// (case-insensitive); a section whose attributes all vanish is dropped
/// entirely. Output is written the way `java.util.jar.Manifest` writes it:
/// CRLF line endings, a space-prefixed continuation every 72 bytes, one
/// blank line after each section.
pub fn strip_manifest(data: &[u8]) -> Vec<u8> {
    let manifest = Manifest::parse(data);
    let mut out = Manifest {
        main: manifest.main,
        entries: Vec::new(),
    };

    for (name, attrs) in manifest.entries {
        let kept: Vec<(String, String)> = attrs
            .into_iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case(DIGEST_ATTR))
            .collect();
        if kept.is_empty() {
            debug!("dropping emptied manifest entry {}", name);
            continue;
        }
        out.entries.push((name, kept));
    }

    out.write()
}

/// Parsed manifest: the main attributes plus named per-entry sections, in
/// source order.
struct Manifest {
    main: Vec<(String, String)>,
    entries: Vec<(String, Vec<(String, String)>)>,
}

impl Manifest {
    /// Lenient line-oriented parse: continuation lines (leading space) are
    /// unfolded, lines without a colon are skipped.
    fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);

        // Unfold into logical lines, keeping blank lines as section breaks.
        let mut logical: Vec<String> = Vec::new();
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix(' ') {
                if let Some(last) = logical.last_mut() {
                    if !last.is_empty() {
                        last.push_str(rest);
                        continue;
                    }
                }
            }
            logical.push(line.to_string());
        }

        let mut sections: Vec<Vec<(String, String)>> = Vec::new();
        let mut current: Vec<(String, String)> = Vec::new();
        let mut seen_any = false;
        for line in logical {
            if line.is_empty() {
                if seen_any {
                    sections.push(std::mem::take(&mut current));
                    seen_any = false;
                }
                continue;
            }
            seen_any = true;
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            current.push((key.trim().to_string(), value.trim_start().to_string()));
        }
        if seen_any {
            sections.push(current);
        }

        let mut iter = sections.into_iter();
        let main = iter.next().unwrap_or_default();
        let mut entries = Vec::new();
        for section in iter {
            let mut name = None;
            let mut attrs = Vec::new();
            for (key, value) in section {
                if name.is_none() && key.eq_ignore_ascii_case("Name") {
                    name = Some(value);
                } else {
                    attrs.push((key, value));
                }
            }
            // A section with no Name header belongs to no entry; skip it.
            if let Some(name) = name {
                entries.push((name, attrs));
            }
        }

        Manifest { main, entries }
    }

    fn write(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in &self.main {
            write_attribute(&mut out, key, value);
        }
        out.extend_from_slice(b"\r\n");
        for (name, attrs) in &self.entries {
            write_attribute(&mut out, "Name", name);
            for (key, value) in attrs {
                write_attribute(&mut out, key, value);
            }
            out.extend_from_slice(b"\r\n");
        }
        out
    }
}

/// `Key: Value` with the 72-byte fold `java.util.jar.Manifest` applies.
fn write_attribute(out: &mut Vec<u8>, key: &str, value: &str) {
    let line = format!("{key}: {value}");
    let bytes = line.as_bytes();
    let mut pos = 0;
    let mut first = true;
    while pos < bytes.len() {
        let width = if first { 72 } else { 71 };
        let end = (pos + width).min(bytes.len());
        if !first {
            out.push(b' ');
        }
        out.extend_from_slice(&bytes[pos..end]);
        out.extend_from_slice(b"\r\n");
        pos = end;
        first = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(text: &str) -> Vec<u8> {
        text.replace('\n', "\r\n").into_bytes()
    }

    #[test]
    fn digest_attribute_is_removed_case_insensitively() {
        let input = manifest(
            "Manifest-Version: 1.0\n\
             \n\
             Name: com/example/Widget.class\n\
             sha-256-digest: AAAA\n\
             Implementation-Version: 1.0\n\
             \n",
        );
        let out = String::from_utf8(strip_manifest(&input)).unwrap();
        assert!(!out.to_lowercase().contains("sha-256-digest"));
        assert!(out.contains("Implementation-Version: 1.0"));
        assert!(out.contains("Name: com/example/Widget.class"));
    }

    #[test]
    fn entry_left_empty_is_dropped() {
        let input = manifest(
            "Manifest-Version: 1.0\n\
             \n\
             Name: com/example/Widget.class\n\
             SHA-256-Digest: AAAA\n\
             \n\
             Name: com/example/Other.class\n\
             SHA-256-Digest: BBBB\n\
             Implementation-Title: other\n\
             \n",
        );
        let out = String::from_utf8(strip_manifest(&input)).unwrap();
        assert!(!out.contains("Widget.class"));
        assert!(out.contains("Name: com/example/Other.class"));
        assert!(out.contains("Implementation-Title: other"));
    }

    #[test]
    fn main_attributes_are_kept_verbatim() {
        let input = manifest(
            "Manifest-Version: 1.0\n\
             SHA-256-Digest: not-an-entry-digest\n\
             Created-By: javac\n\
             \n",
        );
        let out = String::from_utf8(strip_manifest(&input)).unwrap();
        // Only per-entry digests are stripped; main attrs are untouched.
        assert!(out.contains("SHA-256-Digest: not-an-entry-digest"));
        assert!(out.contains("Created-By: javac"));
    }

    #[test]
    fn continuation_lines_are_unfolded() {
        let input = manifest(
            "Manifest-Version: 1.0\n\
             \n\
             Name: com/example/averyveryveryveryveryverylong/pack\n age/Widget.class\n\
             SHA-256-Digest: AAAA\n\
             Implementation-Version: 2\n\
             \n",
        );
        let out = String::from_utf8(strip_manifest(&input)).unwrap();
        let unfolded = out.replace("\r\n ", "");
        assert!(unfolded.contains("com/example/averyveryveryveryveryverylong/package/Widget.class"));
        assert!(!out.contains("SHA-256-Digest"));
    }

    #[test]
    fn long_lines_are_folded_at_72_bytes() {
        let long_name = "x".repeat(100);
        let input = manifest(&format!(
            "Manifest-Version: 1.0\n\nName: {long_name}\nImplementation-Version: 1\n\n"
        ));
        let out = strip_manifest(&input);
        for line in out.split(|&b| b == b'\n') {
            assert!(line.len() <= 73, "physical line too long: {}", line.len());
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.replace("\r\n ", "").contains(&long_name));
    }

    #[test]
    fn plain_lf_input_is_accepted() {
        let input = b"Manifest-Version: 1.0\n\nName: a\nSHA-256-Digest: Z\nFoo: bar\n\n".to_vec();
        let out = String::from_utf8(strip_manifest(&input)).unwrap();
        assert!(out.contains("Foo: bar"));
        assert!(!out.contains("SHA-256-Digest"));
    }
}
