//! Minimal XML property-list writer.
//!
//! Playground books describe themselves with `Manifest.plist` files at the
//! book, chapter, and page level. Only the three value kinds those manifests
//! use are supported: strings, arrays, and dictionaries. Dictionary keys keep
//! insertion order so repeated renders produce byte-identical files.

use quick_xml::escape::escape;
use std::fs;
use std::io;
use std::path::Path;

const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">\n",
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plist {
    String(String),
    Array(Vec<Plist>),
    Dict(Vec<(String, Plist)>),
}

impl Plist {
    pub fn string(value: impl Into<String>) -> Self {
        Plist::String(value.into())
    }

    /// Build an array of strings.
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Plist::Array(values.into_iter().map(Plist::string).collect())
    }

    /// Render a complete plist document, header and trailing newline included.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(HEADER);
        self.write_value(&mut out, 0);
        out.push_str("</plist>\n");
        out
    }

    fn write_value(&self, out: &mut String, depth: usize) {
        let pad = "\t".repeat(depth);
        match self {
            Plist::String(s) => {
                out.push_str(&format!("{pad}<string>{}</string>\n", escape(s.as_str())));
            }
            Plist::Array(items) if items.is_empty() => {
                out.push_str(&format!("{pad}<array/>\n"));
            }
            Plist::Array(items) => {
                out.push_str(&format!("{pad}<array>\n"));
                for item in items {
                    item.write_value(out, depth + 1);
                }
                out.push_str(&format!("{pad}</array>\n"));
            }
            Plist::Dict(entries) if entries.is_empty() => {
                out.push_str(&format!("{pad}<dict/>\n"));
            }
            Plist::Dict(entries) => {
                out.push_str(&format!("{pad}<dict>\n"));
                for (key, value) in entries {
                    out.push_str(&format!("{pad}\t<key>{}</key>\n", escape(key.as_str())));
                    value.write_value(out, depth + 1);
                }
                out.push_str(&format!("{pad}</dict>\n"));
            }
        }
    }
}

/// Write a plist document to `path`, replacing any existing file.
pub fn write_plist(path: &Path, value: &Plist) -> io::Result<()> {
    fs::write(path, value.to_xml())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_renders_keys_in_insertion_order() {
        let plist = Plist::Dict(vec![
            ("Version".into(), Plist::string("1.0")),
            ("Name".into(), Plist::string("Intro")),
        ]);
        let xml = plist.to_xml();
        let version = xml.find("<key>Version</key>").unwrap();
        let name = xml.find("<key>Name</key>").unwrap();
        assert!(version < name);
        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.ends_with("</plist>\n"));
    }

    #[test]
    fn strings_are_escaped() {
        let xml = Plist::string("Fish & <Chips>").to_xml();
        assert!(xml.contains("<string>Fish &amp; &lt;Chips&gt;</string>"));
    }

    #[test]
    fn nested_values_are_indented() {
        let plist = Plist::Dict(vec![("Pages".into(), Plist::strings(["A", "B"]))]);
        let xml = plist.to_xml();
        assert!(xml.contains("<dict>\n\t<key>Pages</key>\n\t<array>\n\t\t<string>A</string>\n"));
    }

    #[test]
    fn empty_containers_are_self_closing() {
        assert!(Plist::Array(vec![]).to_xml().contains("<array/>"));
        assert!(Plist::Dict(vec![]).to_xml().contains("<dict/>"));
    }
}
