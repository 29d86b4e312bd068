//! ODF constants: MIME types, package part paths, namespaces.

use phf::{Map, phf_map};

/// ODF specification version written into document roots.
pub const OFFICE_VERSION: &str = "1.3";

/// MIME type for OpenDocument Spreadsheet (.ods)
pub const ODF_SPREADSHEET: &str = "application/vnd.oasis.opendocument.spreadsheet";

/// MIME type for OpenDocument Spreadsheet Template (.ots)
pub const ODF_SPREADSHEET_TEMPLATE: &str =
    "application/vnd.oasis.opendocument.spreadsheet-template";

/// Standard package part: document content
pub const CONTENT_PATH: &str = "content.xml";

/// Standard package part: document styles
pub const STYLES_PATH: &str = "styles.xml";

/// Standard package part: document metadata
pub const META_PATH: &str = "meta.xml";

/// Standard package part: manifest
pub const MANIFEST_PATH: &str = "META-INF/manifest.xml";

/// Standard package part: MIME type marker (first, uncompressed)
pub const MIMETYPE_PATH: &str = "mimetype";

/// File extension to MIME type mapping for the formats this crate handles.
pub static EXTENSION_MIME_TYPES: Map<&'static str, &'static str> = phf_map! {
    "ods" => ODF_SPREADSHEET,
    "ots" => ODF_SPREADSHEET_TEMPLATE,
};

/// Namespace declarations emitted on document roots. Order is stable so
/// serialized documents diff cleanly.
pub const NAMESPACES: &[(&str, &str)] = &[
    ("xmlns:office", "urn:oasis:names:tc:opendocument:xmlns:office:1.0"),
    ("xmlns:style", "urn:oasis:names:tc:opendocument:xmlns:style:1.0"),
    ("xmlns:text", "urn:oasis:names:tc:opendocument:xmlns:text:1.0"),
    ("xmlns:table", "urn:oasis:names:tc:opendocument:xmlns:table:1.0"),
    ("xmlns:fo", "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0"),
    ("xmlns:number", "urn:oasis:names:tc:opendocument:xmlns:datastyle:1.0"),
    ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
    ("xmlns:meta", "urn:oasis:names:tc:opendocument:xmlns:meta:1.0"),
    ("xmlns:of", "urn:oasis:names:tc:opendocument:xmlns:of:1.2"),
    ("xmlns:xlink", "http://www.w3.org/1999/xlink"),
    (
        "xmlns:calcext",
        "urn:org:documentfoundation:names:experimental:calc:xmlns:calcext:1.0",
    ),
];

/// Check whether a MIME type denotes a spreadsheet document this crate
/// can open.
pub fn is_spreadsheet_mimetype(mimetype: &str) -> bool {
    mimetype == ODF_SPREADSHEET || mimetype == ODF_SPREADSHEET_TEMPLATE
}
