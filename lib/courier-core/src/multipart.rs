//! Multipart form data support for file uploads.
//!
//! Parameters are written first as text parts, then every [`Attachment`]
//! as a binary part, all separated by a per-request boundary.
//!
//! # Example
//!
//! ```
//! use courier_core::{Attachment, Params, multipart};
//!
//! let params = Params::new().with("a", "1");
//! let file = Attachment::new("file", "x.txt", "text/plain", "hi");
//!
//! let body = multipart::build(&params, &[file], "B");
//! assert_eq!(
//!     body.as_ref(),
//!     b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1\r\n\
//!       --B\r\nContent-Disposition: form-data; name=\"file\"; filename=\"x.txt\"\r\n\
//!       Content-Type: text/plain\r\n\r\nhi\r\n--B--"
//! );
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::{ParamValue, Params};

/// A binary file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    field_name: String,
    file_name: String,
    mime_type: String,
    data: Bytes,
}

impl Attachment {
    /// Create an attachment with an explicit MIME type.
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Create an attachment, guessing the MIME type from the file extension.
    ///
    /// Unknown extensions default to `application/octet-stream`.
    #[must_use]
    pub fn file(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name);
        Self::new(field_name, file_name, mime_type, data)
    }

    /// Form field name.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// File name sent to the server.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type of the data.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw file content.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Generate a fresh boundary of the form `Boundary-<UUID>`.
#[must_use]
pub fn generate_boundary() -> String {
    let token = uuid::Uuid::new_v4().hyphenated().to_string().to_uppercase();
    format!("Boundary-{token}")
}

/// `Content-Type` header value announcing the given boundary.
#[must_use]
pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// Serialize parameters and attachments into a multipart body.
///
/// Each scalar parameter becomes one text part; each element of a list
/// parameter becomes a `key[]` part. Attachments follow in order. The body
/// ends with `--{boundary}--` and no trailing line break.
#[must_use]
pub fn build(params: &Params, attachments: &[Attachment], boundary: &str) -> Bytes {
    let mut buf = BytesMut::new();

    for (key, value) in params.iter() {
        match value {
            ParamValue::Scalar(scalar) => {
                put_part(&mut buf, boundary, key, None, scalar.to_string().as_bytes());
            }
            ParamValue::List(items) => {
                let name = format!("{key}[]");
                for item in items {
                    put_part(&mut buf, boundary, &name, None, item.to_string().as_bytes());
                }
            }
        }
    }

    for attachment in attachments {
        put_part(
            &mut buf,
            boundary,
            &attachment.field_name,
            Some((&attachment.file_name, &attachment.mime_type)),
            &attachment.data,
        );
    }

    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"--");

    buf.freeze()
}

fn put_part(
    buf: &mut BytesMut,
    boundary: &str,
    name: &str,
    file: Option<(&str, &str)>,
    data: &[u8],
) {
    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"\r\n");

    buf.put_slice(b"Content-Disposition: form-data; name=\"");
    buf.put_slice(name.as_bytes());
    buf.put_slice(b"\"");
    if let Some((file_name, _)) = file {
        buf.put_slice(b"; filename=\"");
        buf.put_slice(file_name.as_bytes());
        buf.put_slice(b"\"");
    }
    buf.put_slice(b"\r\n");

    if let Some((_, mime_type)) = file {
        buf.put_slice(b"Content-Type: ");
        buf.put_slice(mime_type.as_bytes());
        buf.put_slice(b"\r\n");
    }

    buf.put_slice(b"\r\n");
    buf.put_slice(data);
    buf.put_slice(b"\r\n");
}
