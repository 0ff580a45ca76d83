//! HTTP method types.

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[display("GET")]
    Get,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
}

impl Method {
    /// Returns `true` if parameters travel in the URL query string
    /// instead of the body.
    ///
    /// Only `GET` behaves this way; `DELETE` encodes its parameters in the
    /// body like the other verbs.
    #[must_use]
    pub const fn is_no_body(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn method_display() {
        check!(Method::Get.to_string() == "GET");
        check!(Method::Post.to_string() == "POST");
        check!(Method::Put.to_string() == "PUT");
        check!(Method::Patch.to_string() == "PATCH");
        check!(Method::Delete.to_string() == "DELETE");
    }

    #[test]
    fn only_get_is_no_body() {
        check!(Method::Get.is_no_body());
        check!(!Method::Post.is_no_body());
        check!(!Method::Put.is_no_body());
        check!(!Method::Patch.is_no_body());
        check!(!Method::Delete.is_no_body());
    }

    #[test]
    fn converts_to_http_method() {
        check!(http::Method::from(Method::Patch) == http::Method::PATCH);
        check!(http::Method::from(Method::Delete) == http::Method::DELETE);
    }
}
