//! Component-wise IRI construction.

use crate::chars::{self, Profile};
use crate::error::{IriError, Result};
use crate::iri::{split_authority, Iri};

/// Builder assembling an [`Iri`] from discrete components.
///
/// The authority is synthesized from userinfo, host and port when not set
/// directly; a directly set authority is split into those parts when none
/// of them were given. Setting a scheme-specific part builds an opaque IRI.
///
/// ```
/// use rdfstream_iri::Iri;
///
/// let iri = Iri::builder()
///     .scheme("http")
///     .host("example.org")
///     .port(8080)
///     .path("/a")
///     .query("x=1")
///     .build()
///     .unwrap();
/// assert_eq!(iri.to_string(), "http://example.org:8080/a?x=1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct IriBuilder {
    scheme: Option<String>,
    scheme_specific_part: Option<String>,
    authority: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl IriBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Make the result opaque with this scheme-specific part.
    pub fn scheme_specific_part(mut self, ssp: impl Into<String>) -> Self {
        self.scheme_specific_part = Some(ssp.into());
        self
    }

    /// Set scheme and path from a compact `scheme:path` string.
    ///
    /// Without a colon the whole input becomes the path.
    pub fn curie(mut self, scheme_and_path: &str) -> Self {
        match scheme_and_path.find(':') {
            Some(pos) if pos > 0 => {
                self.scheme = Some(scheme_and_path[..pos].to_string());
                self.path = Some(scheme_and_path[pos + 1..].to_string());
            }
            _ => {
                self.scheme = None;
                self.path = Some(scheme_and_path.to_string());
            }
        }
        self
    }

    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn user_info(mut self, user_info: impl Into<String>) -> Self {
        self.user_info = Some(user_info.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Assemble the IRI. Only the scheme and an explicit authority are
    /// checked; other components are taken as given.
    pub fn build(self) -> Result<Iri> {
        if let Some(ssp) = &self.scheme_specific_part {
            let scheme = self
                .scheme
                .as_deref()
                .ok_or_else(|| IriError::MissingScheme(ssp.clone()))?;
            return Iri::opaque(scheme, ssp, self.fragment.as_deref());
        }
        chars::verify(self.scheme.as_deref(), Profile::Scheme)?;

        let (mut user_info, mut host, mut port) =
            (self.user_info.as_deref(), self.host.as_deref(), self.port);
        if let Some(authority) = self.authority.as_deref() {
            if user_info.is_none() && host.is_none() && port.is_none() {
                let (ui, h, p) = split_authority(authority)?;
                user_info = ui;
                host = Some(h);
                port = p;
            }
        }

        Ok(Iri::from_components(
            self.scheme.as_deref(),
            self.authority.as_deref(),
            user_info,
            host,
            port,
            self.path.as_deref(),
            self.query.as_deref(),
            self.fragment.as_deref(),
        ))
    }
}
