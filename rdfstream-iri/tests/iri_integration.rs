//! Public-API tests for IRI resolution, normalization and IDNA.

use pretty_assertions::assert_eq;
use rdfstream_iri::{idna, normalize_path, Iri, Scheme, SchemeKind, SchemeRegistry};

#[test]
fn resolution_against_rfc3986_base() {
    let base = Iri::parse("http://a/b/c/d;p?q").unwrap();
    let cases = [
        ("g", "http://a/b/c/g"),
        ("../g", "http://a/b/g"),
        ("", "http://a/b/c/d;p?q"),
        ("#s", "http://a/b/c/d;p?q#s"),
    ];
    for (reference, expected) in cases {
        assert_eq!(
            base.resolve_str(reference).unwrap().to_string(),
            expected,
            "reference {reference:?}"
        );
    }
}

#[test]
fn path_normalization() {
    assert_eq!(normalize_path("/a/b/../c"), "/a/c");
    assert_eq!(normalize_path("/./a"), "/a");
}

#[test]
fn same_document_reference_keeps_base() {
    let base = Iri::parse("http://example.org/doc#x").unwrap();
    let resolved = base.resolve_str("#x").unwrap();
    assert_eq!(resolved, base);
}

#[test]
fn idna_round_trip_for_ascii_hosts() {
    let hosts = [
        "example.org",
        "WWW.Example.ORG",
        "xn--bcher-kva.example",
        "xn--mnchen-3ya.de",
        "a-b.c-d.example",
        "localhost",
    ];
    for host in hosts {
        assert_eq!(
            idna::to_ascii(&idna::to_unicode(host)),
            idna::to_ascii(host),
            "host {host}"
        );
    }
}

#[test]
fn custom_scheme_registration() {
    let mut registry = SchemeRegistry::default();
    registry.register(Scheme::new("gopher", Some(70), SchemeKind::Http));
    let iri = Iri::parse("gopher://Example.org:70/1/../x").unwrap();
    assert_eq!(iri.normalize(&registry).to_string(), "gopher://example.org/x");

    // without the registration only generic normalization applies
    let plain = SchemeRegistry::default();
    assert_eq!(
        iri.normalize(&plain).to_string(),
        "gopher://Example.org:70/x"
    );
}

#[test]
fn ascii_string_is_uri_legal() {
    // a space is not IRI-legal, so go through the builder
    assert!(Iri::parse("http://ü.example/ä b?c").is_err());
    let iri = Iri::builder()
        .scheme("http")
        .host("ü.example")
        .path("/ä b")
        .query("c")
        .build()
        .unwrap();
    let ascii = iri.to_ascii_string();
    assert!(ascii.is_ascii(), "{ascii}");
    assert!(!ascii.contains(' '), "{ascii}");
    assert_eq!(ascii, "http://xn--tda.example/%C3%A4%20b?c");
}
