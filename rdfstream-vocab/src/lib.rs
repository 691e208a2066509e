//! RDF vocabulary constants shared by the readers and writers.
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary, including the RDF/XML syntax terms
//! - `rdfs` - RDFS vocabulary
//! - `xsd` - XSD datatypes produced by the Turtle reader
//! - `xml` - the reserved `xml:` namespace and its attributes
//! - `namespaces` - namespace IRIs and their conventional prefixes

/// Namespace IRIs and conventional prefixes
pub mod namespaces {
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// RDFS namespace
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// XSD namespace
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    /// OWL namespace
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

    /// Dublin Core elements namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";

    /// Dublin Core terms namespace
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";

    /// FOAF namespace
    pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";

    /// The reserved XML namespace
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

    /// The namespace of `xmlns` declarations themselves
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

    /// Well-known (prefix, namespace) pairs, in the order writers declare them.
    pub const WELL_KNOWN: &[(&str, &str)] = &[
        ("rdf", RDF),
        ("rdfs", RDFS),
        ("xsd", XSD),
        ("owl", OWL),
        ("dc", DC),
        ("dcterms", DCTERMS),
        ("foaf", FOAF),
    ];
}

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    /// rdf:XMLLiteral IRI
    pub const XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

    /// rdf:Statement IRI (reification)
    pub const STATEMENT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement";

    /// rdf:subject IRI (reification)
    pub const SUBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#subject";

    /// rdf:predicate IRI (reification)
    pub const PREDICATE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate";

    /// rdf:object IRI (reification)
    pub const OBJECT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#object";

    /// Prefix of the container membership properties `rdf:_1`, `rdf:_2`, ...
    pub const MEMBER_PREFIX: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#_";

    /// Build the container membership property `rdf:_n`.
    pub fn member(n: u32) -> String {
        format!("{MEMBER_PREFIX}{n}")
    }

    /// Local names of the RDF/XML syntax terms.
    ///
    /// These appear as element or attribute names in RDF/XML and are
    /// matched after namespace resolution.
    pub mod syntax {
        pub const RDF: &str = "RDF";
        pub const DESCRIPTION: &str = "Description";
        pub const ABOUT: &str = "about";
        pub const RESOURCE: &str = "resource";
        pub const NODE_ID: &str = "nodeID";
        pub const ID: &str = "ID";
        pub const PARSE_TYPE: &str = "parseType";
        pub const DATATYPE: &str = "datatype";
        pub const LI: &str = "li";
        pub const TYPE: &str = "type";

        /// `rdf:parseType` values
        pub const PARSE_TYPE_RESOURCE: &str = "Resource";
        pub const PARSE_TYPE_COLLECTION: &str = "Collection";
        pub const PARSE_TYPE_LITERAL: &str = "Literal";
    }
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// rdfs:comment IRI
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

    /// rdfs:seeAlso IRI
    pub const SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// The reserved `xml:` namespace
pub mod xml {
    /// `xml:lang` local name
    pub const LANG: &str = "lang";

    /// `xml:base` local name
    pub const BASE: &str = "base";

    /// The `xml` prefix, which is always bound
    pub const PREFIX: &str = "xml";

    /// The `xmlns` attribute name used for namespace declarations
    pub const XMLNS: &str = "xmlns";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_terms_share_namespace() {
        for iri in [
            rdf::TYPE,
            rdf::FIRST,
            rdf::REST,
            rdf::NIL,
            rdf::XML_LITERAL,
            rdf::STATEMENT,
            rdf::SUBJECT,
            rdf::PREDICATE,
            rdf::OBJECT,
        ] {
            assert!(iri.starts_with(namespaces::RDF), "{iri}");
        }
    }

    #[test]
    fn test_member_property() {
        assert_eq!(
            rdf::member(3),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#_3"
        );
    }

    #[test]
    fn test_xsd_terms_share_namespace() {
        for iri in [xsd::INTEGER, xsd::DECIMAL, xsd::DOUBLE, xsd::BOOLEAN] {
            assert!(iri.starts_with(namespaces::XSD), "{iri}");
        }
    }
}
