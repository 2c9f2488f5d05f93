//! Defines constant IRIs for the RDF terms and predicates used when reading
//! nanopublications, primarily from the RDF, RDFS, Nanopub, DCTERMS, PROV and
//! FOAF vocabularies.

// rdf
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
// rdfs
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
pub const SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
// xsd
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
// owl
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";

// nanopub structure
pub const NP_NS: &str = "http://www.nanopub.org/nschema#";
pub const NANOPUBLICATION: &str = "http://www.nanopub.org/nschema#Nanopublication";
pub const HAS_ASSERTION: &str = "http://www.nanopub.org/nschema#hasAssertion";
pub const HAS_PROVENANCE: &str = "http://www.nanopub.org/nschema#hasProvenance";
pub const HAS_PUBLICATION_INFO: &str = "http://www.nanopub.org/nschema#hasPublicationInfo";

// dcterms
pub const DCT_NS: &str = "http://purl.org/dc/terms/";
pub const CREATED: &str = "http://purl.org/dc/terms/created";
pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
pub const TITLE: &str = "http://purl.org/dc/terms/title";
pub const LICENSE: &str = "http://purl.org/dc/terms/license";
// prov
pub const PROV_NS: &str = "http://www.w3.org/ns/prov#";
pub const WAS_ATTRIBUTED_TO: &str = "http://www.w3.org/ns/prov#wasAttributedTo";
pub const WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";
pub const GENERATED_AT_TIME: &str = "http://www.w3.org/ns/prov#generatedAtTime";
// foaf
pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";
// pav
pub const PAV_NS: &str = "http://purl.org/pav/";
pub const PAV_AUTHORED_BY: &str = "http://purl.org/pav/authoredBy";
pub const PAV_CREATED_BY: &str = "http://purl.org/pav/createdBy";
// skos / schema
pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const SCHEMA_NS: &str = "https://schema.org/";
pub const SCHEMA_NAME: &str = "https://schema.org/name";

// identity registries
pub const ORCID_NS: &str = "https://orcid.org/";
pub const DOI_NS: &str = "https://doi.org/";

/// Predicates consulted, in order, when a remote document is fetched to find a
/// better label for one of its resources.
pub const REMOTE_LABEL_PREDICATES: [&str; 5] =
    [LABEL, FOAF_NAME, TITLE, SKOS_PREF_LABEL, SCHEMA_NAME];

/// Marker that opens every trusty-URI artifact code produced by this crate.
pub const TRUSTY_MODULE_RA: &str = "RA";
