//! Reads change requests out of posted RDF payloads.
//!
//! The payload is parsed into a graph, then every subject typed
//! `oslc_cm:ChangeRequest` is bound to a [`ChangeRequest`], following
//! `dcterms:creator` to bind its reporter as a [`Person`].

use crate::errors::{CmError, Result};
use crate::negotiate::RdfSyntax;
use crate::resources::{ChangeRequest, Person};
use oxrdf::vocab::rdf;
use oxrdf::{Graph, NamedNodeRef, Subject, SubjectRef, TermRef, Triple};
use oxrdfxml::RdfXmlParser;
use oxttl::TurtleParser;
use std::collections::HashSet;

pub mod vocab {
    use oxrdf::NamedNodeRef;

    pub const OSLC_CM_CHANGE_REQUEST: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://open-services.net/ns/cm#ChangeRequest");

    pub const DCTERMS_TITLE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/title");
    pub const DCTERMS_DESCRIPTION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/description");
    pub const DCTERMS_CREATOR: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/creator");

    pub const BUGZ_PRODUCT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.bugzilla.org/rdf#product");
    pub const BUGZ_COMPONENT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.bugzilla.org/rdf#component");
    pub const BUGZ_VERSION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.bugzilla.org/rdf#version");
    pub const BUGZ_PLATFORM: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.bugzilla.org/rdf#platform");
    pub const BUGZ_OPSYS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.bugzilla.org/rdf#opsys");
    pub const BUGZ_PRIORITY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.bugzilla.org/rdf#priority");
    pub const BUGZ_SEVERITY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.bugzilla.org/rdf#severity");

    pub const FOAF_NAME: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://xmlns.com/foaf/0.1/name");
    pub const FOAF_MBOX: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://xmlns.com/foaf/0.1/mbox");
}

use vocab::*;

/// Parses `body` and binds every change request it describes, in document order.
pub fn read_change_requests(
    body: &[u8],
    syntax: RdfSyntax,
    base_iri: &str,
) -> Result<Vec<ChangeRequest>> {
    let triples = parse_triples(body, syntax, base_iri)?;

    let mut graph = Graph::new();
    for triple in &triples {
        graph.insert(triple);
    }

    // The graph is unordered, so take the subjects from the triple stream
    let mut seen: HashSet<&Subject> = HashSet::new();
    let mut subjects: Vec<&Subject> = Vec::new();
    for triple in &triples {
        if triple.predicate.as_ref() == rdf::TYPE
            && triple.object.as_ref() == TermRef::NamedNode(OSLC_CM_CHANGE_REQUEST)
            && seen.insert(&triple.subject)
        {
            subjects.push(&triple.subject);
        }
    }

    tracing::debug!(
        triples = triples.len(),
        change_requests = subjects.len(),
        syntax = syntax.media_type(),
        "read RDF payload"
    );

    Ok(subjects
        .into_iter()
        .map(|subject| bind_change_request(&graph, subject.as_ref()))
        .collect())
}

fn parse_triples(body: &[u8], syntax: RdfSyntax, base_iri: &str) -> Result<Vec<Triple>> {
    match syntax {
        RdfSyntax::RdfXml => RdfXmlParser::new()
            .with_base_iri(base_iri)
            .map_err(|e| invalid_base_iri(base_iri, e))?
            .for_reader(body)
            .map(|triple| triple.map_err(|e| CmError::RdfParse(e.to_string())))
            .collect(),
        RdfSyntax::Turtle => TurtleParser::new()
            .with_base_iri(base_iri)
            .map_err(|e| invalid_base_iri(base_iri, e))?
            .for_reader(body)
            .map(|triple| triple.map_err(|e| CmError::RdfParse(e.to_string())))
            .collect(),
    }
}

fn invalid_base_iri(base_iri: &str, e: impl std::fmt::Display) -> CmError {
    CmError::Internal(format!("invalid base IRI {base_iri}: {e}"))
}

fn bind_change_request(graph: &Graph, subject: SubjectRef<'_>) -> ChangeRequest {
    let about = match subject {
        SubjectRef::NamedNode(node) => Some(node.as_str().to_owned()),
        _ => None,
    };

    ChangeRequest {
        about,
        title: string_value(graph, subject, DCTERMS_TITLE),
        description: string_value(graph, subject, DCTERMS_DESCRIPTION),
        product: string_value(graph, subject, BUGZ_PRODUCT),
        component: string_value(graph, subject, BUGZ_COMPONENT),
        version: string_value(graph, subject, BUGZ_VERSION),
        platform: string_value(graph, subject, BUGZ_PLATFORM),
        operating_system: string_value(graph, subject, BUGZ_OPSYS),
        priority: string_value(graph, subject, BUGZ_PRIORITY),
        severity: string_value(graph, subject, BUGZ_SEVERITY),
        reporter: graph
            .object_for_subject_predicate(subject, DCTERMS_CREATOR)
            .map(|creator| bind_person(graph, creator)),
    }
}

fn bind_person(graph: &Graph, creator: TermRef<'_>) -> Person {
    if let TermRef::Literal(name) = creator {
        return Person {
            name: Some(name.value().to_owned()),
            mbox: None,
        };
    }

    let subject = match creator {
        TermRef::NamedNode(node) => SubjectRef::NamedNode(node),
        TermRef::BlankNode(node) => SubjectRef::BlankNode(node),
        _ => return Person::default(),
    };

    Person {
        name: string_value(graph, subject, FOAF_NAME),
        mbox: string_value(graph, subject, FOAF_MBOX)
            .map(|mbox| mbox.strip_prefix("mailto:").unwrap_or(&mbox).to_owned()),
    }
}

/// First literal or IRI object of `subject predicate ?o`.
fn string_value(graph: &Graph, subject: SubjectRef<'_>, predicate: NamedNodeRef<'_>) -> Option<String> {
    graph
        .objects_for_subject_predicate(subject, predicate)
        .find_map(|object| match object {
            TermRef::Literal(literal) => Some(literal.value().to_owned()),
            TermRef::NamedNode(node) => Some(node.as_str().to_owned()),
            _ => None,
        })
}
