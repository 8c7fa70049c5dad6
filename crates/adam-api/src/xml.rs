// Small helpers over `xmltree` for walking Smile documents and
// building request bodies.

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::Error;

pub(crate) fn parse(xml: &str) -> Result<Element, Error> {
    Ok(Element::parse(xml.as_bytes())?)
}

/// Direct child elements of `parent` named `name`.
pub(crate) fn elements<'a>(
    parent: &'a Element,
    name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    parent
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .filter(move |e| e.name == name)
}

/// Trimmed text of the first child element named `name`.
pub(crate) fn text(parent: &Element, name: &str) -> Option<String> {
    let text = parent.get_child(name)?.get_text()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

pub(crate) fn attr<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attributes.get(name).map(String::as_str)
}

/// Depth-first search for any descendant named `name`.
pub(crate) fn descendants<'a>(element: &'a Element, name: &str) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_descendants(element, name, &mut found);
    found
}

fn collect_descendants<'a>(element: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in element.children.iter().filter_map(XMLNode::as_element) {
        if child.name == name {
            found.push(child);
        }
        collect_descendants(child, name, found);
    }
}

// ── Body construction ───────────────────────────────────────────────

pub(crate) fn element_with_id(name: &str, id: &str) -> Element {
    let mut element = Element::new(name);
    element.attributes.insert("id".into(), id.into());
    element
}

pub(crate) fn text_node(name: &str, text: impl Into<String>) -> XMLNode {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.into()));
    XMLNode::Element(element)
}

pub(crate) fn cdata_node(name: &str, text: impl Into<String>) -> XMLNode {
    let mut element = Element::new(name);
    element.children.push(XMLNode::CData(text.into()));
    XMLNode::Element(element)
}

/// Serialize without the `<?xml ...?>` declaration, which the gateway
/// does not expect on PUT bodies.
pub(crate) fn to_string(element: &Element) -> Result<String, Error> {
    let mut buf = Vec::new();
    element.write_with_config(
        &mut buf,
        EmitterConfig::new().write_document_declaration(false),
    )?;
    String::from_utf8(buf).map_err(|e| Error::Xml(e.to_string()))
}
