//! Bytecode related types and placeholder substitution for unlinked libraries

use crate::{
    artifacts::serde_helpers,
    error::{Result, SolcError},
    utils,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of every library placeholder written into unlinked bytecode
pub const LIBRARY_PLACEHOLDER_PREFIX: &str = "__";

/// The number of bytes an address occupies in bytecode, solc reserves this many bytes for every
/// unlinked library
pub const ADDRESS_BYTES: usize = 20;

/// `file -> (library name -> offsets)` as emitted by solc
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<Offsets>>>;

/// Byte offsets into the bytecode.
/// Linking replaces the 20 bytes located there.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Offsets {
    pub start: u32,
    pub length: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bytecode {
    /// The bytecode as a hex string, without `0x` prefix.
    #[serde(default)]
    pub object: String,
    /// The source mapping as a string. See the source mapping definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    /// If given, this is an unlinked object.
    #[serde(default, deserialize_with = "serde_helpers::default_for_null")]
    pub link_references: LinkReferences,
}

impl Bytecode {
    /// Returns all link references of this object flattened into single slots
    pub fn link_reference_slots(&self) -> Vec<LinkReference<'_>> {
        flatten_link_references(&self.link_references)
    }

    /// Returns the `0x` prefixed bytecode with a readable placeholder in every unlinked slot.
    ///
    /// See [`link_placeholders`]
    pub fn resolve(&self) -> Result<String> {
        link_placeholders(&self.object, self.link_reference_slots())
    }
}

/// A single library slot in the bytecode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkReference<'a> {
    /// Name of the library whose address belongs into this slot
    pub library: &'a str,
    /// Byte offset of the slot
    pub offset: usize,
    /// Width of the slot in bytes
    pub length: usize,
}

/// Flattens the `file -> library -> offsets` structure solc emits into one entry per slot.
///
/// The file the library was defined in is dropped, placeholders only carry the library name.
pub fn flatten_link_references(references: &LinkReferences) -> Vec<LinkReference<'_>> {
    references
        .values()
        .flat_map(|libraries| {
            libraries.iter().flat_map(|(library, offsets)| {
                offsets.iter().map(move |offset| LinkReference {
                    library: library.as_str(),
                    offset: offset.start as usize,
                    length: offset.length as usize,
                })
            })
        })
        .collect()
}

/// Returns the placeholder for the given library that fits a slot of `width` hex characters:
/// `__` followed by the library name, truncated to fit and right padded with `_`.
///
/// ```
/// use solbridge_solc::artifacts::bytecode::library_placeholder;
/// assert_eq!(library_placeholder("MathLib", 40), format!("__MathLib{}", "_".repeat(31)));
/// ```
pub fn library_placeholder(library: &str, width: usize) -> String {
    let mut placeholder = format!("{}{}", LIBRARY_PLACEHOLDER_PREFIX, library);
    if placeholder.len() > width {
        let mut end = width;
        while !placeholder.is_char_boundary(end) {
            end -= 1;
        }
        placeholder.truncate(end);
    }
    while placeholder.len() < width {
        placeholder.push('_');
    }
    placeholder
}

/// Writes a library placeholder into every referenced slot of the (unprefixed or `0x` prefixed)
/// hex bytecode and returns it with a `0x` prefix.
///
/// Every slot is replaced in place with a placeholder of exactly the slot's width, so the
/// bytecode keeps its length and offsets stay valid regardless of the order the references are
/// applied in.
pub fn link_placeholders<'a, I>(bytecode: &str, references: I) -> Result<String>
where
    I: IntoIterator<Item = LinkReference<'a>>,
{
    let mut object = utils::strip_hex_prefix(bytecode).to_string();
    for reference in references {
        splice_placeholder(&mut object, reference)?;
    }
    Ok(format!("0x{}", object))
}

fn splice_placeholder(object: &mut String, reference: LinkReference<'_>) -> Result<()> {
    let invalid = || SolcError::InvalidLinkReference {
        library: reference.library.to_string(),
        offset: reference.offset,
        length: reference.length,
        bytecode_len: object.len(),
    };
    let start = reference.offset.checked_mul(2).ok_or_else(invalid)?;
    let width = reference.length.checked_mul(2).ok_or_else(invalid)?;
    let end = start.checked_add(width).ok_or_else(invalid)?;
    if end > object.len() || !object.is_char_boundary(start) || !object.is_char_boundary(end) {
        return Err(invalid())
    }
    tracing::trace!(
        library = reference.library,
        offset = reference.offset,
        "writing library placeholder"
    );
    object.replace_range(start..end, &library_placeholder(reference.library, width));
    Ok(())
}
