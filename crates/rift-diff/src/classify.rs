//! Binary/text classification.
//!
//! Classification runs in two stages. [`by_attributes`] uses only metadata:
//! recorded sizes, the force-text option and the `diff` path attribute.
//! When that leaves the delta undecided, [`by_content`] sniffs the loaded
//! regions for a NUL byte. A side that has been resolved is never
//! re-derived.

use tracing::debug;

use crate::attr::{AttrValue, DIFF_ATTR};
use crate::delta::{BinaryState, Delta, FileDescriptor};
use crate::error::DiffResult;
use crate::loader::fits_in_memory;
use crate::options::DiffOptions;
use crate::repo::Repository;

/// How many leading bytes of a region the content sniff inspects.
pub const SNIFF_LEN: usize = 4000;

/// Classify content by looking for a NUL in its first [`SNIFF_LEN`] bytes.
pub fn sniff(content: &[u8]) -> BinaryState {
    let prefix = &content[..content.len().min(SNIFF_LEN)];
    if prefix.contains(&0) {
        BinaryState::Binary
    } else {
        BinaryState::Text
    }
}

/// Stage one: decide from sizes, options and path attributes.
pub fn by_attributes(
    delta: &mut Delta,
    options: &DiffOptions,
    repo: &Repository,
) -> DiffResult<()> {
    if delta.binary.is_resolved() {
        return Ok(());
    }

    if !fits_in_memory(delta.old.size) || !fits_in_memory(delta.new.size) {
        delta.old.mark(BinaryState::Binary);
        delta.new.mark(BinaryState::Binary);
        delta.binary = BinaryState::Binary;
        debug!(path = %delta.new.path, "size exceeds address space, treating as binary");
        return Ok(());
    }

    if options.force_text {
        delta.old.mark(BinaryState::Text);
        delta.new.mark(BinaryState::Text);
        delta.binary = BinaryState::Text;
        return Ok(());
    }

    apply_attribute(&mut delta.old, repo)?;
    if delta.same_path() {
        if delta.old.binary.is_resolved() {
            let state = delta.old.binary;
            delta.new.mark(state);
        }
    } else {
        apply_attribute(&mut delta.new, repo)?;
    }

    resolve(delta);
    if delta.binary.is_resolved() {
        debug!(path = %delta.new.path, binary = ?delta.binary, "classified by attribute");
    }
    Ok(())
}

/// Stage two: sniff whichever sides are still undecided.
pub fn by_content(delta: &mut Delta, old: &[u8], new: &[u8]) {
    if !delta.old.binary.is_resolved() {
        delta.old.binary = sniff(old);
    }
    if !delta.new.binary.is_resolved() {
        delta.new.binary = sniff(new);
    }
    resolve(delta);
    debug!(path = %delta.new.path, binary = ?delta.binary, "classified by content");
}

/// Derive the delta's state from its sides: binary wins over text, text
/// wins over unknown.
pub fn resolve(delta: &mut Delta) {
    let sides = [delta.old.binary, delta.new.binary];
    delta.binary = if sides.contains(&BinaryState::Binary) {
        BinaryState::Binary
    } else if sides.contains(&BinaryState::Text) {
        BinaryState::Text
    } else {
        BinaryState::Unknown
    };
}

fn apply_attribute(side: &mut FileDescriptor, repo: &Repository) -> DiffResult<()> {
    match repo.attribute(&side.path, DIFF_ATTR)? {
        AttrValue::False => side.mark(BinaryState::Binary),
        AttrValue::True => side.mark(BinaryState::Text),
        AttrValue::Unspecified | AttrValue::Value(_) => {}
    }
    Ok(())
}
