//! Fixed-width identifier generation with optional embedded external ids.
//!
//! Every element id written into `content.xml` and `styles.xml` comes from an
//! [`IdGenerator`]. Mind-map editors keep ids they do not understand, so an id
//! produced with an external identifier carries that identifier through
//! third-party edits and [`qualify_id`] recovers it afterwards.
//!
//! Two layouts share the same total width (26 by default):
//!
//! ```text
//! plain:    bfbf 0000000000000000000042
//! embedded: afaf 05 0007 00000000000 ab-12
//!           |    |  |    |           `- external id, verbatim
//!           |    |  |    `- zero padding
//!           |    |  `- rotating counter (mod 10000)
//!           |    `- external id length in bytes
//!           `- prefix
//! ```
//!
//! Recovery only looks at the prefix, the length field and the trailing
//! bytes; the rotating counter merely makes accidental collisions between
//! ids embedding the same external id less likely.

use crate::common::{Error, Result};

/// Prefix of ids that embed an external identifier.
pub const EMBEDDED_PREFIX: &str = "afaf";
/// Prefix of ids without an embedded identifier.
pub const PLAIN_PREFIX: &str = "bfbf";
/// Default total id width.
pub const DEFAULT_ID_LENGTH: usize = 26;

const LENGTH_FIELD_WIDTH: usize = 2;
const COUNTER_FIELD_WIDTH: usize = 4;
const EMBEDDED_COUNTER_MODULUS: u16 = 10_000;
const EMBEDDED_HEADER_WIDTH: usize =
    EMBEDDED_PREFIX.len() + LENGTH_FIELD_WIDTH + COUNTER_FIELD_WIDTH;

/// Allocates fixed-width ids for one document.
///
/// Each [`Document`](crate::xmind::Document) owns its own generator, so id
/// streams of independent documents never interfere.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    length: usize,
    plain_counter: u64,
    embedded_counter: u16,
}

impl IdGenerator {
    /// Create a generator producing ids of [`DEFAULT_ID_LENGTH`] characters.
    pub fn new() -> Self {
        Self::with_length(DEFAULT_ID_LENGTH)
    }

    /// Create a generator producing ids of `length` bytes.
    ///
    /// Lengths shorter than the embedded header simply make every embedding
    /// attempt fail with [`Error::ExternalIdTooLong`].
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            plain_counter: 0,
            embedded_counter: 0,
        }
    }

    /// Total width of every generated id.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Maximum byte length of an external id that can still be embedded.
    pub fn embedded_capacity(&self) -> usize {
        self.length
            .saturating_sub(EMBEDDED_HEADER_WIDTH)
            .min(10usize.pow(LENGTH_FIELD_WIDTH as u32) - 1)
    }

    /// Allocate the next id, embedding `external` when given.
    ///
    /// # Errors
    ///
    /// - [`Error::IdCapacity`] when the plain counter outgrows the id width
    /// - [`Error::ExternalIdTooLong`] when `external` cannot be embedded
    ///
    /// # Examples
    ///
    /// ```
    /// use loquat::common::id::{IdGenerator, qualify_id};
    ///
    /// let mut ids = IdGenerator::new();
    /// let plain = ids.next_id(None).unwrap();
    /// assert_eq!(plain, "bfbf0000000000000000000001");
    ///
    /// let embedded = ids.next_id(Some("task-17")).unwrap();
    /// assert_eq!(embedded.len(), 26);
    /// assert_eq!(qualify_id(&embedded), Some("task-17"));
    /// ```
    pub fn next_id(&mut self, external: Option<&str>) -> Result<String> {
        let id = match external {
            None => self.next_plain()?,
            Some(external) => self.next_embedded(external)?,
        };
        tracing::trace!(%id, "allocated id");
        Ok(id)
    }

    fn next_plain(&mut self) -> Result<String> {
        let width = self.length.saturating_sub(PLAIN_PREFIX.len());
        let counter = self.plain_counter.checked_add(1).ok_or(Error::IdCapacity {
            counter: self.plain_counter,
            width,
        })?;

        let mut digits = itoa::Buffer::new();
        let digits = digits.format(counter);
        if digits.len() > width {
            return Err(Error::IdCapacity { counter, width });
        }
        self.plain_counter = counter;

        let mut id = String::with_capacity(self.length);
        id.push_str(PLAIN_PREFIX);
        pad_zeros(&mut id, width - digits.len());
        id.push_str(digits);
        Ok(id)
    }

    fn next_embedded(&mut self, external: &str) -> Result<String> {
        let max = self.embedded_capacity();
        if external.len() > max || self.length < EMBEDDED_HEADER_WIDTH {
            return Err(Error::ExternalIdTooLong {
                external_id: external.to_string(),
                max,
            });
        }

        self.embedded_counter = (self.embedded_counter + 1) % EMBEDDED_COUNTER_MODULUS;

        let mut id = String::with_capacity(self.length);
        id.push_str(EMBEDDED_PREFIX);
        push_padded(&mut id, external.len() as u64, LENGTH_FIELD_WIDTH);
        push_padded(&mut id, u64::from(self.embedded_counter), COUNTER_FIELD_WIDTH);
        pad_zeros(&mut id, self.length - EMBEDDED_HEADER_WIDTH - external.len());
        id.push_str(external);
        Ok(id)
    }

    /// Record an id found in an existing document.
    ///
    /// Plain ids of this generator's width advance the counter past their
    /// value so that later allocations cannot collide with them. Any other id
    /// is ignored.
    pub fn observe(&mut self, id: &str) {
        if id.len() != self.length {
            return;
        }
        let Some(digits) = id.strip_prefix(PLAIN_PREFIX) else {
            return;
        };
        if let Ok(value) = digits.parse::<u64>() {
            self.plain_counter = self.plain_counter.max(value);
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn pad_zeros(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n('0', count));
}

fn push_padded(out: &mut String, value: u64, width: usize) {
    let mut buffer = itoa::Buffer::new();
    let digits = buffer.format(value);
    pad_zeros(out, width.saturating_sub(digits.len()));
    out.push_str(digits);
}

/// Return the external id embedded in `id`, if any.
///
/// Only ids carrying the embedded prefix qualify; the external id is cut from
/// the end of `id` using the encoded length field.
///
/// ```
/// use loquat::common::id::qualify_id;
///
/// assert_eq!(qualify_id("afaf0300420000000000000abc"), Some("abc"));
/// assert_eq!(qualify_id("bfbf0000000000000000000001"), None);
/// ```
pub fn qualify_id(id: &str) -> Option<&str> {
    let rest = id.strip_prefix(EMBEDDED_PREFIX)?;
    let length_field = rest.get(..LENGTH_FIELD_WIDTH)?;
    if !length_field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let length: usize = length_field.parse().ok()?;
    if id.len() < EMBEDDED_HEADER_WIDTH + length {
        return None;
    }
    id.get(id.len() - length..)
}

/// Canonical cross-reference key of `id`.
///
/// The embedded external id when present, otherwise the id itself with
/// leading zeros stripped.
///
/// ```
/// use loquat::common::id::unique_id;
///
/// assert_eq!(unique_id("afaf0300420000000000000abc"), "abc");
/// assert_eq!(unique_id("00017"), "17");
/// ```
pub fn unique_id(id: &str) -> &str {
    match qualify_id(id) {
        Some(external) => external,
        None => id.trim_start_matches('0'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_plain_ids_have_fixed_width() {
        let mut ids = IdGenerator::new();
        let first = ids.next_id(None).unwrap();
        let second = ids.next_id(None).unwrap();
        assert_eq!(first, "bfbf0000000000000000000001");
        assert_eq!(second, "bfbf0000000000000000000002");
        assert_eq!(qualify_id(&first), None);
    }

    #[test]
    fn test_embed_recover() {
        let mut ids = IdGenerator::new();
        for external in ["1", "2", "WiCkqHbUtLpLxZkF", "J9nZh0Q7JdMxHTOF", "0Bzor4BbX9rtoQZO"] {
            let id = ids.next_id(Some(external)).unwrap();
            assert_eq!(id.len(), DEFAULT_ID_LENGTH);
            assert_eq!(qualify_id(&id), Some(external));
            assert_eq!(unique_id(&id), external);
        }
    }

    #[test]
    fn test_embedded_layout() {
        let mut ids = IdGenerator::new();
        let id = ids.next_id(Some("abc")).unwrap();
        assert_eq!(id, "afaf0300010000000000000abc");
    }

    #[test]
    fn test_empty_external_id_round_trips() {
        let mut ids = IdGenerator::new();
        let id = ids.next_id(Some("")).unwrap();
        assert_eq!(qualify_id(&id), Some(""));
    }

    #[test]
    fn test_external_id_too_long() {
        let mut ids = IdGenerator::new();
        let err = ids.next_id(Some("12345678901234567")).unwrap_err();
        assert!(matches!(err, Error::ExternalIdTooLong { max: 16, .. }));
    }

    #[test]
    fn test_plain_capacity_exhausted() {
        let mut ids = IdGenerator::with_length(6);
        for _ in 0..99 {
            ids.next_id(None).unwrap();
        }
        let err = ids.next_id(None).unwrap_err();
        assert!(matches!(err, Error::IdCapacity { counter: 100, width: 2 }));
    }

    #[test]
    fn test_embedded_counter_wraps() {
        let mut ids = IdGenerator::new();
        for _ in 0..EMBEDDED_COUNTER_MODULUS + 5 {
            let id = ids.next_id(Some("x")).unwrap();
            assert_eq!(qualify_id(&id), Some("x"));
        }
    }

    #[test]
    fn test_ten_thousand_plain_ids_are_distinct() {
        let mut ids = IdGenerator::new();
        let generated: HashSet<String> = (0..10_000).map(|_| ids.next_id(None).unwrap()).collect();
        assert_eq!(generated.len(), 10_000);
    }

    #[test]
    fn test_observe_advances_counter() {
        let mut ids = IdGenerator::new();
        ids.observe("bfbf0000000000000000000041");
        ids.observe("afaf0300010000000000000abc");
        ids.observe("6a1kq3lgf6h0bsm7ctv5tq2l6n");
        assert_eq!(ids.next_id(None).unwrap(), "bfbf0000000000000000000042");
    }

    #[test]
    fn test_observed_max_counter_is_exhausted() {
        let mut ids = IdGenerator::new();
        ids.observe("bfbf0018446744073709551615");
        assert!(matches!(
            ids.next_id(None),
            Err(Error::IdCapacity { counter: u64::MAX, .. })
        ));
        // embedded ids use their own counter
        assert!(ids.next_id(Some("x")).is_ok());
    }

    #[test]
    fn test_unique_id_strips_leading_zeros() {
        assert_eq!(unique_id("000abc"), "abc");
        assert_eq!(unique_id("bfbf0000000000000000000001"), "bfbf0000000000000000000001");
    }

    #[test]
    fn test_qualify_rejects_malformed_ids() {
        assert_eq!(qualify_id("afaf"), None);
        assert_eq!(qualify_id("afafxx0001"), None);
        assert_eq!(qualify_id("afaf20"), None);
    }

    proptest! {
        #[test]
        fn prop_embedded_ids_recover(external in "[A-Za-z0-9_-]{0,16}", warmup in 0usize..200) {
            let mut ids = IdGenerator::new();
            for i in 0..warmup {
                if i % 2 == 0 {
                    ids.next_id(None).unwrap();
                } else {
                    ids.next_id(Some("warm")).unwrap();
                }
            }
            let id = ids.next_id(Some(&external)).unwrap();
            prop_assert_eq!(id.len(), DEFAULT_ID_LENGTH);
            prop_assert_eq!(qualify_id(&id), Some(external.as_str()));
        }

        #[test]
        fn prop_plain_ids_never_qualify(count in 1usize..500) {
            let mut ids = IdGenerator::new();
            for _ in 0..count {
                let id = ids.next_id(None).unwrap();
                prop_assert!(qualify_id(&id).is_none());
            }
        }
    }
}
