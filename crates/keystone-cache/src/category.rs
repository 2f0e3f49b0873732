//! Cache key categories.
//!
//! Every cache entry belongs to a [`CacheCategory`]. A category fixes the key
//! template, its number of positional arguments, the default TTL and the
//! value encoding, so keys for the same kind of entry are always built the
//! same way and templates of different categories never collide (each one
//! starts with its own namespace prefix).

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Positional placeholder used in key templates.
pub const PLACEHOLDER: &str = "%s";

/// How values of a category are serialized in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// serde_json text.
    Json,
}

/// Immutable description of a cache category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDescriptor {
    /// Unique category name.
    pub name: &'static str,
    /// Key template with `arity` positional `%s` placeholders.
    pub key_template: &'static str,
    /// Number of arguments the template takes.
    pub arity: usize,
    /// Expiry used when the caller does not pick one.
    pub default_ttl: Duration,
    /// Value encoding.
    pub encoding: ValueEncoding,
}

static IDEMPOTENCY: CategoryDescriptor = CategoryDescriptor {
    name: "IDEMPOTENCY",
    key_template: "IDPT:%s:%s:%s",
    arity: 3,
    default_ttl: Duration::from_secs(86_400),
    encoding: ValueEncoding::Json,
};

/// Closed set of cache key categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheCategory {
    /// Processed-request markers, keyed by user id, endpoint path and payload hash.
    Idempotency,
}

impl CacheCategory {
    /// Every category.
    pub const ALL: &'static [CacheCategory] = &[CacheCategory::Idempotency];

    /// Returns the category's descriptor.
    #[must_use]
    pub fn descriptor(self) -> &'static CategoryDescriptor {
        match self {
            Self::Idempotency => &IDEMPOTENCY,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    #[must_use]
    pub fn key_template(self) -> &'static str {
        self.descriptor().key_template
    }

    #[must_use]
    pub fn arity(self) -> usize {
        self.descriptor().arity
    }

    #[must_use]
    pub fn default_ttl(self) -> Duration {
        self.descriptor().default_ttl
    }

    #[must_use]
    pub fn encoding(self) -> ValueEncoding {
        self.descriptor().encoding
    }

    /// The key used when no arguments are given: the template itself.
    #[must_use]
    pub fn static_key(self) -> &'static str {
        self.descriptor().key_template
    }

    /// Renders the concrete key for `args`.
    ///
    /// With no arguments this is [`static_key`](Self::static_key). Otherwise
    /// exactly [`arity`](Self::arity) non-blank arguments are substituted into
    /// the template in order. Any other count is an
    /// [`CacheError::ArityMismatch`]; keys are never truncated or padded.
    ///
    /// Arguments are inserted verbatim, so the key format cannot tell where an
    /// argument containing the template's `:` separator ends:
    /// `["a:b", "c", "h"]` and `["a", "b:c", "h"]` render the same key.
    /// Callers whose arguments may contain `:` must keep them distinct
    /// themselves, for example by hashing or escaping them.
    pub fn render_key(self, args: &[&str]) -> CacheResult<String> {
        if args.is_empty() {
            return Ok(self.static_key().to_string());
        }

        let descriptor = self.descriptor();
        if args.len() != descriptor.arity {
            return Err(CacheError::ArityMismatch {
                category: descriptor.name,
                expected: descriptor.arity,
                actual: args.len(),
            });
        }

        if let Some(index) = args.iter().position(|arg| arg.trim().is_empty()) {
            return Err(CacheError::BlankArgument {
                category: descriptor.name,
                index,
            });
        }

        let capacity = descriptor.key_template.len() + args.iter().map(|arg| arg.len()).sum::<usize>();
        let mut key = String::with_capacity(capacity);
        let mut segments = descriptor.key_template.split(PLACEHOLDER);

        if let Some(head) = segments.next() {
            key.push_str(head);
        }
        for (arg, segment) in args.iter().zip(segments) {
            key.push_str(arg);
            key.push_str(segment);
        }

        Ok(key)
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
