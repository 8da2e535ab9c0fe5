//! Remote option resolution for autocomplete fields.
//!
//! Resolution runs in a fixed order:
//!
//! 1. **Gate**: a field with `dependsOn` only fetches once the upstream value
//!    is truthy.
//! 2. **URL**: the upstream value is appended as a path segment when the base
//!    URL ends with `/`, otherwise as a query parameter; additional parameters
//!    follow as query parameters.
//! 3. **Cache key**: an explicit key is used verbatim, otherwise the key is
//!    built from the field name, the upstream value and the parameters.
//! 4. **Fetch**: delegated to an [`OptionFetcher`], shared through the cache.
//! 5. **Extraction**: `dataPath` is walked into the response body.
//! 6. **Category filter**.
//! 7. **Selection merge**: a previously selected entity missing from the
//!    fetched page is prepended once.
//!
//! Steps 1-3 are pure ([`resolve_request`]); steps 5-7 are pure
//! ([`shape_options`]); [`OptionProvider`] ties them to a fetcher and cache.

mod endpoint;
mod fetcher;
mod key;
mod provider;
mod shape;

pub use endpoint::*;
pub use fetcher::*;
pub use key::*;
pub use provider::*;
pub use shape::*;
