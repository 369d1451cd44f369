use crate::defaults::Defaults;
use crate::error::MetaError;
use crate::metadata::{Metadata, PageMeta};
use crate::RequestContext;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Skip,
    Apply(Metadata),
}

/// Three-tier precedence, highest wins: explicit per-request metadata over
/// resolved defaults over whatever the template already emits (the rewrite
/// step never touches keys it is not handed).
///
/// Suppression short-circuits before the defaults function runs, so an
/// opted-out page cannot fail on broken defaults.
pub fn resolve(
    state: &PageMeta,
    defaults: &Defaults,
    ctx: &RequestContext,
) -> Result<Resolution, MetaError> {
    let explicit = match state {
        PageMeta::Suppressed => return Ok(Resolution::Skip),
        PageMeta::Unset => None,
        PageMeta::Values(meta) => Some(meta),
    };

    let resolved = defaults.resolve(ctx)?;

    match explicit {
        None if resolved.is_empty() => Ok(Resolution::Skip),
        None => Ok(Resolution::Apply(resolved)),
        Some(explicit) => Ok(Resolution::Apply(resolved.union(explicit.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> RequestContext {
        RequestContext::for_path("/")
    }

    fn meta(value: serde_json::Value) -> Metadata {
        Metadata::from_value(value).expect("test metadata must be a mapping")
    }

    #[test]
    fn explicit_keys_win_over_defaults() {
        let defaults = Defaults::Static(meta(json!({"title": "default", "author": "site"})));
        let state = PageMeta::Values(meta(json!({"title": "page"})));

        let resolution = resolve(&state, &defaults, &ctx()).expect("resolve");
        let Resolution::Apply(merged) = resolution else {
            panic!("must apply");
        };
        assert_eq!(merged.get("title"), Some(&json!("page")));
        assert_eq!(merged.get("author"), Some(&json!("site")));
    }

    #[test]
    fn suppression_skips_regardless_of_defaults() {
        let defaults = Defaults::Static(meta(json!({"title": "default"})));
        let resolution = resolve(&PageMeta::Suppressed, &defaults, &ctx()).expect("resolve");
        assert_eq!(resolution, Resolution::Skip);
    }

    #[test]
    fn suppression_never_invokes_the_defaults_function() {
        let defaults = Defaults::compute(|_| Err("must not run".into()));
        let resolution = resolve(&PageMeta::Suppressed, &defaults, &ctx())
            .expect("suppressed request must not observe defaults failures");
        assert_eq!(resolution, Resolution::Skip);
    }

    #[test]
    fn unset_with_empty_defaults_skips() {
        let resolution = resolve(&PageMeta::Unset, &Defaults::default(), &ctx()).expect("resolve");
        assert_eq!(resolution, Resolution::Skip);
    }

    #[test]
    fn unset_with_defaults_applies_defaults() {
        let defaults = Defaults::Static(meta(json!({"description": "site-wide"})));
        let resolution = resolve(&PageMeta::Unset, &defaults, &ctx()).expect("resolve");
        let Resolution::Apply(merged) = resolution else {
            panic!("must apply");
        };
        assert_eq!(merged.get("description"), Some(&json!("site-wide")));
    }

    #[test]
    fn explicit_empty_mapping_still_applies() {
        // Distinct from never-called: the rewrite pass runs, it just has
        // nothing to change.
        let state = PageMeta::Values(Metadata::new());
        let resolution = resolve(&state, &Defaults::default(), &ctx()).expect("resolve");
        assert_eq!(resolution, Resolution::Apply(Metadata::new()));
    }

    #[test]
    fn defaults_failure_propagates_when_not_suppressed() {
        let defaults = Defaults::compute(|_| Ok(json!(null)));
        let err = resolve(&PageMeta::Unset, &defaults, &ctx()).expect_err("must fail");
        assert_eq!(err.code(), "DefaultsNotObject");
    }
}
