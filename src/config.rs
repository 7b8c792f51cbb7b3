//! Schema-wide settings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    executor::Context, schema::directives::DEFAULT_DEPRECATION_REASON, value::Value,
};

/// When named visibility profiles are computed.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityStrategy {
    /// Every profile is computed while building the schema.
    Eager,

    /// A profile is computed the first time a request selects it.
    #[default]
    Lazy,
}

/// Settings of a schema, readable from JSON.
///
/// ```
/// # use trellis::{SchemaConfig, VisibilityStrategy};
/// let config = SchemaConfig::from_json(r#"{
///     "visibility_strategy": "eager",
///     "visibility_profiles": {"public": {"admin": false}},
///     "max_depth": 10
/// }"#).unwrap();
/// assert_eq!(config.visibility_strategy, VisibilityStrategy::Eager);
/// assert_eq!(config.max_depth, Some(10));
/// assert!(config.introspection);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// When named profiles are computed.
    pub visibility_strategy: VisibilityStrategy,

    /// Named profiles along with the context values their predicates run
    /// with.
    pub visibility_profiles: IndexMap<String, IndexMap<String, serde_json::Value>>,

    /// Maximum depth of an operation's selections.
    pub max_depth: Option<usize>,

    /// Maximum complexity of an operation.
    pub max_complexity: Option<usize>,

    /// Whether `__schema` and `__type` may be queried.
    pub introspection: bool,

    /// Reason used when a member is deprecated without one.
    pub default_deprecation_reason: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            visibility_strategy: VisibilityStrategy::default(),
            visibility_profiles: IndexMap::new(),
            max_depth: None,
            max_complexity: None,
            introspection: true,
            default_deprecation_reason: DEFAULT_DEPRECATION_REASON.into(),
        }
    }
}

impl SchemaConfig {
    /// Reads settings from JSON. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// If `json` is malformed or holds keys of the wrong shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Context the predicates of the named profile run with.
    pub(crate) fn profile_context(&self, name: &str) -> Option<Context> {
        let values = self.visibility_profiles.get(name)?;
        Some(
            values
                .iter()
                .fold(Context::new(), |ctx, (k, v)| {
                    ctx.with_value(k.clone(), Value::from(v.clone()))
                })
                .with_visibility_profile(name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{SchemaConfig, VisibilityStrategy};

    #[test]
    fn defaults_apply_to_missing_keys() {
        let config = SchemaConfig::from_json("{}").unwrap();
        assert_eq!(config, SchemaConfig::default());
        assert_eq!(config.visibility_strategy, VisibilityStrategy::Lazy);
        assert_eq!(config.default_deprecation_reason, "No longer supported");
    }

    #[test]
    fn builds_profile_contexts() {
        let config = SchemaConfig::from_json(
            r#"{"visibility_profiles": {"future": {"future_schema": true}}}"#,
        )
        .unwrap();
        let ctx = config.profile_context("future").unwrap();
        assert!(ctx.flag("future_schema"));
        assert_eq!(ctx.visibility_profile(), Some("future"));
        assert!(config.profile_context("past").is_none());
    }

    #[test]
    fn rejects_unknown_strategies() {
        assert!(SchemaConfig::from_json(r#"{"visibility_strategy": "sometimes"}"#).is_err());
    }
}
