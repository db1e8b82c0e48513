//! Catalog-driven argument-vector builder

use crate::catalog::{Catalog, OptionKind, OptionSpec, StageSchema};
use crate::error::CatalogError;
use crate::seed::{RandomSeeds, SeedSource};
use starpipe_stage::{ArgValue, ArgvBuilder, ArgvError, StageArgs};
use std::sync::Arc;

/// Builds command lines from catalog schemas
///
/// Options render in table order: `false` or unset renders nothing, `true`
/// renders `-x`, anything else renders `-x <value>`.
#[derive(Clone)]
pub struct CatalogArgvBuilder {
    catalog: Catalog,
    seeds: Arc<dyn SeedSource>,
}

impl std::fmt::Debug for CatalogArgvBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogArgvBuilder")
            .field("stages", &self.catalog.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for CatalogArgvBuilder {
    fn default() -> Self {
        Self::standard()
    }
}

impl CatalogArgvBuilder {
    /// Builder over the standard catalog with random seeds
    #[inline]
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Catalog::standard())
    }

    /// Builder over a catalog with random seeds
    #[inline]
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            seeds: Arc::new(RandomSeeds),
        }
    }

    /// With seed source
    #[inline]
    #[must_use]
    pub fn with_seed_source(mut self, seeds: impl SeedSource + 'static) -> Self {
        self.seeds = Arc::new(seeds);
        self
    }

    /// Underlying catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Build argv (program first) for `stage`
    ///
    /// # Errors
    /// `UnknownStage`, `UnknownOption` for arguments not in the schema,
    /// `MissingRequired`, or `InvalidValue` for non-boolean flag values.
    pub fn argv(&self, stage: &str, args: &StageArgs) -> Result<Vec<String>, CatalogError> {
        let schema = self
            .catalog
            .get(stage)
            .ok_or_else(|| CatalogError::UnknownStage(stage.to_string()))?;

        if let Some(unknown) = args.keys().find(|k| schema.option(k).is_none()) {
            return Err(CatalogError::UnknownOption {
                stage: stage.to_string(),
                flag: unknown.to_string(),
            });
        }

        let mut argv = vec![schema.name.to_string()];
        for option in schema.options {
            if let Some(value) = self.resolve(schema, option, args.get(option.flag))? {
                render(&mut argv, option.flag, &value);
            }
        }
        tracing::debug!(stage, argv = ?argv, "built stage command line");
        Ok(argv)
    }

    fn resolve(
        &self,
        schema: &StageSchema,
        option: &OptionSpec,
        supplied: Option<&ArgValue>,
    ) -> Result<Option<ArgValue>, CatalogError> {
        let value = match (option.kind, supplied) {
            (OptionKind::Flag, Some(ArgValue::Bool(on))) => Some(ArgValue::Bool(*on)),
            (OptionKind::Flag, Some(other)) => {
                return Err(CatalogError::InvalidValue {
                    stage: schema.name.to_string(),
                    flag: option.flag.to_string(),
                    message: format!("expected true or false, got '{other}'"),
                });
            }
            (OptionKind::Flag, None) => None,
            (_, Some(value)) => Some(value.clone()),
            (OptionKind::Seed, None) => Some(ArgValue::from(self.seeds.next_seed())),
            (OptionKind::Required { default } | OptionKind::Value { default }, None) => {
                default.map(ArgValue::from)
            }
        };

        if value.is_none() && matches!(option.kind, OptionKind::Required { .. }) {
            return Err(CatalogError::MissingRequired {
                stage: schema.name.to_string(),
                flag: option.flag.to_string(),
                description: option.description.to_string(),
            });
        }
        Ok(value)
    }
}

fn render(argv: &mut Vec<String>, flag: &str, value: &ArgValue) {
    match value {
        ArgValue::Bool(false) => {}
        ArgValue::Bool(true) => argv.push(format!("-{flag}")),
        other => {
            argv.push(format!("-{flag}"));
            argv.push(other.to_string());
        }
    }
}

impl ArgvBuilder for CatalogArgvBuilder {
    fn build(&self, stage: &str, args: &StageArgs) -> Result<Vec<String>, ArgvError> {
        self.argv(stage, args)
            .map_err(|e| ArgvError::builder(stage, e))
    }
}
