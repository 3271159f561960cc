//! Lookup table of configured providers.

// self
use crate::{
	_prelude::*,
	config::{Configuration, FederationConfig, ProviderId, ProviderKind},
	deps::Dependencies,
	error::ConfigError,
	provider::{DiscordProvider, GitHubProvider, Provider},
};

/// Providers keyed by their configured identifier.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
	providers: BTreeMap<ProviderId, Arc<dyn Provider>>,
}
impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds one provider per configuration entry, all sharing `deps`.
	pub fn from_config(
		config: &FederationConfig,
		deps: Arc<dyn Dependencies>,
	) -> Result<Self, ConfigError> {
		config.validate()?;

		let mut registry = Self::new();

		for entry in &config.providers {
			registry.insert(Self::build(entry.clone(), deps.clone())?)?;
		}

		Ok(registry)
	}

	/// Builds the built-in variant matching `config.provider`.
	pub fn build(
		config: Configuration,
		deps: Arc<dyn Dependencies>,
	) -> Result<Arc<dyn Provider>, ConfigError> {
		let provider: Arc<dyn Provider> = match config.provider {
			ProviderKind::Discord => Arc::new(DiscordProvider::new(config, deps)?),
			ProviderKind::GitHub => Arc::new(GitHubProvider::new(config, deps)?),
		};

		Ok(provider)
	}

	/// Registers a provider under its configured identifier.
	pub fn insert(&mut self, provider: Arc<dyn Provider>) -> Result<(), ConfigError> {
		let id = provider.config().id.clone();

		if self.providers.contains_key(&id) {
			return Err(ConfigError::DuplicateProvider { id: id.to_string() });
		}

		self.providers.insert(id, provider);

		Ok(())
	}

	/// Returns the provider registered under `id`.
	pub fn get(&self, id: &str) -> Option<Arc<dyn Provider>> {
		self.providers.get(id).cloned()
	}

	/// Registered identifiers in sorted order.
	pub fn ids(&self) -> impl Iterator<Item = &ProviderId> {
		self.providers.keys()
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.providers.len()
	}

	/// Returns true when no provider is registered.
	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}
impl Debug for ProviderRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderRegistry").field("ids", &self.providers.keys()).finish()
	}
}
