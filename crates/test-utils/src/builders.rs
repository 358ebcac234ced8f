#![allow(dead_code)]

use deployagent::config::{ConfigFile, RawConfigFile};

pub const TEST_REPO_URL: &str = "https://git.example.test/automation/ai-hackathon-25.git";

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults with a test repository URL filled in.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.repository.url = Some(TEST_REPO_URL.to_string());
        Self { config }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.config.repository.url = Some(url.to_string());
        self
    }

    pub fn repo_name(mut self, name: &str) -> Self {
        self.config.repository.name = name.to_string();
        self
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.config.repository.branch = branch.to_string();
        self
    }

    pub fn in_place(mut self) -> Self {
        self.config.pipeline.clone = false;
        self
    }

    pub fn script(mut self, path: &str) -> Self {
        self.config.script.path = Some(path.to_string());
        self
    }

    pub fn exclude_self(mut self, val: bool) -> Self {
        self.config.script.exclude_self = Some(val);
        self
    }

    pub fn script_env(mut self, key: &str, value: &str) -> Self {
        self.config
            .script
            .env
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn require_env(mut self, key: &str) -> Self {
        self.config.script.required_env.push(key.to_string());
        self
    }

    pub fn timeouts(mut self, value: &str) -> Self {
        self.config.pipeline.acquire_timeout = value.to_string();
        self.config.pipeline.provision_timeout = value.to_string();
        self.config.pipeline.script_timeout = value.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
