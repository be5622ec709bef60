//! Command line and environment configuration.
//!
//! Everything the service needs at startup is parsed here and handed to the
//! server as a [`Config`]; nothing is read from globals afterwards.

use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::pod::{JsonFileStore, MAX_PODS, MemoryStore, PodError, Registry};

#[derive(Parser, Debug)]
#[command(name = "pod-registry", version, about = "Hands out lab pod numbers to students")]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Tracing filter directive, e.g. `info` or `pod_registry=debug`
    #[arg(long, env = "POD_REGISTRY_LOG", default_value = "info", global = true)]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// JSON file holding the registry snapshot
    #[arg(
        long,
        env = "POD_REGISTRY_DATA_FILE",
        default_value = "pod-registry.json",
        global = true
    )]
    pub data_file: PathBuf,

    /// Highest pod number that may be assigned
    #[arg(
        long,
        env = "POD_REGISTRY_MAX_PODS",
        default_value_t = MAX_PODS,
        value_parser = clap::value_parser!(u32).range(1..=255),
        global = true
    )]
    pub max_pods: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Insert the demo students, skipping pods that are already taken
    Seed {
        /// Only insert a single user on pod 1
        #[arg(long)]
        solo: bool,
    },
    /// Print every assignment as one JSON object per line
    List,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "POD_REGISTRY_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// User name for the admin pages
    #[arg(long, env = "POD_REGISTRY_ADMIN_USER", default_value = "admin")]
    pub admin_user: String,

    /// Password for the admin pages
    #[arg(long, env = "POD_REGISTRY_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Keep the registry in memory only; nothing is read from or written to disk
    #[arg(long, env = "POD_REGISTRY_EPHEMERAL")]
    pub ephemeral: bool,
}

/// Credentials accepted by the admin gate.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        AdminCredentials {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Startup configuration of the server.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    /// `None` keeps the registry in memory
    pub data_file: Option<PathBuf>,
    pub max_pods: u32,
    pub admin: AdminCredentials,
}

impl Config {
    pub fn new(storage: &StorageArgs, serve: ServeArgs) -> Self {
        Config {
            bind: serve.bind,
            data_file: (!serve.ephemeral).then(|| storage.data_file.clone()),
            max_pods: storage.max_pods,
            admin: AdminCredentials::new(serve.admin_user, serve.admin_password),
        }
    }

    pub fn open_registry(&self) -> Result<Registry, PodError> {
        open_registry(self.data_file.as_deref(), self.max_pods)
    }
}

/// Opens the registry over a JSON file, or in memory when `data_file` is `None`.
pub fn open_registry(data_file: Option<&Path>, max_pods: u32) -> Result<Registry, PodError> {
    match data_file {
        Some(path) => Registry::open(JsonFileStore::open(path)?, max_pods),
        None => Registry::open(MemoryStore::new(), max_pods),
    }
}
