// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::HttpSend;
use log::{Level, Log, Metadata, Record};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Target used for every record emitted through a [`Context`].
const LOG_TARGET: &str = "sbqueue";

/// Context carries the pluggable collaborators of a client.
///
/// ## Important
///
/// Nothing here is process-wide: every client gets the context it was built with.
///
/// - **HTTP transport override**: when set, clients send every request through it instead of
///   building their own default transport.
/// - **Logger**: when set, clients emit their debug and error records to it. Otherwise records
///   go to the global [`log`] facade, which stays silent until the application installs a logger.
/// - **Env**: environment access used by configuration loading. Defaults to an empty
///   environment.
///
/// ## Example
///
/// ```
/// use sbqueue_core::{Context, OsEnv};
///
/// // Create a context with explicit implementations
/// let ctx = Context::new()
///     .with_env(OsEnv);  // Optionally configure environment implementation
/// ```
#[derive(Clone)]
pub struct Context {
    http: Option<Arc<dyn HttpSend>>,
    logger: Option<Arc<dyn Log>>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("http", &self.http)
            .field("logger", &self.logger.is_some())
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context without transport override or logger and with an empty env.
    pub fn new() -> Self {
        Self {
            http: None,
            logger: None,
            env: Arc::new(NoopEnv),
        }
    }

    /// Override the HTTP transport used by clients built with this context.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Some(Arc::new(http));
        self
    }

    /// Send client logs to the given logger instead of the global facade.
    pub fn with_logger(mut self, logger: impl Log + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Get the HTTP transport override, if any.
    #[inline]
    pub fn http_send_override(&self) -> Option<Arc<dyn HttpSend>> {
        self.http.clone()
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Emit a log record at the given level.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match &self.logger {
            Some(logger) => {
                let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
                if logger.enabled(&metadata) {
                    logger.log(
                        &Record::builder()
                            .metadata(metadata)
                            .args(args)
                            .build(),
                    );
                }
            }
            None => log::log!(target: LOG_TARGET, level, "{}", args),
        }
    }

    /// Emit a debug record.
    #[inline]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    /// Emit an error record.
    #[inline]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }
}

/// Permits parameterizing environment access.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    fn var(&self, key: &str) -> Option<String>;
}

/// Implements Env for the OS context.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }
}

/// StaticEnv provides a static env environment.
///
/// This is useful for testing or for providing a fixed environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// The environment variables to use.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }
}

/// NoopEnv is a no-op implementation that always returns None.
///
/// This is used when no environment is configured.
#[derive(Debug, Clone, Copy, Default)]
struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }
}
