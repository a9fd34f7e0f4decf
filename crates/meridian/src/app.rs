//! Application bootstrap.
//!
//! [`App`] owns the signature model of every registered handler. Models are
//! built once by [`AppBuilder::build`]; a wiring mistake in any handler
//! aborts startup. Requests are then validated against the shared,
//! read-only [`SignatureRegistry`].

use std::fmt;
use std::sync::Arc;

use meridian_config::MeridianConfig;
use meridian_core::{MeridianError, MeridianResult};
use meridian_extract::{collect_kwargs, RequestConnection};
use meridian_signature::{
    Connection, DecodeError, DependencyNames, HandlerId, Kwargs, ParsedSignature, SignatureModel,
    SignatureRegistry, TypeDecoders, TypeName, Value,
};
use meridian_telemetry::{init_logging, LogConfig};
use tracing::{debug, info};

struct HandlerRegistration {
    id: HandlerId,
    name: String,
    dependency_names: DependencyNames,
    has_data_dto: bool,
    signature: ParsedSignature,
}

/// Builder for [`App`].
#[derive(Default)]
pub struct AppBuilder {
    config: MeridianConfig,
    decoders: TypeDecoders,
    handlers: Vec<HandlerRegistration>,
    init_logging: bool,
}

impl AppBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: MeridianConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs the global log subscriber during [`build`](Self::build),
    /// as described by the `logging` section.
    #[must_use]
    pub fn init_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Registers a decoder for nominal types accepted by `predicate`.
    ///
    /// User decoders are consulted in registration order, before the
    /// built-in ones.
    #[must_use]
    pub fn type_decoder<P, D>(mut self, predicate: P, decoder: D) -> Self
    where
        P: Fn(&TypeName) -> bool + Send + Sync + 'static,
        D: Fn(&TypeName, Value) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.decoders = self.decoders.register(predicate, decoder);
        self
    }

    /// Registers a decoder for one nominal type.
    #[must_use]
    pub fn decoder_for<D>(mut self, name: &str, decoder: D) -> Self
    where
        D: Fn(&TypeName, Value) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.decoders = self.decoders.for_type(name, decoder);
        self
    }

    /// Registers a handler.
    ///
    /// `name` is the handler's function name, used in log output and error
    /// messages. `dependency_names` are the kwargs the framework injects.
    #[must_use]
    pub fn handler(
        mut self,
        id: impl Into<HandlerId>,
        name: impl Into<String>,
        dependency_names: DependencyNames,
        has_data_dto: bool,
        signature: ParsedSignature,
    ) -> Self {
        self.handlers.push(HandlerRegistration {
            id: id.into(),
            name: name.into(),
            dependency_names,
            has_data_dto,
            signature,
        });
        self
    }

    /// Validates the configuration and builds every handler's model.
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::ImproperlyConfigured`] for an invalid
    /// configuration, a log subscriber that cannot be installed, or the
    /// first handler whose signature cannot be modelled.
    pub fn build(self) -> MeridianResult<App> {
        self.config
            .validate()
            .map_err(|e| MeridianError::improperly_configured(e.to_string()))?;

        if self.init_logging {
            init_logging(&log_config(&self.config))
                .map_err(|e| MeridianError::improperly_configured(e.to_string()))?;
        }

        let decoders = if self.config.validation.include_default_decoders {
            self.decoders.chain(&TypeDecoders::defaults())
        } else {
            self.decoders
        };

        let mut registry = SignatureRegistry::new();
        for handler in self.handlers {
            let model = SignatureModel::create(
                &handler.name,
                &handler.dependency_names,
                handler.has_data_dto,
                &handler.signature,
                &decoders,
            )?;
            registry.register(handler.id, model)?;
        }

        info!(
            handlers = registry.len(),
            decoders = decoders.len(),
            "signature models built"
        );

        Ok(App {
            config: self.config,
            registry: Arc::new(registry),
        })
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("config", &self.config)
            .field("decoders", &self.decoders.len())
            .field("handlers", &self.handlers.len())
            .field("init_logging", &self.init_logging)
            .finish()
    }
}

/// Maps the `logging` section onto the subscriber settings.
fn log_config(config: &MeridianConfig) -> LogConfig {
    let logging = &config.logging;
    LogConfig {
        enabled: logging.enabled,
        level: logging.level.clone(),
        json_format: logging.format == meridian_config::LogFormat::Json,
        ansi: logging.ansi_enabled,
        file_line_info: logging.include_location,
        include_target: true,
        service_name: logging.service_name.clone(),
    }
}

/// Validated handler signatures, cheap to clone and share across threads.
///
/// # Example
///
/// ```rust
/// use meridian::prelude::*;
///
/// let app = App::builder()
///     .handler(
///         "get_item",
///         "get_item",
///         DependencyNames::new(),
///         false,
///         ParsedSignature::new().param(ParameterSpec::new("id", TypeAnnotation::Int)),
///     )
///     .build()
///     .unwrap();
///
/// let conn = MockConnection::get("/items?id=3").with_query_param("id");
/// let mut raw = Kwargs::new();
/// raw.insert("id".to_string(), Value::from("3"));
///
/// let values = app.validate("get_item", &conn, raw).unwrap();
/// assert_eq!(values["id"], Value::Int(3));
/// ```
#[derive(Debug, Clone)]
pub struct App {
    config: MeridianConfig,
    registry: Arc<SignatureRegistry>,
}

impl App {
    /// Starts building an app.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// The configuration the app was built with.
    #[must_use]
    pub fn config(&self) -> &MeridianConfig {
        &self.config
    }

    /// All handler models.
    #[must_use]
    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    /// The model of one handler.
    #[must_use]
    pub fn model(&self, handler_id: &str) -> Option<Arc<SignatureModel>> {
        self.registry.get(handler_id)
    }

    /// Coerces `kwargs` against the handler's model.
    ///
    /// `kwargs` holds raw client values and already-resolved dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Validation`] for client errors,
    /// [`MeridianError::Internal`] for failing dependencies or an unknown
    /// handler id.
    pub fn validate(
        &self,
        handler_id: &str,
        connection: &dyn Connection,
        kwargs: Kwargs,
    ) -> MeridianResult<Kwargs> {
        let model = self.lookup(handler_id)?;
        model
            .parse_values_from_connection_kwargs(connection, kwargs)
            .map_err(|err| self.report(handler_id, connection, err))
    }

    /// Collects raw values from `connection`, merges the resolved
    /// `dependencies` and validates the result.
    ///
    /// # Errors
    ///
    /// As [`validate`](Self::validate); an unreadable request is a
    /// validation error.
    pub fn validate_request(
        &self,
        handler_id: &str,
        connection: &RequestConnection,
        dependencies: Kwargs,
    ) -> MeridianResult<Kwargs> {
        let model = self.lookup(handler_id)?;
        let mut kwargs = collect_kwargs(connection, &model).map_err(|err| {
            let method = connection.method().unwrap_or("websocket");
            self.report(
                handler_id,
                connection,
                err.into_validation_error(method, connection.url()),
            )
        })?;
        kwargs.extend(dependencies);

        debug!(
            handler = handler_id,
            request_id = %connection.request_id(),
            "validating request"
        );
        model
            .parse_values_from_connection_kwargs(connection, kwargs)
            .map_err(|err| self.report(handler_id, connection, err))
    }

    fn lookup(&self, handler_id: &str) -> MeridianResult<Arc<SignatureModel>> {
        self.registry.get(handler_id).ok_or_else(|| {
            MeridianError::internal(format!("No signature model for handler '{handler_id}'"))
        })
    }

    fn report(
        &self,
        handler_id: &str,
        connection: &dyn Connection,
        err: MeridianError,
    ) -> MeridianError {
        if err.is_client_error() && self.config.validation.log_client_failures {
            info!(
                handler = handler_id,
                http.method = connection.method().unwrap_or("websocket"),
                http.url = connection.url(),
                errors = ?err.messages(),
                "request rejected"
            );
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_config::{LogFormat, ValidationConfig};
    use meridian_signature::{MockConnection, ParameterSpec, TypeAnnotation};

    fn uuid_signature() -> ParsedSignature {
        ParsedSignature::new().param(ParameterSpec::new(
            "id",
            TypeAnnotation::named(meridian_signature::names::UUID),
        ))
    }

    #[test]
    fn test_default_decoders_follow_config() {
        let app = App::builder()
            .handler("get", "get", DependencyNames::new(), false, uuid_signature())
            .build()
            .unwrap();
        assert!(app.model("get").unwrap().has_decoder(&TypeName::new("uuid")));

        let app = App::builder()
            .config(MeridianConfig {
                validation: ValidationConfig {
                    include_default_decoders: false,
                    ..Default::default()
                },
                ..Default::default()
            })
            .handler("get", "get", DependencyNames::new(), false, uuid_signature())
            .build()
            .unwrap();
        assert!(!app.model("get").unwrap().has_decoder(&TypeName::new("uuid")));
    }

    #[test]
    fn test_duplicate_handler_aborts_build() {
        let err = App::builder()
            .handler("h", "first", DependencyNames::new(), false, ParsedSignature::new())
            .handler("h", "second", DependencyNames::new(), false, ParsedSignature::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, MeridianError::ImproperlyConfigured { .. }));
    }

    #[test]
    fn test_invalid_config_aborts_build() {
        let mut config = MeridianConfig::default();
        config.logging.level = "verbose".to_string();
        let err = App::builder().config(config).build().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_unknown_handler_is_internal() {
        let app = App::builder().build().unwrap();
        let err = app
            .validate("missing", &MockConnection::get("/"), Kwargs::new())
            .unwrap_err();
        assert!(matches!(err, MeridianError::Internal { .. }));
    }

    #[test]
    fn test_log_config_mapping() {
        let config = MeridianConfig::development();
        let log = log_config(&config);
        assert!(!log.json_format);
        assert!(log.file_line_info);
        assert_eq!(log.level, "debug");

        let config = MeridianConfig::production();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(log_config(&config).json_format);
    }
}
