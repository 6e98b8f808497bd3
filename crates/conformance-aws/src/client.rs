// crates/conformance-aws/src/client.rs
// ============================================================================
// Module: API Gateway Authorizer Client
// Description: Direct authorizer reads and deletes against the live service.
// Purpose: Give remote checks an engine-independent view of each authorizer.
// Dependencies: apigw-authorizer, aws-config, aws-sdk-apigateway, tokio
// ============================================================================

//! ## Overview
//! [`ApiGatewayAuthorizerClient`] implements [`RemoteResourceApi`] for
//! `aws_api_gateway_authorizer`. Calls go through a small [`AuthorizerApi`]
//! seam so the conversion and error contract are testable without a
//! network. The SDK-backed implementation owns a private runtime and blocks
//! on each call.
//!
//! # Invariants
//! - Only the service's `NotFoundException` code maps to not-found.
//! - Failures that never reached the service map to transport errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use apigw_authorizer::AUTHORIZER_RESOURCE_TYPE;
use apigw_authorizer::AuthorizerType;
use apigw_authorizer::CONTAINER_ATTRIBUTE;
use apigw_authorizer::RemoteAuthorizer;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_apigateway::Client;
use aws_sdk_apigateway::error::DisplayErrorContext;
use aws_sdk_apigateway::error::ProvideErrorMetadata;
use aws_sdk_apigateway::error::SdkError;
use aws_sdk_apigateway::operation::get_authorizer::GetAuthorizerOutput;
use conformance_config::AwsConfig;
use conformance_core::CompositeId;
use conformance_core::RemoteError;
use conformance_core::RemoteResourceApi;
use conformance_core::classify_service_error;
use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::runtime::RuntimeFlavor;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Client construction errors.
#[derive(Debug, thiserror::Error)]
pub enum AwsClientError {
    /// Invalid configuration.
    #[error("aws client invalid: {0}")]
    Invalid(String),
    /// Runtime or credential loading failure.
    #[error("aws client io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Runtime Helpers
// ============================================================================

/// Blocks on a service future using a compatible runtime.
fn block_on_with_runtime<F, T>(runtime: &Runtime, future: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
            return tokio::task::block_in_place(|| handle.block_on(future));
        }
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|err| RemoteError::Transport(err.to_string()))
                .and_then(|runtime| runtime.block_on(future));
            let _ = tx.send(result);
        });
        return rx.recv().unwrap_or_else(|_| {
            Err(RemoteError::Transport("service call thread join failed".to_string()))
        });
    }

    runtime.block_on(future)
}

/// Maps an SDK failure onto the remote error contract.
fn classify_sdk_error<E, R>(err: &SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => classify_service_error(service.code(), service.message().unwrap_or("")),
        None => RemoteError::Transport(DisplayErrorContext(err).to_string()),
    }
}

// ============================================================================
// SECTION: Service Seam
// ============================================================================

/// Minimal authorizer API used by remote checks.
pub trait AuthorizerApi: Send + Sync {
    /// Reads one authorizer.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the read fails.
    fn get_authorizer(
        &self,
        rest_api_id: &str,
        authorizer_id: &str,
    ) -> Result<RemoteAuthorizer, RemoteError>;

    /// Deletes one authorizer.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the delete fails.
    fn delete_authorizer(&self, rest_api_id: &str, authorizer_id: &str) -> Result<(), RemoteError>;
}

/// SDK-backed authorizer API.
struct SdkAuthorizerApi {
    /// Underlying API Gateway client.
    client: Client,
    /// Tokio runtime for blocking calls.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for SdkAuthorizerApi {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl SdkAuthorizerApi {
    /// Builds a client from configuration and the SDK environment chain.
    fn new(config: &AwsConfig) -> Result<Self, AwsClientError> {
        let runtime = Runtime::new().map_err(|err| AwsClientError::Io(err.to_string()))?;
        let region = config.region.clone();
        let endpoint = config.endpoint.clone();
        let profile = config.profile.clone();
        let shared_config = block_on_with_runtime(&runtime, async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            if let Some(profile) = profile {
                loader = loader.profile_name(profile);
            }
            Ok(loader.load().await)
        })
        .map_err(|err| AwsClientError::Io(err.to_string()))?;
        if shared_config.region().is_none() {
            return Err(AwsClientError::Invalid(
                "no region configured; set aws.region or AWS_REGION".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(&shared_config),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the runtime or an error if shut down.
    fn runtime(&self) -> Result<&Runtime, RemoteError> {
        self.runtime
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or_else(|| RemoteError::Transport("service runtime closed".to_string()))
    }
}

impl AuthorizerApi for SdkAuthorizerApi {
    fn get_authorizer(
        &self,
        rest_api_id: &str,
        authorizer_id: &str,
    ) -> Result<RemoteAuthorizer, RemoteError> {
        let client = self.client.clone();
        let rest_api_id = rest_api_id.to_string();
        let authorizer_id = authorizer_id.to_string();
        block_on_with_runtime(self.runtime()?, async move {
            let output = client
                .get_authorizer()
                .rest_api_id(&rest_api_id)
                .authorizer_id(&authorizer_id)
                .send()
                .await
                .map_err(|err| classify_sdk_error(&err))?;
            remote_from_output(&rest_api_id, &authorizer_id, &output)
        })
    }

    fn delete_authorizer(&self, rest_api_id: &str, authorizer_id: &str) -> Result<(), RemoteError> {
        let client = self.client.clone();
        let rest_api_id = rest_api_id.to_string();
        let authorizer_id = authorizer_id.to_string();
        block_on_with_runtime(self.runtime()?, async move {
            client
                .delete_authorizer()
                .rest_api_id(rest_api_id)
                .authorizer_id(authorizer_id)
                .send()
                .await
                .map_err(|err| classify_sdk_error(&err))?;
            Ok(())
        })
    }
}

/// Converts a service response into the remote authorizer shape.
///
/// # Errors
///
/// Returns [`RemoteError::Api`] when the service reports an unknown
/// authorizer type.
pub fn remote_from_output(
    rest_api_id: &str,
    requested_id: &str,
    output: &GetAuthorizerOutput,
) -> Result<RemoteAuthorizer, RemoteError> {
    let authorizer_type = output
        .r#type()
        .map(|kind| {
            AuthorizerType::parse(kind.as_str()).ok_or_else(|| RemoteError::Api {
                code: "UnknownAuthorizerType".to_string(),
                message: format!("unrecognized authorizer type {}", kind.as_str()),
            })
        })
        .transpose()?;
    Ok(RemoteAuthorizer {
        id: output.id().unwrap_or(requested_id).to_string(),
        rest_api_id: rest_api_id.to_string(),
        name: output.name().map(str::to_string),
        authorizer_type,
        authorizer_uri: output.authorizer_uri().map(str::to_string),
        authorizer_credentials: output.authorizer_credentials().map(str::to_string),
        identity_source: output.identity_source().map(str::to_string),
        identity_validation_expression: output.identity_validation_expression().map(str::to_string),
        authorizer_result_ttl_in_seconds: output.authorizer_result_ttl_in_seconds().map(i64::from),
        provider_arns: output.provider_arns().to_vec(),
    })
}

// ============================================================================
// SECTION: Remote Resource Client
// ============================================================================

/// Live authorizer client used by remote checks.
#[derive(Clone)]
pub struct ApiGatewayAuthorizerClient {
    /// Service implementation.
    api: Arc<dyn AuthorizerApi>,
}

impl ApiGatewayAuthorizerClient {
    /// Builds an SDK-backed client.
    ///
    /// # Errors
    ///
    /// Returns [`AwsClientError`] when configuration or initialization fails.
    pub fn new(config: &AwsConfig) -> Result<Self, AwsClientError> {
        Ok(Self {
            api: Arc::new(SdkAuthorizerApi::new(config)?),
        })
    }

    /// Wraps another [`AuthorizerApi`] implementation.
    #[must_use]
    pub fn with_api(api: Arc<dyn AuthorizerApi>) -> Self {
        Self {
            api,
        }
    }
}

impl RemoteResourceApi for ApiGatewayAuthorizerClient {
    type Object = RemoteAuthorizer;

    fn resource_type(&self) -> &str {
        AUTHORIZER_RESOURCE_TYPE
    }

    fn container_attribute(&self) -> &str {
        CONTAINER_ATTRIBUTE
    }

    fn fetch(&self, id: &CompositeId) -> Result<RemoteAuthorizer, RemoteError> {
        self.api.get_authorizer(id.container_id(), id.object_id())
    }

    fn delete(&self, id: &CompositeId) -> Result<(), RemoteError> {
        self.api.delete_authorizer(id.container_id(), id.object_id())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
