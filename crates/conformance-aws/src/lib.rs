// crates/conformance-aws/src/lib.rs
// ============================================================================
// Module: Conformance AWS Adapter
// Description: Live API Gateway access for remote checks.
// Purpose: Read and delete authorizers without going through the engine.
// Dependencies: aws-config, aws-sdk-apigateway, tokio
// ============================================================================

//! ## Overview
//! Remote checks compare engine-tracked state against what the service
//! reports. This crate provides that view for API Gateway authorizers,
//! using the SDK's standard credential and region chain overlaid with the
//! `[aws]` configuration section.

pub mod client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ApiGatewayAuthorizerClient;
pub use client::AuthorizerApi;
pub use client::AwsClientError;
pub use client::remote_from_output;
