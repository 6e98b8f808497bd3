// crates/apigw-authorizer/src/config/render.rs
// ============================================================================
// Module: HCL Rendering
// Description: Renders stack declarations as Terraform configuration text.
// Purpose: Feed text-only engines the same stack the structure describes.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Rendering is deterministic: the same declaration always yields the same
//! text. String values are escaped for HCL quoting and template sequences.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::config::AuthorizerDecl;
use crate::config::INVOCATION_POLICY_NAME;
use crate::config::LAMBDA_HANDLER;
use crate::config::LAMBDA_PACKAGE_PATH;
use crate::config::LAMBDA_RUNTIME;
use crate::config::LambdaStack;
use crate::config::Reference;
use crate::config::StackDecl;
use crate::config::UserPoolSet;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the whole stack.
pub(crate) fn render_stack(stack: &StackDecl) -> String {
    let mut out = format!(
        "resource \"aws_api_gateway_rest_api\" \"acctest\" {{\n  name = {}\n}}\n",
        quote(&stack.rest_api_name)
    );
    if let Some(lambda) = &stack.lambda {
        out.push('\n');
        out.push_str(&render_lambda(lambda));
    }
    if let Some(pools) = &stack.user_pools {
        out.push('\n');
        out.push_str(&render_pools(pools));
    }
    out.push('\n');
    out.push_str(&render_authorizer(&stack.authorizer));
    out
}

/// Renders the roles, policy, and function of a Lambda authorizer.
fn render_lambda(lambda: &LambdaStack) -> String {
    format!(
        r#"resource "aws_iam_role" "invocation_role" {{
  name = {invocation_role}
  path = "/"

  assume_role_policy = <<EOF
{{
  "Version": "2012-10-17",
  "Statement": [
    {{
      "Action": "sts:AssumeRole",
      "Principal": {{
        "Service": "apigateway.amazonaws.com"
      }},
      "Effect": "Allow",
      "Sid": ""
    }}
  ]
}}
EOF
}}

resource "aws_iam_role_policy" "invocation_policy" {{
  name = "{policy}"
  role = "${{aws_iam_role.invocation_role.id}}"

  policy = <<EOF
{{
  "Version": "2012-10-17",
  "Statement": [
    {{
      "Action": "lambda:InvokeFunction",
      "Effect": "Allow",
      "Resource": "${{aws_lambda_function.authorizer.arn}}"
    }}
  ]
}}
EOF
}}

resource "aws_iam_role" "iam_for_lambda" {{
  name = {lambda_role}

  assume_role_policy = <<EOF
{{
  "Version": "2012-10-17",
  "Statement": [
    {{
      "Action": "sts:AssumeRole",
      "Principal": {{
        "Service": "lambda.amazonaws.com"
      }},
      "Effect": "Allow",
      "Sid": ""
    }}
  ]
}}
EOF
}}

resource "aws_lambda_function" "authorizer" {{
  filename         = "{package}"
  source_code_hash = "${{filebase64sha256("{package}")}}"
  function_name    = {function}
  role             = "${{aws_iam_role.iam_for_lambda.arn}}"
  handler          = "{handler}"
  runtime          = "{runtime}"
}}
"#,
        invocation_role = quote(&lambda.invocation_role_name),
        policy = INVOCATION_POLICY_NAME,
        lambda_role = quote(&lambda.lambda_role_name),
        package = LAMBDA_PACKAGE_PATH,
        function = quote(&lambda.function_name),
        handler = LAMBDA_HANDLER,
        runtime = LAMBDA_RUNTIME,
    )
}

/// Renders a counted user pool block.
fn render_pools(pools: &UserPoolSet) -> String {
    format!(
        "resource \"aws_cognito_user_pool\" \"{label}\" {{\n  count = {count}\n  name  = \"{prefix}-${{count.index}}{suffix}\"\n}}\n",
        label = pools.label,
        count = pools.count,
        prefix = escape(&pools.name_prefix),
        suffix = escape(&pools.name_suffix),
    )
}

/// Renders the authorizer block, omitting undeclared arguments.
fn render_authorizer(decl: &AuthorizerDecl) -> String {
    let mut lines = vec![format!("  name = {}", quote(&decl.name))];
    if let Some(kind) = decl.authorizer_type {
        lines.push(format!("  type = \"{}\"", kind.as_str()));
    }
    lines.push("  rest_api_id = \"${aws_api_gateway_rest_api.acctest.id}\"".to_string());
    if let Some(uri) = &decl.authorizer_uri {
        lines.push(format!("  authorizer_uri = {}", interpolate(uri)));
    }
    if let Some(credentials) = &decl.authorizer_credentials {
        lines.push(format!("  authorizer_credentials = {}", interpolate(credentials)));
    }
    if let Some(source) = &decl.identity_source {
        lines.push(format!("  identity_source = {}", quote(source)));
    }
    if let Some(ttl) = decl.authorizer_result_ttl_in_seconds {
        lines.push(format!("  authorizer_result_ttl_in_seconds = {ttl}"));
    }
    if let Some(expression) = &decl.identity_validation_expression {
        lines.push(format!("  identity_validation_expression = {}", quote(expression)));
    }
    if !decl.provider_arns.is_empty() {
        let arns: Vec<String> = decl.provider_arns.iter().map(interpolate).collect();
        lines.push(format!("  provider_arns = [{}]", arns.join(", ")));
    }
    format!(
        "resource \"aws_api_gateway_authorizer\" \"acctest\" {{\n{}\n}}\n",
        lines.join("\n")
    )
}

/// Renders a reference as an interpolated string.
fn interpolate(reference: &Reference) -> String {
    format!("\"${{{}}}\"", reference.expression())
}

/// Renders a quoted HCL string literal.
fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

/// Escapes quotes, backslashes, and template sequences.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace("${", "$${").replace("%{", "%%{")
}
