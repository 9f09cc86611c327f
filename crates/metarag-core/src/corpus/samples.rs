//! Built-in sample technical documentation used by the demo

use super::Document;

const AUTH_V2: &str = r#"# Authentication API v2.0

The Authentication API provides secure access control for all platform services.

## OAuth 2.0 Implementation
To authenticate using OAuth 2.0, send a POST request to /auth/oauth2/token
with your client credentials. The response includes an access token valid
for 1 hour and a refresh token valid for 30 days.

### Rate Limits
- Standard tier: 100 requests per minute
- Premium tier: 1000 requests per minute

Note: API key authentication is deprecated as of v2.0.
Last updated: March 2024"#;

const AUTH_V1: &str = r#"# Authentication API v1.0 (Legacy)

## API Key Authentication
Generate an API key from the dashboard and include it in the X-API-Key header.

### Rate Limits
- All tiers: 60 requests per minute

Note: This version is deprecated. Please upgrade to v2.0.
Last updated: January 2023"#;

const STORAGE: &str = r#"# Storage Service Guide

Our distributed storage service provides scalable object storage.

## Pricing Tiers
- Standard storage: $0.023 per GB/month
- Archive: $0.004 per GB/month

Storage service uses the Authentication API v2.0 for access control.

Last updated: April 2024"#;

const TROUBLESHOOTING: &str = r#"# Troubleshooting Guide: Authentication Errors

## Problem: 401 Unauthorized Error
**Cause**: Invalid or expired credentials
**Solution**:
1. Verify that your OAuth token hasn't expired (tokens are valid for 1 hour)
2. Use the refresh token to obtain a new access token

## Problem: Rate Limiting (429 Error)
**Cause**: Exceeding rate limits
**Solution**:
1. Standard tier allows 100 req/min
2. Consider upgrading to premium tier for 1000 req/min

Last updated: March 2024"#;

/// Four documents covering two API versions, a guide and a troubleshooting page
pub fn sample_documents() -> Vec<Document> {
    vec![
        Document::new("auth_v2", "Authentication API Reference v2.0", AUTH_V2),
        Document::new(
            "auth_v1",
            "Authentication API Reference v1.0 (Legacy)",
            AUTH_V1,
        ),
        Document::new("storage", "Storage Service Guide", STORAGE),
        Document::new(
            "troubleshooting",
            "Troubleshooting Guide: Authentication Errors",
            TROUBLESHOOTING,
        ),
    ]
}

/// Queries the demo runs against [`sample_documents`]
pub const SAMPLE_QUERIES: &[&str] = &[
    "How do I authenticate with OAuth in version 2.0?",
    "What are the rate limits for authentication?",
    "How do I troubleshoot 401 errors?",
    "Tell me about storage pricing",
];
