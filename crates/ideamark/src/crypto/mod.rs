//! Cryptographic primitives for Ideamark.
//!
//! This module provides:
//! - Ed25519 key generation, signing, and verification
//! - HKDF-SHA256 derivation of witness keys from the service root key
//! - Cryptographically secure random bytes for identifier nonces

pub mod derivation;
pub mod keys;
pub mod random;
pub mod signing;
